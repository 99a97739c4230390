use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One of the three independent actuator channels.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActuatorChannel {
    Angular,
    Linear,
    Fork,
}

impl fmt::Display for ActuatorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActuatorChannel::Angular => "angular",
            ActuatorChannel::Linear => "linear",
            ActuatorChannel::Fork => "fork",
        };
        f.write_str(name)
    }
}

/// Fire-and-forget scalar command.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "value", rename_all = "lowercase")]
pub enum Command {
    Angular(f64),
    Linear(f64),
    Fork(f64),
}

impl Command {
    pub fn new(channel: ActuatorChannel, value: f64) -> Self {
        match channel {
            ActuatorChannel::Angular => Command::Angular(value),
            ActuatorChannel::Linear => Command::Linear(value),
            ActuatorChannel::Fork => Command::Fork(value),
        }
    }

    pub fn channel(&self) -> ActuatorChannel {
        match self {
            Command::Angular(_) => ActuatorChannel::Angular,
            Command::Linear(_) => ActuatorChannel::Linear,
            Command::Fork(_) => ActuatorChannel::Fork,
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            Command::Angular(v) | Command::Linear(v) | Command::Fork(v) => v,
        }
    }

    /// Wire format: 8-byte little-endian IEEE-754 double, no framing.
    pub fn encode(&self) -> [u8; 8] {
        self.value().to_le_bytes()
    }
}

/// One step of a cycle's output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlAction {
    Send(Command),
    /// Pause so the rover registers a discrete pulse before it is zeroed.
    Settle(Duration),
}

impl ControlAction {
    pub fn command(&self) -> Option<Command> {
        match self {
            ControlAction::Send(c) => Some(*c),
            ControlAction::Settle(_) => None,
        }
    }
}
