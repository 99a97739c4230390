use log::{debug, info};
use rover_servo_core::{NavigationVector, Observation};

use crate::command::{Command, ControlAction};
use crate::params::ApproachParams;
use crate::state::{ApproachPhase, ApproachState};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Result of one [`ApproachMachine::step`].
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub phase: ApproachPhase,
    /// Actions in the order they must be executed.
    pub actions: Vec<ControlAction>,
}

impl StepOutcome {
    pub fn commands(&self) -> impl Iterator<Item = Command> + '_ {
        self.actions.iter().filter_map(ControlAction::command)
    }
}

/// Turns per-cycle observations into actuator commands.
///
/// The machine owns the hysteresis flags; nothing else mutates them.
#[derive(Clone, Debug, Default)]
pub struct ApproachMachine {
    params: ApproachParams,
    state: ApproachState,
}

impl ApproachMachine {
    pub fn new(params: ApproachParams) -> Self {
        Self::with_state(params, ApproachState::default())
    }

    pub fn with_state(params: ApproachParams, state: ApproachState) -> Self {
        Self { params, state }
    }

    pub fn params(&self) -> &ApproachParams {
        &self.params
    }

    pub fn state(&self) -> ApproachState {
        self.state
    }

    /// Commands issued once before the first cycle.
    pub fn startup_actions(&self) -> Vec<ControlAction> {
        vec![ControlAction::Send(Command::Fork(self.params.fork_down))]
    }

    /// Evaluate one cycle.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn step(&mut self, observation: &Observation) -> StepOutcome {
        let nav = match observation {
            Observation::Navigation(nav) => *nav,
            Observation::TargetLost if self.state.approached => return self.raise_forks(),
            _ => return self.stop(),
        };

        let mut actions = Vec::new();
        let threshold = self.params.angle_threshold(self.state.approached);

        let phase = if nav.bearing_deg.abs() > threshold && self.state.can_turn {
            self.turn(nav.bearing_deg, &mut actions);
            ApproachPhase::Turning
        } else if self.state.fork_override {
            ApproachPhase::ForkOverride
        } else {
            self.drive(&nav, &mut actions)
        };

        if nav.distance_px > self.params.fork_lower_distance {
            actions.push(ControlAction::Send(Command::Fork(self.params.fork_down)));
        }
        if nav.distance_px > self.params.disengage_distance && !self.state.is_initial() {
            info!("target beyond {:.0} px, approach reset", self.params.disengage_distance);
            self.state.reset();
        }

        debug!(
            "{phase}: bearing {:.1} dist {:.1} -> can_turn={} approached={} fork_override={}",
            nav.bearing_deg,
            nav.distance_px,
            self.state.can_turn,
            self.state.approached,
            self.state.fork_override
        );

        StepOutcome { phase, actions }
    }

    fn turn(&self, bearing_deg: f64, actions: &mut Vec<ControlAction>) {
        let bearing = if bearing_deg > 180.0 {
            bearing_deg - 360.0
        } else if bearing_deg < -180.0 {
            bearing_deg + 360.0
        } else {
            bearing_deg
        };
        let pulse = if bearing > 0.0 {
            self.params.turn_pulse
        } else {
            -self.params.turn_pulse
        };
        let settle = self.params.pulse_settle();
        actions.extend([
            ControlAction::Send(Command::Angular(pulse)),
            ControlAction::Settle(settle),
            ControlAction::Send(Command::Angular(0.0)),
            ControlAction::Settle(settle),
        ]);
    }

    fn drive(&mut self, nav: &NavigationVector, actions: &mut Vec<ControlAction>) -> ApproachPhase {
        actions.push(ControlAction::Send(Command::Angular(0.0)));
        self.state.can_turn = false;

        if nav.distance_px < self.params.final_approach_distance && !self.state.approached {
            info!("final approach at {:.1} px", nav.distance_px);
            self.state.can_turn = true;
            self.state.approached = true;
        }

        if nav.distance_px > self.params.engage_distance {
            actions.push(ControlAction::Send(Command::Linear(self.params.forward_speed)));
            ApproachPhase::Approaching
        } else {
            info!("target reached at {:.1} px, forks up", nav.distance_px);
            self.state.approached = false;
            actions.push(ControlAction::Send(Command::Fork(self.params.fork_up)));
            actions.push(ControlAction::Send(Command::Linear(0.0)));
            ApproachPhase::AtTarget
        }
    }

    fn raise_forks(&mut self) -> StepOutcome {
        info!("target lost during final approach, raising forks");
        self.state.fork_override = true;
        StepOutcome {
            phase: ApproachPhase::ForkOverride,
            actions: vec![
                ControlAction::Send(Command::Fork(self.params.fork_up)),
                ControlAction::Send(Command::Linear(0.0)),
                ControlAction::Send(Command::Angular(0.0)),
            ],
        }
    }

    fn stop(&self) -> StepOutcome {
        StepOutcome {
            phase: ApproachPhase::Searching,
            actions: vec![
                ControlAction::Send(Command::Angular(0.0)),
                ControlAction::Send(Command::Linear(0.0)),
            ],
        }
    }
}
