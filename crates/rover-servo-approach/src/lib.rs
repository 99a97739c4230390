//! Approach state machine and actuator plumbing.
//!
//! Each control cycle hands one [`Observation`](rover_servo_core::Observation)
//! to [`ApproachMachine::step`], which returns the actuator actions for that
//! cycle and updates the three hysteresis flags in [`ApproachState`]. The
//! flags are the only state that outlives a cycle.
//!
//! Actions are executed against a [`CommandSink`]; [`TcpActuators`] writes
//! each command as a little-endian `f64` on one of three TCP channels
//! (angular, linear, fork).

mod channel;
mod command;
mod machine;
mod params;
mod state;

pub use channel::{
    execute, ActuatorConfig, ChannelError, CommandSink, LoggingSink, RecordingSink, TcpActuators,
};
pub use command::{ActuatorChannel, Command, ControlAction};
pub use machine::{ApproachMachine, StepOutcome};
pub use params::ApproachParams;
pub use state::{ApproachPhase, ApproachState};
