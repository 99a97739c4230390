//! Overhead-camera visual servo for a forklift rover.
//!
//! A fixed camera watches the rover, which carries three colored markers, and
//! a dark target on the floor. Every control cycle:
//!
//! 1. a [`FrameSource`] yields one color frame,
//! 2. [`vision::NavigationEstimator`] reduces it to an
//!    [`Observation`](core::Observation): either a bearing/distance to the
//!    target or the reason none could be computed,
//! 3. [`approach::ApproachMachine`] turns the observation into actuator
//!    commands, which a [`CommandSink`](approach::CommandSink) delivers.
//!
//! [`ControlLoop`] ties these together and owns the cross-cycle state.
//!
//! ## Quickstart
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use rover_servo::{ControlLoop, ImageSequence, ServoConfig};
//! use rover_servo::approach::LoggingSink;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = ServoConfig::default();
//! let frames = ImageSequence::open("frames/")?;
//! let mut servo = ControlLoop::new(&cfg, frames, LoggingSink);
//! let summary = servo.run(&AtomicBool::new(false))?;
//! println!("{} cycles, {} solved", summary.cycles, summary.solved);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `rover_servo::core`: pixel geometry, HSV frames, threshold profiles, regions.
//! - `rover_servo::vision`: marker and target localizers, pose and navigation estimate.
//! - `rover_servo::approach`: approach state machine, commands, actuator channels.

pub use rover_servo_approach as approach;
pub use rover_servo_core as core;
pub use rover_servo_vision as vision;

pub mod annotate;
mod config;
mod control_loop;
mod frame;

pub use config::{ConfigError, ServoConfig};
pub use control_loop::{ControlLoop, CycleReport, RunSummary, ServoError, StopReason};
pub use frame::{
    from_image_rgb, load_frame, rgb_view, to_image_rgb, FrameError, FrameQueue, FrameSource,
    ImageSequence,
};
