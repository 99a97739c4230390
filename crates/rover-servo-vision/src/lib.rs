//! Rover and target localization from a single color frame.
//!
//! Pipeline, per frame:
//! 1. Smooth and convert the frame to HSV once ([`rover_servo_core::prepare_frame`]).
//! 2. Locate each of the three rover markers by color ([`locate_marker`]).
//! 3. Reject marker triples that are spread wider than the rover body and
//!    build a [`RoverPose`]: centroid plus heading toward the front marker.
//! 4. Locate the dark target, preferring the candidate farthest from the
//!    rover centroid so the rover's own body is not mistaken for it
//!    ([`locate_target`]).
//! 5. Reduce to a [`NavigationVector`](rover_servo_core::NavigationVector):
//!    relative bearing and pixel distance.
//!
//! The result of a pass is a [`FrameEstimate`] whose
//! [`Observation`](rover_servo_core::Observation) keeps the three failure
//! cases (missing marker, implausible spread, lost target) apart.

mod error;
mod estimator;
mod marker;
mod params;
mod pose;
mod target;

pub use error::LocalizeError;
pub use estimator::{FrameEstimate, NavigationEstimator};
pub use marker::locate_marker;
pub use params::{LocalizerParams, RoverMarkers, TargetParams};
pub use pose::{ImplausiblePose, RoverPose};
pub use target::{locate_target, select_target, target_candidates, TargetCandidate};
