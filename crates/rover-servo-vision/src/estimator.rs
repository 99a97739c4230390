use log::debug;
use rover_servo_core::{prepare_frame, HsvImage, Observation, PixelPos, RgbImageView};
use serde::{Deserialize, Serialize};

use crate::error::LocalizeError;
use crate::marker::locate_marker;
use crate::params::LocalizerParams;
use crate::pose::RoverPose;
use crate::target::locate_target;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Everything one localization pass produced.
///
/// `pose` and `target` are kept for diagnostics even though only
/// `observation` drives control.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameEstimate {
    pub observation: Observation,
    #[serde(default)]
    pub pose: Option<RoverPose>,
    #[serde(default)]
    pub target: Option<PixelPos>,
}

impl FrameEstimate {
    fn failed(observation: Observation) -> Self {
        Self {
            observation,
            pose: None,
            target: None,
        }
    }
}

/// Frame → navigation vector.
pub struct NavigationEstimator {
    params: LocalizerParams,
}

impl NavigationEstimator {
    pub fn new(params: LocalizerParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &LocalizerParams {
        &self.params
    }

    /// Smooth, convert, and localize.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, frame), fields(width = frame.width, height = frame.height))
    )]
    pub fn estimate(&self, frame: &RgbImageView<'_>) -> FrameEstimate {
        let hsv = prepare_frame(frame, &self.params.blur);
        self.estimate_prepared(&hsv)
    }

    /// Localize on an already prepared HSV frame.
    pub fn estimate_prepared(&self, hsv: &HsvImage) -> FrameEstimate {
        let markers = &self.params.markers;

        let mut others = [PixelPos::new(0, 0); 2];
        for (slot, profile) in others.iter_mut().zip(&markers.others) {
            match locate_marker(hsv, profile) {
                Ok(p) => *slot = p,
                Err(err) => return Self::missing_marker(err),
            }
        }
        let front = match locate_marker(hsv, &markers.front) {
            Ok(p) => p,
            Err(err) => return Self::missing_marker(err),
        };

        let pose = match RoverPose::from_markers(front, others, self.params.max_marker_spread) {
            Ok(pose) => pose,
            Err(rejected) => {
                debug!("markers spread {:.1} px, pose rejected", rejected.spread_px);
                return FrameEstimate::failed(Observation::Implausible {
                    spread_px: rejected.spread_px,
                });
            }
        };

        let target = match locate_target(hsv, &self.params.target, pose.centroid) {
            Ok(t) => t,
            Err(_) => {
                return FrameEstimate {
                    observation: Observation::TargetLost,
                    pose: Some(pose),
                    target: None,
                }
            }
        };

        let nav = pose.navigation_to(target);
        debug!(
            "centroid ({}, {}) heading {:.1}, target ({}, {}): bearing {:.1} dist {:.1}",
            pose.centroid.x,
            pose.centroid.y,
            pose.heading_deg,
            target.x,
            target.y,
            nav.bearing_deg,
            nav.distance_px
        );

        FrameEstimate {
            observation: Observation::Navigation(nav),
            pose: Some(pose),
            target: Some(target),
        }
    }

    fn missing_marker(err: LocalizeError) -> FrameEstimate {
        let profile = match err {
            LocalizeError::NoRegion { profile } => profile,
            LocalizeError::NoTarget => String::from("target"),
        };
        FrameEstimate::failed(Observation::MissingMarker { profile })
    }
}

impl Default for NavigationEstimator {
    fn default() -> Self {
        Self::new(LocalizerParams::default())
    }
}
