use rover_servo_core::{BlurParams, ChannelRange, ColorThresholdProfile};
use serde::{Deserialize, Serialize};

use crate::target::TargetCandidate;

/// The three color markers on the rover body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoverMarkers {
    /// Marker the heading points through.
    pub front: ColorThresholdProfile,
    pub others: [ColorThresholdProfile; 2],
}

impl Default for RoverMarkers {
    fn default() -> Self {
        Self {
            front: ColorThresholdProfile::red(),
            others: [ColorThresholdProfile::green(), ColorThresholdProfile::blue()],
        }
    }
}

impl RoverMarkers {
    /// Profiles in localization order: the two others, then the front marker.
    pub fn iter(&self) -> impl Iterator<Item = &ColorThresholdProfile> {
        self.others.iter().chain(std::iter::once(&self.front))
    }

    pub fn by_name(&self, name: &str) -> Option<&ColorThresholdProfile> {
        self.iter().find(|p| p.name == name)
    }
}

/// Size and shape gate for the dark target blob.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetParams {
    /// Brightness band of the target; hue and saturation are unconstrained.
    pub value: ChannelRange,
    /// Inclusive contour-area band in px².
    pub min_area: f64,
    pub max_area: f64,
    /// Largest accepted minimum-enclosing-circle radius in px.
    pub max_radius: f64,
}

impl Default for TargetParams {
    fn default() -> Self {
        Self {
            value: ChannelRange::new(0, 70),
            min_area: 1200.0,
            max_area: 2000.0,
            max_radius: 50.0,
        }
    }
}

impl TargetParams {
    pub fn profile(&self) -> ColorThresholdProfile {
        ColorThresholdProfile::value_only("target", self.value)
    }

    /// Area inside the band and enclosing radius at or under the cap.
    pub fn accepts(&self, candidate: &TargetCandidate) -> bool {
        candidate.area >= self.min_area
            && candidate.area <= self.max_area
            && candidate.radius <= self.max_radius
    }
}

fn default_max_marker_spread() -> f64 {
    100.0
}

/// Configuration for one localization pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalizerParams {
    #[serde(default)]
    pub blur: BlurParams,
    #[serde(default)]
    pub markers: RoverMarkers,
    #[serde(default)]
    pub target: TargetParams,
    /// Largest pairwise marker distance (px) of a plausible rover pose.
    #[serde(default = "default_max_marker_spread")]
    pub max_marker_spread: f64,
}

impl Default for LocalizerParams {
    fn default() -> Self {
        Self {
            blur: BlurParams::default(),
            markers: RoverMarkers::default(),
            target: TargetParams::default(),
            max_marker_spread: default_max_marker_spread(),
        }
    }
}
