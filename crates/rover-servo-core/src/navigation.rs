use serde::{Deserialize, Serialize};

/// Relative bearing and distance from the rover centroid to the target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavigationVector {
    /// Target bearing minus heading, degrees in (-180, 180]. Positive turns right.
    pub bearing_deg: f64,
    /// Euclidean pixel distance.
    pub distance_px: f64,
}

/// Outcome of one localization pass.
///
/// The failure cases are not errors: each is an expected transient that the
/// approach state machine reacts to differently.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Observation {
    Navigation(NavigationVector),
    /// A rover marker produced no region.
    MissingMarker { profile: String },
    /// All markers found, but two of them are farther apart than the rover allows.
    Implausible { spread_px: f64 },
    /// Rover pose is valid but no target candidate survived filtering.
    TargetLost,
}

impl Observation {
    pub fn navigation(&self) -> Option<&NavigationVector> {
        match self {
            Observation::Navigation(nav) => Some(nav),
            _ => None,
        }
    }
}
