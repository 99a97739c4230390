use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Rig calibration for the approach sequence.
///
/// Distances are in pixels measured on the overhead camera frame, angles in
/// degrees. All values are empirical for one camera height and rover size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApproachParams {
    /// Heading tolerance before final approach.
    pub coarse_angle_deg: f64,
    /// Heading tolerance once `approached` is set.
    pub fine_angle_deg: f64,
    /// Below this distance the final approach begins and turning is re-enabled once.
    pub final_approach_distance: f64,
    /// At or below this distance the forks engage and the rover stops.
    pub engage_distance: f64,
    /// Above this distance the forks are commanded down every cycle.
    pub fork_lower_distance: f64,
    /// Above this distance all flags reset.
    pub disengage_distance: f64,
    /// Signed angular pulse magnitude; positive turns right for a positive bearing.
    pub turn_pulse: f64,
    pub forward_speed: f64,
    pub fork_up: f64,
    pub fork_down: f64,
    /// Sleep after each angular send of a pulse.
    pub pulse_settle_ms: u64,
}

impl Default for ApproachParams {
    fn default() -> Self {
        Self {
            coarse_angle_deg: 3.0,
            fine_angle_deg: 1.0,
            final_approach_distance: 300.0,
            engage_distance: 130.0,
            fork_lower_distance: 250.0,
            disengage_distance: 325.0,
            turn_pulse: 2.0,
            forward_speed: 8.0,
            fork_up: 180.0,
            fork_down: 120.0,
            pulse_settle_ms: 5,
        }
    }
}

impl ApproachParams {
    pub fn angle_threshold(&self, approached: bool) -> f64 {
        if approached {
            self.fine_angle_deg
        } else {
            self.coarse_angle_deg
        }
    }

    pub fn pulse_settle(&self) -> Duration {
        Duration::from_millis(self.pulse_settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let p: ApproachParams =
            serde_json::from_str(r#"{ "turn_pulse": -2.0, "pulse_settle_ms": 0 }"#)
                .expect("parse");
        assert_eq!(p.turn_pulse, -2.0);
        assert_eq!(p.pulse_settle(), Duration::ZERO);
        assert_eq!(p.engage_distance, 130.0);
        assert_eq!(p.fork_up, 180.0);
    }

    #[test]
    fn threshold_tightens_on_final_approach() {
        let p = ApproachParams::default();
        assert_eq!(p.angle_threshold(false), 3.0);
        assert_eq!(p.angle_threshold(true), 1.0);
    }
}
