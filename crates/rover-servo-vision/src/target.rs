use log::debug;
use rover_servo_core::{distance, find_regions, HsvImage, PixelPos};
use serde::{Deserialize, Serialize};

use crate::error::LocalizeError;
use crate::params::TargetParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// One dark region measured for the target gate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetCandidate {
    pub position: PixelPos,
    /// Contour area in px².
    pub area: f64,
    /// Minimum enclosing circle radius in px.
    pub radius: f64,
}

/// Measure every region of the target's value mask.
///
/// Only outer boundaries are traced: a bright hole inside a dark blob adds no
/// candidate of its own, and the blob's area includes the hole.
pub fn target_candidates(hsv: &HsvImage, params: &TargetParams) -> Vec<TargetCandidate> {
    let mask = params.profile().mask(hsv);
    find_regions(&mask)
        .iter()
        .filter_map(|region| {
            let area = region.contour_area();
            // area gate before the enclosing circle
            if area < params.min_area || area > params.max_area {
                return None;
            }
            let circle = region.enclosing_circle()?;
            let centroid = region.centroid()?;
            Some(TargetCandidate {
                position: PixelPos::from_point(centroid),
                area,
                radius: circle.radius,
            })
        })
        .collect()
}

/// Accepted candidate farthest from the rover centroid.
///
/// The rover body can pass the same gate near contact and is always the
/// nearer blob. Ties keep the earlier candidate.
pub fn select_target(
    candidates: &[TargetCandidate],
    rover: PixelPos,
    params: &TargetParams,
) -> Option<PixelPos> {
    let mut best: Option<(PixelPos, f64)> = None;
    for c in candidates.iter().filter(|c| params.accepts(c)) {
        let d = distance(c.position, rover);
        if best.is_none_or(|(_, best_d)| d > best_d) {
            best = Some((c.position, d));
        }
    }
    best.map(|(p, _)| p)
}

/// Locate the target in a prepared frame, disambiguating by rover position.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(hsv, params)))]
pub fn locate_target(
    hsv: &HsvImage,
    params: &TargetParams,
    rover: PixelPos,
) -> Result<PixelPos, LocalizeError> {
    let candidates = target_candidates(hsv, params);
    debug!("target: {} candidates in area band", candidates.len());
    select_target(&candidates, rover, params).ok_or(LocalizeError::NoTarget)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(x: i32, y: i32, area: f64, radius: f64) -> TargetCandidate {
        TargetCandidate {
            position: PixelPos::new(x, y),
            area,
            radius,
        }
    }

    #[test]
    fn ring_yields_one_candidate_spanning_its_hole() {
        // 80x80 bright frame, dark 40x40 square at (20, 20) with a 20x20 bright hole
        let (width, height) = (80, 80);
        let mut data = [0u8, 0, 200].repeat(width * height);
        for y in 20..60 {
            for x in 20..60 {
                let hole = (30..50).contains(&x) && (30..50).contains(&y);
                if !hole {
                    data[(y * width + x) * 3 + 2] = 20;
                }
            }
        }
        let hsv = HsvImage {
            width,
            height,
            data,
        };

        let candidates = target_candidates(&hsv, &TargetParams::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].position, PixelPos::new(39, 39));
        assert_eq!(candidates[0].area, 39.0 * 39.0);
    }

    #[test]
    fn area_band_is_inclusive() {
        let params = TargetParams::default();
        assert!(!params.accepts(&candidate(0, 0, 1199.0, 20.0)));
        assert!(params.accepts(&candidate(0, 0, 1200.0, 20.0)));
        assert!(params.accepts(&candidate(0, 0, 2000.0, 20.0)));
        assert!(!params.accepts(&candidate(0, 0, 2001.0, 20.0)));
    }

    #[test]
    fn radius_cap_is_inclusive() {
        let params = TargetParams::default();
        assert!(params.accepts(&candidate(0, 0, 1500.0, 50.0)));
        assert!(!params.accepts(&candidate(0, 0, 1500.0, 51.0)));
    }

    #[test]
    fn farthest_valid_candidate_wins() {
        let params = TargetParams::default();
        let rover = PixelPos::new(100, 100);
        let candidates = [
            candidate(150, 100, 1500.0, 25.0), // 50 px
            candidate(100, 250, 1500.0, 25.0), // 150 px
        ];
        assert_eq!(
            select_target(&candidates, rover, &params),
            Some(PixelPos::new(100, 250))
        );
    }

    #[test]
    fn rejected_candidates_never_win_on_distance() {
        let params = TargetParams::default();
        let rover = PixelPos::new(0, 0);
        let candidates = [
            candidate(10, 0, 1500.0, 25.0),
            candidate(900, 0, 1199.0, 25.0),
            candidate(0, 900, 1500.0, 51.0),
        ];
        assert_eq!(
            select_target(&candidates, rover, &params),
            Some(PixelPos::new(10, 0))
        );
        assert_eq!(select_target(&candidates[1..], rover, &params), None);
    }

    #[test]
    fn equal_distances_keep_first() {
        let params = TargetParams::default();
        let rover = PixelPos::new(0, 0);
        let candidates = [
            candidate(30, 40, 1500.0, 25.0),
            candidate(40, 30, 1500.0, 25.0),
        ];
        assert_eq!(
            select_target(&candidates, rover, &params),
            Some(PixelPos::new(30, 40))
        );
    }
}
