use rover_servo_core::{
    bearing, centroid, distance, max_pairwise_distance, normalize_degrees, NavigationVector,
    PixelPos,
};
use serde::{Deserialize, Serialize};

/// Marker triple spread wider than the rover body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImplausiblePose {
    pub spread_px: f64,
}

/// Rover centroid and heading derived from its three markers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoverPose {
    pub front: PixelPos,
    pub others: [PixelPos; 2],
    pub centroid: PixelPos,
    /// Bearing from the centroid through the front marker, degrees.
    pub heading_deg: f64,
}

impl RoverPose {
    /// Build a pose, rejecting triples whose widest pair exceeds `max_spread`.
    pub fn from_markers(
        front: PixelPos,
        others: [PixelPos; 2],
        max_spread: f64,
    ) -> Result<Self, ImplausiblePose> {
        let spread_px = max_pairwise_distance(&[others[0], others[1], front]);
        if spread_px > max_spread {
            return Err(ImplausiblePose { spread_px });
        }
        let c = centroid(front, others[0], others[1]);
        Ok(Self {
            front,
            others,
            centroid: c,
            heading_deg: bearing(c, front),
        })
    }

    /// Relative bearing and distance from the centroid to `target`.
    pub fn navigation_to(&self, target: PixelPos) -> NavigationVector {
        let target_bearing = bearing(self.centroid, target);
        NavigationVector {
            bearing_deg: normalize_degrees(target_bearing - self.heading_deg),
            distance_px: distance(self.centroid, target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_wide_marker_triples() {
        let err = RoverPose::from_markers(
            PixelPos::new(0, 0),
            [PixelPos::new(20, 0), PixelPos::new(0, 101)],
            100.0,
        )
        .unwrap_err();
        assert!(err.spread_px > 100.0);

        assert!(RoverPose::from_markers(
            PixelPos::new(0, 0),
            [PixelPos::new(60, 0), PixelPos::new(0, 80)],
            100.0,
        )
        .is_ok());
    }

    #[test]
    fn heading_points_through_front_marker() {
        // centroid (30, 30), front straight up the image
        let pose = RoverPose::from_markers(
            PixelPos::new(30, 0),
            [PixelPos::new(0, 45), PixelPos::new(60, 45)],
            100.0,
        )
        .expect("plausible");
        assert_eq!(pose.centroid, PixelPos::new(30, 30));
        assert_relative_eq!(pose.heading_deg, -90.0);
    }

    #[test]
    fn relative_bearing_is_wrapped() {
        // heading -90 (up); target down-left gives raw 180 - (-90) = 270 -> -90
        let pose = RoverPose::from_markers(
            PixelPos::new(30, 0),
            [PixelPos::new(0, 45), PixelPos::new(60, 45)],
            100.0,
        )
        .expect("plausible");
        let nav = pose.navigation_to(PixelPos::new(-70, 30));
        assert_relative_eq!(nav.bearing_deg, -90.0);
        assert_relative_eq!(nav.distance_px, 100.0);

        let right = pose.navigation_to(PixelPos::new(130, 30));
        assert_relative_eq!(right.bearing_deg, 90.0);
    }
}
