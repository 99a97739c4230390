use log::debug;
use rover_servo_core::{find_regions, ColorThresholdProfile, HsvImage, PixelPos};

use crate::error::LocalizeError;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Pixel position of one colored marker.
///
/// Every region of the profile's mask with nonzero contour area contributes
/// its truncated centroid; the result is the truncated mean over those
/// regions. Spurious regions pull the mean toward themselves. Only outer
/// boundaries are traced, so a hole inside a patch never counts as a region.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(hsv, profile), fields(profile = %profile.name))
)]
pub fn locate_marker(
    hsv: &HsvImage,
    profile: &ColorThresholdProfile,
) -> Result<PixelPos, LocalizeError> {
    let mask = profile.mask(hsv);
    let regions = find_regions(&mask);
    debug!("{}: {} regions", profile.name, regions.len());

    let mut sum_x = 0i64;
    let mut sum_y = 0i64;
    let mut count = 0usize;
    for region in &regions {
        if region.contour_area() <= 0.0 {
            continue;
        }
        let Some(c) = region.centroid() else {
            continue;
        };
        let p = PixelPos::from_point(c);
        sum_x += p.x as i64;
        sum_y += p.y as i64;
        count += 1;
    }

    if count == 0 {
        return Err(LocalizeError::NoRegion {
            profile: profile.name.clone(),
        });
    }

    let n = count as f64;
    Ok(PixelPos::new(
        (sum_x as f64 / n) as i32,
        (sum_y as f64 / n) as i32,
    ))
}
