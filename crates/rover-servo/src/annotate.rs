//! Diagnostic overlay for solved frames.
//!
//! Purely observational: nothing drawn here feeds back into control.

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use rover_servo_core::PixelPos;
use rover_servo_vision::{FrameEstimate, RoverMarkers};

const WHITE: [u8; 3] = [255, 255, 255];
const RED: [u8; 3] = [255, 0, 0];
const GREEN: [u8; 3] = [0, 255, 0];
const BLUE: [u8; 3] = [0, 0, 255];

const RING_RADIUS: i32 = 5;
const HEADING_LENGTH: f64 = 100.0;

fn put(img: &mut RgbImage, x: i32, y: i32, rgb: [u8; 3]) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    img.put_pixel(x as u32, y as u32, Rgb(rgb));
}

/// Midpoint circle outline.
pub fn draw_ring(img: &mut RgbImage, center: PixelPos, radius: i32, rgb: [u8; 3]) {
    let (cx, cy) = (center.x, center.y);
    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;
    while x >= y {
        for (dx, dy) in [
            (x, y),
            (y, x),
            (-y, x),
            (-x, y),
            (-x, -y),
            (-y, -x),
            (y, -x),
            (x, -y),
        ] {
            put(img, cx + dx, cy + dy, rgb);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

/// Bresenham segment, both endpoints included.
pub fn draw_line(img: &mut RgbImage, from: PixelPos, to: PixelPos, rgb: [u8; 3]) {
    let (mut x, mut y) = (from.x, from.y);
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put(img, x, y, rgb);
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Overlay markers, centroid, target, heading and the fixed reference axes.
pub fn annotate(img: &mut RgbImage, estimate: &FrameEstimate, markers: &RoverMarkers) {
    let origin = PixelPos::new(100, 100);
    draw_line(img, origin, PixelPos::new(200, 100), RED);
    draw_line(img, origin, PixelPos::new(100, 300), RED);

    let Some(pose) = estimate.pose.as_ref() else {
        return;
    };

    draw_ring(img, pose.front, RING_RADIUS, markers.front.annotate_rgb);
    for (pos, profile) in pose.others.iter().zip(&markers.others) {
        draw_ring(img, *pos, RING_RADIUS, profile.annotate_rgb);
    }
    draw_ring(img, pose.centroid, RING_RADIUS, WHITE);

    let heading = pose.heading_deg.to_radians();
    let tip = PixelPos::new(
        pose.centroid.x + (HEADING_LENGTH * heading.cos()) as i32,
        pose.centroid.y + (HEADING_LENGTH * heading.sin()) as i32,
    );
    draw_line(img, pose.centroid, tip, GREEN);

    if let Some(target) = estimate.target {
        draw_ring(img, target, RING_RADIUS, WHITE);
        draw_line(img, pose.centroid, target, BLUE);
    }
}

/// Save `img` as `frame_NNNNNN.png` under `dir`, creating it if needed.
pub fn save_annotated(
    dir: &Path,
    cycle: u64,
    img: &RgbImage,
) -> Result<PathBuf, image::ImageError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("frame_{cycle:06}.png"));
    img.save(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_servo_core::Observation;
    use rover_servo_vision::RoverPose;

    fn blank(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([0, 0, 0]))
    }

    #[test]
    fn line_covers_both_endpoints() {
        let mut img = blank(20, 20);
        draw_line(&mut img, PixelPos::new(2, 3), PixelPos::new(15, 9), RED);
        assert_eq!(img.get_pixel(2, 3).0, RED);
        assert_eq!(img.get_pixel(15, 9).0, RED);
    }

    #[test]
    fn ring_hits_cardinal_points_and_skips_center() {
        let mut img = blank(20, 20);
        draw_ring(&mut img, PixelPos::new(10, 10), 5, GREEN);
        for (x, y) in [(15, 10), (5, 10), (10, 15), (10, 5)] {
            assert_eq!(img.get_pixel(x, y).0, GREEN);
        }
        assert_eq!(img.get_pixel(10, 10).0, [0, 0, 0]);
    }

    #[test]
    fn drawing_off_canvas_is_clipped() {
        let mut img = blank(10, 10);
        draw_ring(&mut img, PixelPos::new(0, 0), 5, WHITE);
        draw_line(&mut img, PixelPos::new(-5, -5), PixelPos::new(30, 30), WHITE);
        assert_eq!(img.get_pixel(9, 9).0, WHITE);
    }

    #[test]
    fn overlay_marks_heading_and_target() {
        let pose = RoverPose::from_markers(
            PixelPos::new(200, 150),
            [PixelPos::new(170, 190), PixelPos::new(230, 190)],
            100.0,
        )
        .expect("pose");
        let estimate = FrameEstimate {
            observation: Observation::TargetLost,
            pose: Some(pose),
            target: Some(PixelPos::new(300, 176)),
        };
        let mut img = blank(400, 320);
        annotate(&mut img, &estimate, &RoverMarkers::default());

        assert_eq!(img.get_pixel(150, 100).0, RED);
        assert_eq!(img.get_pixel(100, 250).0, RED);
        // heading points straight up from the centroid (200, 176)
        assert_eq!(img.get_pixel(200, 120).0, GREEN);
        assert_eq!(img.get_pixel(250, 176).0, BLUE);
        assert_eq!(img.get_pixel(205, 150).0, [255, 0, 0]);
    }

    #[test]
    fn saves_numbered_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("nested");
        let path = save_annotated(&out, 7, &blank(4, 4)).expect("save");
        assert!(path.ends_with("frame_000007.png"));
        assert!(path.is_file());
    }
}
