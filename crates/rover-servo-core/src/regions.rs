//! Connected-region extraction on binary masks.

use nalgebra::Point2;

use crate::geometry::{min_enclosing_circle, Circle};
use crate::image::GrayImage;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// One 8-connected region of set mask pixels.
#[derive(Clone, Debug)]
pub struct Region {
    pub pixel_count: usize,
    /// First-order raw moments over pixel centers.
    pub m10: f64,
    pub m01: f64,
    /// Outer contour through pixel centers, clockwise in image coordinates.
    pub contour: Vec<Point2<f64>>,
}

impl Region {
    /// Moment centroid, `None` for an empty region.
    pub fn centroid(&self) -> Option<Point2<f64>> {
        if self.pixel_count == 0 {
            return None;
        }
        let n = self.pixel_count as f64;
        Some(Point2::new(self.m10 / n, self.m01 / n))
    }

    /// Area enclosed by the outer contour polygon (shoelace).
    ///
    /// Zero for isolated pixels and one-pixel-wide strokes.
    pub fn contour_area(&self) -> f64 {
        let n = self.contour.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice = 0.0;
        for i in 0..n {
            let a = self.contour[i];
            let b = self.contour[(i + 1) % n];
            twice += a.x * b.y - b.x * a.y;
        }
        0.5 * twice.abs()
    }

    pub fn enclosing_circle(&self) -> Option<Circle> {
        min_enclosing_circle(&self.contour)
    }
}

/// Clockwise on screen (y down), starting east.
const DIRS: [(isize, isize); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];
const WEST: usize = 4;

fn dir_index(dx: isize, dy: isize) -> usize {
    DIRS.iter()
        .position(|&d| d == (dx, dy))
        .unwrap_or(WEST)
}

fn set_at(mask: &GrayImage, x: isize, y: isize) -> bool {
    x >= 0
        && y >= 0
        && (x as usize) < mask.width
        && (y as usize) < mask.height
        && mask.is_set(x as usize, y as usize)
}

/// Moore-neighbor tracing with Jacob's stopping criterion.
///
/// `start` must be the first pixel of its region in raster order, so its
/// west neighbor is background.
fn trace_outer_contour(mask: &GrayImage, start: (usize, usize)) -> Vec<Point2<f64>> {
    let start = (start.0 as isize, start.1 as isize);
    let mut contour = vec![Point2::new(start.0 as f64, start.1 as f64)];
    let mut p = start;
    let mut back = WEST;
    let mut first_move: Option<usize> = None;
    let limit = 4 * mask.width * mask.height + 8;

    for _ in 0..limit {
        let next = (1..=8).map(|k| (back + k) % 8).find(|&d| {
            let (dx, dy) = DIRS[d];
            set_at(mask, p.0 + dx, p.1 + dy)
        });
        let Some(d) = next else {
            break; // isolated pixel
        };

        if p == start {
            match first_move {
                Some(d0) if d0 == d => break,
                None => first_move = Some(d),
                _ => {}
            }
        }

        let (dx, dy) = DIRS[d];
        let q = (p.0 + dx, p.1 + dy);
        // The background cell scanned just before `q`, seen from `q`.
        let (cx, cy) = DIRS[(d + 7) % 8];
        back = dir_index(p.0 + cx - q.0, p.1 + cy - q.1);
        p = q;

        if p == start && first_move.is_some() {
            // Closing move; the next iteration decides whether to stop.
            continue;
        }
        contour.push(Point2::new(p.0 as f64, p.1 as f64));
    }

    contour
}

/// Label 8-connected regions in row-major discovery order.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(mask), fields(width = mask.width, height = mask.height))
)]
pub fn find_regions(mask: &GrayImage) -> Vec<Region> {
    let (w, h) = (mask.width, mask.height);
    let mut visited = vec![false; w * h];
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut out = Vec::new();

    for y0 in 0..h {
        for x0 in 0..w {
            if visited[y0 * w + x0] || !mask.is_set(x0, y0) {
                continue;
            }

            let mut pixel_count = 0usize;
            let (mut m10, mut m01) = (0.0f64, 0.0f64);
            visited[y0 * w + x0] = true;
            stack.push((x0, y0));

            while let Some((x, y)) = stack.pop() {
                pixel_count += 1;
                m10 += x as f64;
                m01 += y as f64;

                for (dx, dy) in DIRS {
                    let (nx, ny) = (x as isize + dx, y as isize + dy);
                    if !set_at(mask, nx, ny) {
                        continue;
                    }
                    let idx = ny as usize * w + nx as usize;
                    if !visited[idx] {
                        visited[idx] = true;
                        stack.push((nx as usize, ny as usize));
                    }
                }
            }

            out.push(Region {
                pixel_count,
                m10,
                m01,
                contour: trace_outer_contour(mask, (x0, y0)),
            });
        }
    }

    out
}
