use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Integer pixel position in image coordinates (x right, y down).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PixelPos {
    pub x: i32,
    pub y: i32,
}

impl PixelPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Truncate a sub-pixel point toward zero.
    pub fn from_point(p: Point2<f64>) -> Self {
        Self {
            x: p.x as i32,
            y: p.y as i32,
        }
    }

    pub fn to_point(self) -> Point2<f64> {
        Point2::new(self.x as f64, self.y as f64)
    }
}

/// Arithmetic mean of three positions, truncated to integer pixels.
pub fn centroid(a: PixelPos, b: PixelPos, c: PixelPos) -> PixelPos {
    let x = (a.x + b.x + c.x) as f64 / 3.0;
    let y = (a.y + b.y + c.y) as f64 / 3.0;
    PixelPos::new(x as i32, y as i32)
}

/// Euclidean distance between two pixel positions.
pub fn distance(a: PixelPos, b: PixelPos) -> f64 {
    (b.to_point() - a.to_point()).norm()
}

/// Angle of `b - a` in degrees, in (-180, 180].
pub fn bearing(a: PixelPos, b: PixelPos) -> f64 {
    let d: Vector2<f64> = b.to_point() - a.to_point();
    d.y.atan2(d.x).to_degrees()
}

/// Wrap an angle in degrees into (-180, 180].
pub fn normalize_degrees(angle: f64) -> f64 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}

/// Largest distance between any two of the given positions.
pub fn max_pairwise_distance(points: &[PixelPos]) -> f64 {
    let mut best = 0.0f64;
    for (i, &a) in points.iter().enumerate() {
        for &b in &points[i + 1..] {
            best = best.max(distance(a, b));
        }
    }
    best
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2<f64>,
    pub radius: f64,
}

impl Circle {
    const EPS: f64 = 1e-7;

    fn contains(&self, p: &Point2<f64>) -> bool {
        (p - self.center).norm() <= self.radius * (1.0 + Self::EPS) + Self::EPS
    }

    fn from_two(a: &Point2<f64>, b: &Point2<f64>) -> Self {
        let center = nalgebra::center(a, b);
        Self {
            center,
            radius: (a - center).norm(),
        }
    }

    fn from_three(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Self {
        let ab = b - a;
        let ac = c - a;
        let det = 2.0 * (ab.x * ac.y - ab.y * ac.x);
        if det.abs() < 1e-12 {
            // Collinear: the circle over the farthest pair covers the third point.
            return [Self::from_two(a, b), Self::from_two(a, c), Self::from_two(b, c)]
                .into_iter()
                .max_by(|l, r| l.radius.total_cmp(&r.radius))
                .unwrap_or(Self::from_two(a, b));
        }
        let ab2 = ab.norm_squared();
        let ac2 = ac.norm_squared();
        let ux = (ac.y * ab2 - ab.y * ac2) / det;
        let uy = (ab.x * ac2 - ac.x * ab2) / det;
        let offset = Vector2::new(ux, uy);
        Self {
            center: a + offset,
            radius: offset.norm(),
        }
    }
}

/// Smallest circle containing every point (incremental Welzl).
///
/// Returns `None` for an empty input.
pub fn min_enclosing_circle(points: &[Point2<f64>]) -> Option<Circle> {
    let first = points.first()?;
    let mut circle = Circle {
        center: *first,
        radius: 0.0,
    };

    for i in 1..points.len() {
        let p = &points[i];
        if circle.contains(p) {
            continue;
        }
        circle = Circle {
            center: *p,
            radius: 0.0,
        };
        for j in 0..i {
            let q = &points[j];
            if circle.contains(q) {
                continue;
            }
            circle = Circle::from_two(p, q);
            for r in &points[..j] {
                if !circle.contains(r) {
                    circle = Circle::from_three(p, q, r);
                }
            }
        }
    }

    Some(circle)
}
