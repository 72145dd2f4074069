//! Geometry kernel
//!
//! Pure functions over image-space points: distance, polygon area,
//! vertex centroid and proximity testing. Nothing here holds state.

use serde::{Deserialize, Serialize};

/// A 2D point
///
/// Stored values are in image space (pixels of the original, unscaled
/// bitmap) unless a function says otherwise. Screen-space points use the
/// same type; [`crate::view`] converts between the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        distance(*self, *other)
    }

    /// Midpoint of the segment between `self` and `other`
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Div<f64> for Point {
    type Output = Point;

    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

/// Euclidean distance between two points
pub fn distance(p: Point, q: Point) -> f64 {
    let dx = q.x - p.x;
    let dy = q.y - p.y;
    (dx * dx + dy * dy).sqrt()
}

/// Polygon area using the shoelace formula
///
/// Indices wrap, so the polygon is implicitly closed. Returns 0 for fewer
/// than three points. Either winding order gives the same result.
/// Self-intersecting input yields the signed-sum magnitude, which is not
/// necessarily the visually enclosed area.
pub fn polygon_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }
    (area / 2.0).abs()
}

/// Arithmetic mean of the vertex coordinates
///
/// This is the vertex average, not the area-weighted centroid. It is only
/// used to place labels. An empty slice yields the origin.
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::ORIGIN;
    }
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|p| p.x).sum();
    let sum_y: f64 = points.iter().map(|p| p.y).sum();
    Point::new(sum_x / n, sum_y / n)
}

/// True iff `p` lies strictly closer than `threshold` to `q`
pub fn is_near(p: Point, q: Point, threshold: f64) -> bool {
    distance(p, q) < threshold
}
