//! Planar geometry in feet.
//!
//! Polygon validity, winding normalization and containment tests shared by
//! the lot, the custom house outline and the drawing preview.
//!
//! Winding is measured with the shoelace formula: a positive signed area is
//! counter-clockwise. Every accepted polygon is stored counter-clockwise so
//! extrusion and roof code can rely on outward-facing edge normals.

use serde::{Deserialize, Serialize};

use crate::constants::GEOMETRY_EPSILON;
use crate::error::ValidationError;

/// A 2D point in feet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Rotates this point by `degrees` about `center`.
    pub fn rotated_about(&self, center: &Point, degrees: f64) -> Point {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Point::new(
            center.x + dx * cos - dy * sin,
            center.y + dx * sin + dy * cos,
        )
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Axis-aligned bounds `(min_x, min_y, max_x, max_y)`.
pub type Bounds = (f64, f64, f64, f64);

/// Signed shoelace area; positive for counter-clockwise winding.
pub fn signed_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = &points[(i + 1) % points.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Returns true if the polygon winds counter-clockwise.
pub fn is_ccw(points: &[Point]) -> bool {
    signed_area(points) > 0.0
}

/// Returns the points in counter-clockwise order.
pub fn ensure_ccw(mut points: Vec<Point>) -> Vec<Point> {
    if signed_area(&points) < 0.0 {
        points.reverse();
    }
    points
}

fn orientation(a: &Point, b: &Point, c: &Point) -> i8 {
    let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
    if cross.abs() <= GEOMETRY_EPSILON {
        0
    } else if cross > 0.0 {
        1
    } else {
        -1
    }
}

fn on_segment(a: &Point, p: &Point, b: &Point) -> bool {
    p.x <= a.x.max(b.x) + GEOMETRY_EPSILON
        && p.x >= a.x.min(b.x) - GEOMETRY_EPSILON
        && p.y <= a.y.max(b.y) + GEOMETRY_EPSILON
        && p.y >= a.y.min(b.y) - GEOMETRY_EPSILON
}

/// Tests whether segment `p1-p2` intersects segment `q1-q2`, touching and
/// collinear overlap included.
pub fn segments_intersect(p1: &Point, p2: &Point, q1: &Point, q2: &Point) -> bool {
    let o1 = orientation(p1, p2, q1);
    let o2 = orientation(p1, p2, q2);
    let o3 = orientation(q1, q2, p1);
    let o4 = orientation(q1, q2, p2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == 0 && on_segment(p1, q1, p2))
        || (o2 == 0 && on_segment(p1, q2, p2))
        || (o3 == 0 && on_segment(q1, p1, q2))
        || (o4 == 0 && on_segment(q1, p2, q2))
}

/// Checks that no two non-adjacent edges of the closed polygon intersect.
///
/// Pairwise O(n²); vertex counts are small.
pub fn is_simple(points: &[Point]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }

    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        if a.distance_to(b) <= GEOMETRY_EPSILON {
            return false;
        }
        // Adjacent edge folding back over this one.
        let c = &points[(i + 2) % n];
        if orientation(a, b, c) == 0 {
            let dot = (b.x - a.x) * (c.x - b.x) + (b.y - a.y) * (c.y - b.y);
            if dot < 0.0 {
                return false;
            }
        }
    }

    for i in 0..n {
        let a1 = &points[i];
        let a2 = &points[(i + 1) % n];
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let b1 = &points[j];
            let b2 = &points[(j + 1) % n];
            if segments_intersect(a1, a2, b1, b2) {
                return false;
            }
        }
    }
    true
}

/// Validity predicate used by the drawing preview: at least three vertices,
/// non-zero area and no self intersections.
pub fn is_valid_polygon(points: &[Point]) -> bool {
    points.len() >= 3 && signed_area(points).abs() > GEOMETRY_EPSILON && is_simple(points)
}

/// Validates a polygon outline and returns it in counter-clockwise order.
pub fn validate_polygon(points: &[Point]) -> Result<Vec<Point>, ValidationError> {
    let reason = if points.len() < 3 {
        Some(format!("at least 3 points are required (got {})", points.len()))
    } else if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        Some("coordinates must be finite".to_string())
    } else if signed_area(points).abs() <= GEOMETRY_EPSILON {
        Some("outline encloses no area".to_string())
    } else if !is_simple(points) {
        Some("edges must not cross".to_string())
    } else {
        None
    };
    if let Some(reason) = reason {
        tracing::debug!("Rejected {}-point outline: {}", points.len(), reason);
        return Err(ValidationError::invalid_polygon(reason));
    }
    Ok(ensure_ccw(points.to_vec()))
}

/// Even-odd point-in-polygon test.
pub fn point_in_polygon(point: &Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = &polygon[i];
        let pj = &polygon[j];
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Area-weighted centroid; falls back to the vertex average for degenerate input.
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::default();
    }
    let area = signed_area(points);
    if area.abs() <= GEOMETRY_EPSILON {
        let n = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        return Point::new(sx / n, sy / n);
    }

    let mut cx = 0.0;
    let mut cy = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = &points[(i + 1) % points.len()];
        let cross = a.x * b.y - b.x * a.y;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }
    Point::new(cx / (6.0 * area), cy / (6.0 * area))
}

/// Axis-aligned bounding box of the points.
pub fn bounds(points: &[Point]) -> Bounds {
    points.iter().fold(
        (
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        ),
        |(min_x, min_y, max_x, max_y), p| {
            (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
        raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_signed_area_sign() {
        let ccw = pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0)]);
        assert!((signed_area(&ccw) - 12.0).abs() < 1e-9);
        let mut cw = ccw.clone();
        cw.reverse();
        assert!((signed_area(&cw) + 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_segments_intersect_cross_and_touch() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(2.0, 2.0);
        let c = Point::new(0.0, 2.0);
        let d = Point::new(2.0, 0.0);
        assert!(segments_intersect(&a, &b, &c, &d));

        let e = Point::new(3.0, 3.0);
        let f = Point::new(4.0, 4.0);
        assert!(!segments_intersect(&a, &b, &e, &f));
        assert!(segments_intersect(&a, &b, &b, &f));
    }

    #[test]
    fn test_backtracking_spike_is_not_simple() {
        let spike = pts(&[(0.0, 0.0), (4.0, 0.0), (2.0, 0.0), (2.0, 3.0)]);
        assert!(!is_simple(&spike));
    }

    #[test]
    fn test_centroid_of_square() {
        let square = pts(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        let c = centroid(&square);
        assert!((c.x - 1.0).abs() < 1e-9 && (c.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_in_concave_polygon() {
        // L-shape
        let l = pts(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 1.0),
            (1.0, 1.0),
            (1.0, 4.0),
            (0.0, 4.0),
        ]);
        assert!(point_in_polygon(&Point::new(0.5, 3.0), &l));
        assert!(!point_in_polygon(&Point::new(3.0, 3.0), &l));
    }

    #[test]
    fn test_rotated_about() {
        let p = Point::new(1.0, 0.0).rotated_about(&Point::default(), 90.0);
        assert!(p.x.abs() < 1e-9 && (p.y - 1.0).abs() < 1e-9);
    }
}
