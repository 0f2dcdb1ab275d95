//! Plane geometry used by placement, edge construction and clustering.

use serde::{Deserialize, Serialize};

/// A point in map pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn distance_squared(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Arithmetic mean of a set of points, `None` when empty.
    pub fn mean<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Point> {
        let mut count = 0usize;
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        for p in points {
            sum_x += p.x;
            sum_y += p.y;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        Some(Point::new(sum_x / count as f64, sum_y / count as f64))
    }
}

/// Implemented by payloads that sit somewhere on the map.
pub trait Positioned {
    fn position(&self) -> Point;
}

impl Positioned for Point {
    fn position(&self) -> Point {
        *self
    }
}

/// Sign of the cross product (b - a) x (c - a).
fn orientation(a: &Point, b: &Point, c: &Point) -> i8 {
    let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
    if cross > 0.0 {
        1
    } else if cross < 0.0 {
        -1
    } else {
        0
    }
}

/// `q` lies on segment `p`-`r`, given the three points are collinear.
fn on_segment(p: &Point, q: &Point, r: &Point) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// Whether segment `p1`-`p2` touches segment `p3`-`p4`.
///
/// Collinear overlap and touching endpoints count as an intersection; callers
/// that want to ignore shared endpoints must filter those pairs out first.
pub fn segments_intersect(p1: &Point, p2: &Point, p3: &Point, p4: &Point) -> bool {
    let o1 = orientation(p1, p2, p3);
    let o2 = orientation(p1, p2, p4);
    let o3 = orientation(p3, p4, p1);
    let o4 = orientation(p3, p4, p2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == 0 && on_segment(p1, p3, p2))
        || (o2 == 0 && on_segment(p1, p4, p2))
        || (o3 == 0 && on_segment(p3, p1, p4))
        || (o4 == 0 && on_segment(p3, p2, p4))
}

/// Angle in degrees between the rays `origin -> a` and `origin -> b`, in `[0, 180]`.
///
/// Returns `None` if either ray has zero length.
pub fn angle_between(origin: &Point, a: &Point, b: &Point) -> Option<f64> {
    let (ux, uy) = (a.x - origin.x, a.y - origin.y);
    let (vx, vy) = (b.x - origin.x, b.y - origin.y);
    let len_u = (ux * ux + uy * uy).sqrt();
    let len_v = (vx * vx + vy * vy).sqrt();
    if len_u == 0.0 || len_v == 0.0 {
        return None;
    }
    let cos = ((ux * vx + uy * vy) / (len_u * len_v)).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_crossing_segments() {
        assert!(segments_intersect(&p(0.0, 0.0), &p(10.0, 10.0), &p(0.0, 10.0), &p(10.0, 0.0)));
        assert!(!segments_intersect(&p(0.0, 0.0), &p(10.0, 0.0), &p(0.0, 5.0), &p(10.0, 5.0)));
        assert!(!segments_intersect(&p(0.0, 0.0), &p(4.0, 4.0), &p(5.0, 5.0), &p(9.0, 0.0)));
    }

    #[test]
    fn test_collinear_overlap_counts_as_intersection() {
        assert!(segments_intersect(&p(0.0, 0.0), &p(6.0, 0.0), &p(4.0, 0.0), &p(9.0, 0.0)));
        assert!(!segments_intersect(&p(0.0, 0.0), &p(3.0, 0.0), &p(4.0, 0.0), &p(9.0, 0.0)));
    }

    #[test]
    fn test_angle_between() {
        let o = p(0.0, 0.0);
        let right = angle_between(&o, &p(1.0, 0.0), &p(0.0, 3.0)).unwrap();
        assert!((right - 90.0).abs() < 1e-9);

        let opposite = angle_between(&o, &p(1.0, 0.0), &p(-2.0, 0.0)).unwrap();
        assert!((opposite - 180.0).abs() < 1e-9);

        assert!(angle_between(&o, &o, &p(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_mean() {
        let pts = [p(0.0, 0.0), p(2.0, 4.0)];
        assert_eq!(Point::mean(&pts), Some(p(1.0, 2.0)));
        assert_eq!(Point::mean(&[]), None);
    }
}
