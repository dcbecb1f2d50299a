//! Polygon helpers for the node ring
//!
//! The ring is closed: index `i` neighbours `i - 1` and `i + 1` modulo N.

use glam::Vec2;

use crate::{clamp_length, perp};

/// Unsigned shoelace area (accumulated in f64)
pub fn polygon_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    let mut sum = 0.0f64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        sum += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
    }
    (sum.abs() * 0.5) as f32
}

/// Vertex centroid (mean of points)
pub fn centroid(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return Vec2::ZERO;
    }
    points.iter().copied().sum::<Vec2>() / points.len() as f32
}

/// Previous and next index around a ring of `n`
#[inline]
pub fn neighbours(i: usize, n: usize) -> (usize, usize) {
    ((i + n - 1) % n, (i + 1) % n)
}

/// Unit normal of the chord `prev -> next`, flipped to point away from `center`
/// as seen from `anchor`.
pub fn outward_normal(prev: Vec2, next: Vec2, anchor: Vec2, center: Vec2) -> Vec2 {
    let normal = perp(next - prev).normalize_or_zero();
    if normal.dot(anchor - center) < 0.0 {
        -normal
    } else {
        normal
    }
}

/// Bounds on how far a node may stray from its base position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetLimits {
    pub max_out: f32,
    pub max_in: f32,
    pub max_tangential: f32,
}

impl OffsetLimits {
    pub fn from_max_offset(max_offset: f32) -> Self {
        use crate::consts::{MAX_IN_FACTOR, MAX_OUT_FACTOR};
        Self {
            max_out: max_offset * MAX_OUT_FACTOR,
            max_in: max_offset * MAX_IN_FACTOR,
            max_tangential: max_offset,
        }
    }

    /// Clamp `offset` (from base) given the node's radial axis.
    ///
    /// The radial part is clamped to `[-max_in, max_out]`, the tangential part
    /// to `max_tangential` in length.
    pub fn clamp(&self, offset: Vec2, radial_axis: Vec2) -> Vec2 {
        let radial = offset.dot(radial_axis);
        let radial_clamped = radial.clamp(-self.max_in, self.max_out);
        let tangential = clamp_length(offset - radial_axis * radial, self.max_tangential);
        radial_axis * radial_clamped + tangential
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(side, 0.0),
            Vec2::new(side, side),
            Vec2::new(0.0, side),
        ]
    }

    #[test]
    fn test_area_orientation_independent() {
        let mut pts = square(10.0);
        assert!((polygon_area(&pts) - 100.0).abs() < 1e-4);
        pts.reverse();
        assert!((polygon_area(&pts) - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_centroid() {
        assert_eq!(centroid(&square(10.0)), Vec2::new(5.0, 5.0));
        assert_eq!(centroid(&[]), Vec2::ZERO);
    }

    #[test]
    fn test_outward_normal_points_away() {
        let pts = square(10.0);
        let center = centroid(&pts);
        // Top edge midpoint neighbours: normal must point toward -y
        let n = outward_normal(pts[0], pts[1], Vec2::new(5.0, 0.0), center);
        assert!((n - Vec2::new(0.0, -1.0)).length() < 1e-5);
        // Reversed chord gives the same answer
        let n = outward_normal(pts[1], pts[0], Vec2::new(5.0, 0.0), center);
        assert!((n - Vec2::new(0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_offset_clamp() {
        let limits = OffsetLimits::from_max_offset(10.0);
        let axis = Vec2::X;

        let out = limits.clamp(Vec2::new(100.0, 0.0), axis);
        assert!((out.x - 13.5).abs() < 1e-4);

        let inward = limits.clamp(Vec2::new(-100.0, 0.0), axis);
        assert!((inward.x + 8.5).abs() < 1e-4);

        let tang = limits.clamp(Vec2::new(1.0, 50.0), axis);
        assert!((tang.x - 1.0).abs() < 1e-4);
        assert!((tang.y - 10.0).abs() < 1e-4);

        let small = Vec2::new(2.0, -3.0);
        assert_eq!(limits.clamp(small, axis), small);
    }
}
