//! Closed Catmull-Rom curve through the node ring

use glam::Vec2;
use std::fmt::Write;

/// One cubic Bezier segment, starting where the previous one ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicSegment {
    pub c1: Vec2,
    pub c2: Vec2,
    pub to: Vec2,
}

/// Closed piecewise-cubic curve
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClosedCurve {
    pub start: Vec2,
    pub segments: Vec<CubicSegment>,
}

impl ClosedCurve {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// End point of the last segment (equals `start` for a closed curve)
    pub fn end(&self) -> Option<Vec2> {
        self.segments.last().map(|s| s.to)
    }

    /// SVG path data, `M x y C ... Z`, coordinates rounded to two decimals.
    /// Empty curves give an empty string.
    pub fn to_svg_path(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let mut d = String::with_capacity(16 + self.segments.len() * 48);
        let _ = write!(d, "M {} {}", fmt_coord(self.start.x), fmt_coord(self.start.y));
        for s in &self.segments {
            let _ = write!(
                d,
                " C {} {}, {} {}, {} {}",
                fmt_coord(s.c1.x),
                fmt_coord(s.c1.y),
                fmt_coord(s.c2.x),
                fmt_coord(s.c2.y),
                fmt_coord(s.to.x),
                fmt_coord(s.to.y)
            );
        }
        d.push_str(" Z");
        d
    }
}

/// Round to two decimals, shortest form, no negative zero
fn fmt_coord(v: f32) -> String {
    let r = (v as f64 * 100.0).round() / 100.0;
    if r == 0.0 || !r.is_finite() {
        "0".to_string()
    } else {
        r.to_string()
    }
}

/// Closed Catmull-Rom spline through `points` with the given tension.
///
/// Segment `i` runs from `points[i]` to `points[i + 1]`. Fewer than four
/// points yield an empty curve.
pub fn catmull_rom_closed(points: &[Vec2], tension: f32) -> ClosedCurve {
    let n = points.len();
    if n < 4 {
        return ClosedCurve::default();
    }
    let k = tension / 6.0;
    let segments = (0..n)
        .map(|i| {
            let p0 = points[(i + n - 1) % n];
            let p1 = points[i];
            let p2 = points[(i + 1) % n];
            let p3 = points[(i + 2) % n];
            CubicSegment {
                c1: p1 + (p2 - p0) * k,
                c2: p2 - (p3 - p1) * k,
                to: p2,
            }
        })
        .collect();

    ClosedCurve {
        start: points[0],
        segments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_closed_with_one_segment_per_point() {
        let pts: Vec<Vec2> = (0..44)
            .map(|i| {
                let a = i as f32 / 44.0 * std::f32::consts::TAU;
                Vec2::new(100.0 + a.cos() * 50.0, 100.0 + a.sin() * 30.0)
            })
            .collect();
        let curve = catmull_rom_closed(&pts, 0.65);
        assert_eq!(curve.segments.len(), 44);
        assert_eq!(curve.end(), Some(curve.start));

        let d = curve.to_svg_path();
        assert!(d.starts_with("M "));
        assert!(d.ends_with(" Z"));
        assert_eq!(d.matches(" C ").count(), 44);
    }

    #[test]
    fn test_too_few_points() {
        let curve = catmull_rom_closed(&square()[..3], 0.65);
        assert!(curve.is_empty());
        assert_eq!(curve.to_svg_path(), "");
    }

    #[test]
    fn test_control_points() {
        let curve = catmull_rom_closed(&square(), 0.6);
        // Segment 0: p0 = (0,10), p1 = (0,0), p2 = (10,0), p3 = (10,10)
        let s = curve.segments[0];
        assert!((s.c1 - Vec2::new(1.0, -1.0)).length() < 1e-5);
        assert!((s.c2 - Vec2::new(9.0, -1.0)).length() < 1e-5);
        assert_eq!(s.to, Vec2::new(10.0, 0.0));

        // Zero tension degenerates to straight edges
        let flat = catmull_rom_closed(&square(), 0.0);
        assert_eq!(flat.segments[1].c1, Vec2::new(10.0, 0.0));
        assert_eq!(flat.segments[1].c2, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_svg_formatting() {
        let curve = catmull_rom_closed(&square(), 0.6);
        assert_eq!(
            curve.to_svg_path(),
            "M 0 0 C 1 -1, 9 -1, 10 0 C 11 1, 11 9, 10 10 C 9 11, 1 11, 0 10 C -1 9, -1 1, 0 0 Z"
        );
        assert_eq!(fmt_coord(12.345_6), "12.35");
        assert_eq!(fmt_coord(-0.001), "0");
        assert_eq!(fmt_coord(3.1), "3.1");
    }
}
