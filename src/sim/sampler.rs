//! Rounded-rect boundary sampling
//!
//! Traces the host outline (straight edges and quarter-ellipse corners) as a
//! dense polyline, then resamples it to N points equally spaced by arc length.
//! The result is the rest shape of the membrane.

use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI};

use crate::consts::{ARC_STEPS, MIN_ARC_STEPS, MIN_SEGMENT};

/// One elliptical corner radius
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CornerRadius {
    pub rx: f32,
    pub ry: f32,
}

impl CornerRadius {
    pub fn new(rx: f32, ry: f32) -> Self {
        Self {
            rx: sanitize(rx),
            ry: sanitize(ry),
        }
    }

    pub fn circular(r: f32) -> Self {
        Self::new(r, r)
    }
}

/// Negative and non-finite radii read as zero
fn sanitize(r: f32) -> f32 {
    if r.is_finite() { r.max(0.0) } else { 0.0 }
}

/// Radii for all four corners
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CornerRadii {
    pub top_left: CornerRadius,
    pub top_right: CornerRadius,
    pub bottom_right: CornerRadius,
    pub bottom_left: CornerRadius,
}

impl CornerRadii {
    pub fn uniform(r: f32) -> Self {
        let c = CornerRadius::circular(r);
        Self {
            top_left: c,
            top_right: c,
            bottom_right: c,
            bottom_left: c,
        }
    }

    /// Scale overlapping radii down the way CSS does: any two radii sharing an
    /// edge never sum to more than that edge.
    pub fn clamped(&self, width: f32, height: f32) -> Self {
        let (tl, tr, br, bl) = (
            CornerRadius::new(self.top_left.rx, self.top_left.ry),
            CornerRadius::new(self.top_right.rx, self.top_right.ry),
            CornerRadius::new(self.bottom_right.rx, self.bottom_right.ry),
            CornerRadius::new(self.bottom_left.rx, self.bottom_left.ry),
        );

        let (tlx, trx) = clamp_pair(tl.rx, tr.rx, width);
        let (blx, brx) = clamp_pair(bl.rx, br.rx, width);
        let (tly, bly) = clamp_pair(tl.ry, bl.ry, height);
        let (try_, bry) = clamp_pair(tr.ry, br.ry, height);

        Self {
            top_left: CornerRadius { rx: tlx, ry: tly },
            top_right: CornerRadius { rx: trx, ry: try_ },
            bottom_right: CornerRadius { rx: brx, ry: bry },
            bottom_left: CornerRadius { rx: blx, ry: bly },
        }
    }

    /// Parse the four computed `border-*-radius` values
    pub fn from_css(
        top_left: &str,
        top_right: &str,
        bottom_right: &str,
        bottom_left: &str,
        width: f32,
        height: f32,
    ) -> Self {
        Self {
            top_left: parse_corner_radius(top_left, width, height),
            top_right: parse_corner_radius(top_right, width, height),
            bottom_right: parse_corner_radius(bottom_right, width, height),
            bottom_left: parse_corner_radius(bottom_left, width, height),
        }
    }
}

fn clamp_pair(a: f32, b: f32, limit: f32) -> (f32, f32) {
    let sum = a + b;
    if sum <= limit || sum == 0.0 {
        (a, b)
    } else {
        let k = limit / sum;
        (a * k, b * k)
    }
}

/// Parse one computed corner radius: `"12px"`, `"8px 16px"`, `"10%"`.
///
/// Percentages resolve against width (rx) and height (ry). Unparseable parts
/// read as zero.
pub fn parse_corner_radius(value: &str, width: f32, height: f32) -> CornerRadius {
    let mut parts = value.split_whitespace();
    let a = parts.next().unwrap_or("0px");
    let b = parts.next().unwrap_or(a);
    CornerRadius::new(css_length(a, width), css_length(b, height))
}

fn css_length(s: &str, base: f32) -> f32 {
    if let Some(pct) = s.strip_suffix('%') {
        return pct.trim().parse::<f32>().map(|p| p / 100.0 * base).unwrap_or(0.0);
    }
    let number = s.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    number.parse::<f32>().unwrap_or(0.0)
}

/// Dense outline: top edge, top-right arc, right edge, and so on clockwise
/// (screen space, y down). Radii are expected to be clamped already.
pub fn rounded_rect_outline(width: f32, height: f32, radii: &CornerRadii, arc_steps: usize) -> Vec<Vec2> {
    let CornerRadii {
        top_left: tl,
        top_right: tr,
        bottom_right: br,
        bottom_left: bl,
    } = *radii;
    let steps = arc_steps.max(MIN_ARC_STEPS);
    let mut pts = Vec::with_capacity(8 + 4 * (steps + 1));

    let arc = |pts: &mut Vec<Vec2>, center: Vec2, r: CornerRadius, a0: f32, a1: f32| {
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let a = a0 + (a1 - a0) * t;
            pts.push(center + Vec2::new(a.cos() * r.rx, a.sin() * r.ry));
        }
    };

    pts.push(Vec2::new(tl.rx, 0.0));
    pts.push(Vec2::new(width - tr.rx, 0.0));
    arc(&mut pts, Vec2::new(width - tr.rx, tr.ry), tr, -FRAC_PI_2, 0.0);

    pts.push(Vec2::new(width, tr.ry));
    pts.push(Vec2::new(width, height - br.ry));
    arc(&mut pts, Vec2::new(width - br.rx, height - br.ry), br, 0.0, FRAC_PI_2);

    pts.push(Vec2::new(width - br.rx, height));
    pts.push(Vec2::new(bl.rx, height));
    arc(&mut pts, Vec2::new(bl.rx, height - bl.ry), bl, FRAC_PI_2, PI);

    pts.push(Vec2::new(0.0, height - bl.ry));
    pts.push(Vec2::new(0.0, tl.ry));
    arc(&mut pts, Vec2::new(tl.rx, tl.ry), tl, PI, 1.5 * PI);

    pts
}

/// Resample a closed polyline to `n` points equally spaced by arc length
pub fn resample_closed(poly: &[Vec2], n: usize) -> Vec<Vec2> {
    if poly.is_empty() || n == 0 {
        return Vec::new();
    }

    // Cumulative length table, one entry per vertex plus the closing segment
    let mut cumulative = Vec::with_capacity(poly.len() + 1);
    cumulative.push(0.0f32);
    let mut total = 0.0f32;
    for i in 0..poly.len() {
        total += poly[i].distance(poly[(i + 1) % poly.len()]);
        cumulative.push(total);
    }

    let mut out = Vec::with_capacity(n);
    let mut j = 0;
    for i in 0..n {
        let t = total * i as f32 / n as f32;
        while j < cumulative.len() - 2 && cumulative[j + 1] < t {
            j += 1;
        }
        let a = poly[j % poly.len()];
        let b = poly[(j + 1) % poly.len()];
        let seg = (cumulative[j + 1] - cumulative[j]).max(MIN_SEGMENT);
        let u = ((t - cumulative[j]) / seg).clamp(0.0, 1.0);
        out.push(a.lerp(b, u));
    }
    out
}

/// Rest shape for a `width x height` box: clamp radii, trace, resample
pub fn sample_boundary(width: f32, height: f32, radii: &CornerRadii, n: usize) -> Vec<Vec2> {
    let width = width.max(1.0);
    let height = height.max(1.0);
    let radii = radii.clamped(width, height);
    let outline = rounded_rect_outline(width, height, &radii, ARC_STEPS);
    resample_closed(&outline, n)
}

/// Area of the ideal rounded rectangle (radii clamped first)
pub fn rounded_rect_area(width: f32, height: f32, radii: &CornerRadii) -> f32 {
    let r = radii.clamped(width, height);
    let cut = |c: CornerRadius| c.rx * c.ry * (1.0 - std::f32::consts::FRAC_PI_4);
    width * height - cut(r.top_left) - cut(r.top_right) - cut(r.bottom_right) - cut(r.bottom_left)
}
