//! Jelly Membrane - a container outline that behaves like a pressurized
//! elastic membrane.
//!
//! Core modules:
//! - `sim`: Boundary sampling, mass-spring integration, pointer and idle forces
//! - `renderer`: Closed Catmull-Rom curve and render sinks
//! - `frame`: Per-tick scheduling and rebuild-on-resize
//! - `config`: Tunable parameters (serde)
//! - `platform`: Browser host (wasm32 only)

pub mod config;
pub mod error;
pub mod frame;
pub mod platform;
pub mod renderer;
pub mod sim;

pub use config::{JellyConfig, MotionPreset};
pub use error::JellyError;
pub use frame::{FrameClock, Jelly};

use glam::Vec2;

/// Engine constants
pub mod consts {
    /// Frame step clamp (seconds)
    pub const MIN_DT: f32 = 0.008;
    pub const MAX_DT: f32 = 0.033;

    /// Node count range accepted from configuration
    pub const MIN_NODES: usize = 24;
    pub const MAX_NODES: usize = 80;

    /// Polyline steps per quarter-ellipse corner before resampling
    pub const ARC_STEPS: usize = 28;
    pub const MIN_ARC_STEPS: usize = 6;

    /// Floor for cumulative-length table segments
    pub const MIN_SEGMENT: f32 = 1e-6;
    /// Floor for edge-spring distances
    pub const MIN_EDGE: f32 = 1e-4;
    /// Floor for Gaussian widths (pixels)
    pub const MIN_SIGMA: f32 = 1.0;

    /// Radial clamp relative to max offset
    pub const MAX_OUT_FACTOR: f32 = 1.35;
    pub const MAX_IN_FACTOR: f32 = 0.85;
    /// Default max offset relative to the shorter side
    pub const MAX_OFFSET_FACTOR: f32 = 0.10;

    /// Bleed (render margin) bounds, pixels
    pub const BLEED_MIN: f32 = 14.0;
    pub const BLEED_MAX: f32 = 140.0;

    /// Interaction radius bounds
    pub const HOVER_RADIUS_MIN: f32 = 28.0;
    pub const HOVER_RADIUS_FACTOR: f32 = 0.22;
    pub const HOVER_RADIUS_MAX_FACTOR: f32 = 0.45;

    /// Click impulse shaping
    pub const CLICK_INDENT_GAIN: f32 = 2600.0;
    pub const CLICK_WAVE_GAIN: f32 = 2200.0;
    pub const CLICK_SIGMA_MIN: f32 = 24.0;
    pub const CLICK_SIGMA_FACTOR: f32 = 0.65;
    pub const CLICK_WEIGHT_POW: f32 = 1.2;

    /// Per-event travel distance decay (1/s)
    pub const MOVE_DECAY: f32 = 14.0;
    /// Moves shorter than this don't change travel direction
    pub const MIN_TRAVEL_STEP: f32 = 0.2;
    /// Entry pulse below this is treated as spent
    pub const ENTER_EPSILON: f32 = 0.001;
}

/// Gaussian weight `exp(-d²/2σ²)` with σ floored at [`consts::MIN_SIGMA`]
#[inline]
pub fn gaussian(dist_sq: f32, sigma: f32) -> f32 {
    let sigma = sigma.max(consts::MIN_SIGMA);
    (-dist_sq / (2.0 * sigma * sigma)).exp()
}

/// Counter-clockwise perpendicular
#[inline]
pub fn perp(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Scale `v` down so its length never exceeds `max`
#[inline]
pub fn clamp_length(v: Vec2, max: f32) -> Vec2 {
    let len = v.length();
    if len <= max || len == 0.0 {
        v
    } else {
        v * (max / len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_peak_and_falloff() {
        assert!((gaussian(0.0, 10.0) - 1.0).abs() < 1e-6);
        assert!(gaussian(100.0, 10.0) < 1.0);
        assert!(gaussian(10_000.0, 10.0) < 1e-6);
    }

    #[test]
    fn test_gaussian_sigma_floor() {
        // Zero sigma must not divide by zero
        let w = gaussian(0.25, 0.0);
        assert!(w.is_finite());
        assert!((w - gaussian(0.25, consts::MIN_SIGMA)).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_length() {
        let v = clamp_length(Vec2::new(30.0, 40.0), 10.0);
        assert!((v.length() - 10.0).abs() < 1e-4);
        assert_eq!(clamp_length(Vec2::new(1.0, 0.0), 10.0), Vec2::new(1.0, 0.0));
        assert_eq!(clamp_length(Vec2::ZERO, 0.0), Vec2::ZERO);
    }
}
