//! Idle "breathing" drift
//!
//! Two phase-shifted sine waves travel around the ring; phases come from
//! [`super::state::idle_phases`] so runs are reproducible.

use glam::Vec2;
use std::f32::consts::TAU;

use crate::config::{IdleConfig, JellyConfig};

/// Drift scale for this frame, 0 when idle motion is off
pub fn idle_factor(config: &JellyConfig, pointer_inside: bool) -> f32 {
    if !config.effective_idle() {
        0.0
    } else if pointer_inside {
        config.idle.interact_mul
    } else {
        1.0
    }
}

/// Acceleration on node `index` of `count` at simulated time `time`
#[allow(clippy::too_many_arguments)]
pub fn idle_force(
    idle: &IdleConfig,
    index: usize,
    count: usize,
    phases: [f32; 2],
    time: f32,
    normal: Vec2,
    tangent: Vec2,
    factor: f32,
) -> Vec2 {
    if factor <= 0.0 || count == 0 {
        return Vec2::ZERO;
    }
    let amp = idle.strength * factor;
    let u = index as f32 / count as f32;
    let [phi1, phi2] = phases;
    let turb = idle.turbulence;

    let primary = (TAU * (u * idle.waves + time * idle.freq) + phi1).sin();
    let secondary = (TAU * (1.9 * u * idle.waves + 1.37 * time * idle.freq) + phi2).sin();
    let mut force = normal * (amp * (primary * (1.0 - turb) + secondary * turb));

    if idle.tangential > 0.0 {
        let sway = (TAU * (1.3 * u * idle.waves + 0.9 * time * idle.freq) + phi2).cos();
        force += tangent * (amp * idle.tangential * sway);
    }
    force
}
