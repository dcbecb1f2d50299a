//! Per-frame boundary update
//!
//! Forces are accumulated from a snapshot of the ring, then integrated
//! (semi-implicit Euler), clamped and smoothed.

use glam::Vec2;
use serde::Serialize;

use super::geometry::{neighbours, outward_normal, polygon_area};
use super::state::{Node, SimContext};
use super::{idle, pointer};
use crate::config::JellyConfig;
use crate::consts::*;

/// What one step did, for logging and reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StepStats {
    /// Clamped step actually taken
    pub dt: f32,
    /// Relative area deficit after the step
    pub area_error: f32,
    /// Clamped area + boost error that drove pressure this step
    pub pressure_error: f32,
    /// Largest outward radial offset
    pub max_out: f32,
    /// Largest inward radial offset (<= 0)
    pub max_in: f32,
}

/// Advance the boundary by one frame.
///
/// Returns `None` (and changes nothing) until the first rebuild has produced
/// a ring.
pub fn step(ctx: &mut SimContext, config: &JellyConfig, dt: f32) -> Option<StepStats> {
    if ctx.boundary.is_empty() {
        return None;
    }
    let limits = ctx.layout.as_ref()?.offset_limits();
    let dt = dt.clamp(MIN_DT, MAX_DT);

    let pf = pointer::begin_frame(ctx, config, dt);
    let idle_factor = idle::idle_factor(config, ctx.pointer.inside);
    let time = ctx.time;

    let boundary = &mut ctx.boundary;
    let n = boundary.len();
    let positions = boundary.positions();
    let offsets: Vec<Vec2> = boundary.nodes.iter().map(Node::offset).collect();
    let axes: Vec<Vec2> = (0..n).map(|i| boundary.radial_axis(i)).collect();
    let mut vel: Vec<Vec2> = boundary.nodes.iter().map(|node| node.vel).collect();

    // Edge springs
    for i in 0..n {
        let j = (i + 1) % n;
        let d = positions[j] - positions[i];
        let len = d.length().max(MIN_EDGE);
        let f = d * (config.edge_k * (len - boundary.rest[i]) / len);
        vel[i] += f * dt;
        vel[j] -= f * dt;
    }

    let area = polygon_area(&positions).max(1.0);
    let area_error = (boundary.base_area - area) / boundary.base_area;
    let pressure_error =
        (area_error + pf.pressure_extra).clamp(-config.pressure_limit, config.pressure_limit);

    for i in 0..n {
        let (prev, next) = neighbours(i, n);
        let base = boundary.nodes[i].base;
        let normal = outward_normal(positions[prev], positions[next], base, boundary.base_center);
        let mut dv = (base - positions[i]) * (config.shape_k * dt);

        // Bending on the offset field keeps the rest shape an equilibrium
        let lap = (offsets[prev] + offsets[next]) * 0.5 - offsets[i];
        dv += lap * (config.bend_k * dt);

        dv += normal * (config.pressure_k * pressure_error * dt);

        if idle_factor > 0.0 {
            let tangent = (positions[next] - positions[prev]).normalize_or_zero();
            dv += idle::idle_force(
                &config.idle,
                i,
                n,
                boundary.idle_phases[i],
                time,
                normal,
                tangent,
                idle_factor,
            ) * dt;
        }

        dv += pointer::node_force(&pf, config, positions[i], normal, dt);
        vel[i] += dv;
    }

    let damp = (-config.damping * dt).exp();
    for ((node, v), axis) in boundary.nodes.iter_mut().zip(vel).zip(&axes) {
        node.vel = v * damp;
        let moved = node.pos + node.vel * dt - node.base;
        node.pos = node.base + limits.clamp(moved, *axis);
    }

    if config.smooth_k > 0.0 {
        for _ in 0..config.smooth_iters {
            let offsets: Vec<Vec2> = boundary.nodes.iter().map(Node::offset).collect();
            for (i, node) in boundary.nodes.iter_mut().enumerate() {
                let (prev, next) = neighbours(i, n);
                let mean = (offsets[prev] + offsets[i] + offsets[next]) / 3.0;
                let smoothed = offsets[i] + (mean - offsets[i]) * config.smooth_k;
                node.pos = node.base + limits.clamp(smoothed, axes[i]);
            }
        }
    }

    pointer::end_frame(&mut ctx.pointer);
    ctx.time += dt;
    ctx.frame += 1;

    let (max_out, max_in) = ctx.boundary.radial_extremes();
    Some(StepStats {
        dt,
        area_error: ctx.boundary.area_error(),
        pressure_error,
        max_out,
        max_in,
    })
}
