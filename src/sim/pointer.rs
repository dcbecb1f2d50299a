//! Pointer interaction
//!
//! Event handlers update `PointerState`; once per frame `begin_frame` derives
//! the shared quantities (speed, penetration, boost) and `node_force` turns
//! them into a velocity change for one node.

use glam::Vec2;
use std::f32::consts::TAU;

use super::state::{BoundaryState, PointerState, SimContext};
use crate::config::{ClickConfig, JellyConfig};
use crate::consts::*;
use crate::{clamp_length, gaussian};

fn to_render(ctx: &SimContext, local: Vec2) -> Vec2 {
    ctx.layout.as_ref().map_or(local, |layout| layout.to_render(local))
}

/// Pointer entered the host: fresh state, full entry pulse
pub fn pointer_enter(ctx: &mut SimContext, local: Vec2) {
    let p = to_render(ctx, local);
    ctx.pointer = PointerState {
        inside: true,
        pos: p,
        prev: p,
        enter: 1.0,
        ..PointerState::default()
    };
}

pub fn pointer_leave(ctx: &mut SimContext) {
    let ptr = &mut ctx.pointer;
    ptr.inside = false;
    ptr.pressed = false;
    ptr.enter = 0.0;
}

pub fn pointer_move(ctx: &mut SimContext, local: Vec2) {
    let p = to_render(ctx, local);
    let ptr = &mut ctx.pointer;
    if !ptr.inside {
        // Missed the enter event; re-arm without a stale velocity spike
        ptr.enter = 1.0;
        ptr.prev = p;
        ptr.pos = p;
    }
    ptr.inside = true;

    let delta = p - ptr.pos;
    let dist = delta.length();
    ptr.move_dist = dist;
    ptr.pos = p;

    if dist > MIN_TRAVEL_STEP {
        ptr.dir = delta / dist;
        ptr.travel += dist;
    }
}

/// Press: one-shot click impulse at the press point
pub fn pointer_down(ctx: &mut SimContext, local: Vec2, click: &ClickConfig) {
    let p = to_render(ctx, local);
    let ptr = &mut ctx.pointer;
    ptr.pressed = true;
    if !ptr.inside {
        ptr.prev = p;
    }
    ptr.pos = p;
    apply_click_impulse(&mut ctx.boundary, p, click);
}

pub fn pointer_up(ctx: &mut SimContext) {
    ctx.pointer.pressed = false;
}

/// Velocity bias around `at`: push along the normal by `indent` plus a
/// shockwave away from the point by `wave`. Not scaled by dt.
pub fn apply_click_impulse(boundary: &mut BoundaryState, at: Vec2, click: &ClickConfig) {
    if boundary.is_empty() {
        return;
    }
    let sigma = (click.radius * CLICK_SIGMA_FACTOR).max(CLICK_SIGMA_MIN);
    let normals: Vec<Vec2> = (0..boundary.len()).map(|i| boundary.live_normal(i)).collect();

    for (node, normal) in boundary.nodes.iter_mut().zip(normals) {
        let d = node.pos - at;
        let w = gaussian(d.length_squared(), sigma).powf(CLICK_WEIGHT_POW);
        let from_click = d.normalize_or_zero();
        node.vel += normal * (click.indent * CLICK_INDENT_GAIN * w);
        node.vel += from_click * (click.wave * CLICK_WAVE_GAIN * w);
    }
}

/// Per-frame pointer quantities shared by every node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerFrame {
    pub active: bool,
    pub pos: Vec2,
    pub dir: Vec2,
    pub travel: f32,
    pub speed: f32,
    /// Speed normalized by the speed clamp
    pub speed_n: f32,
    /// Per-event travel normalized by 35% of the radius
    pub move_n: f32,
    /// Fast-move multiplier, >= 1
    pub boost: f32,
    /// Penetration depth normalized by the penetration scale
    pub pen_n: f32,
    /// Penetration growth since last frame, normalized
    pub dpen_n: f32,
    pub enter: f32,
    pub hover_radius: f32,
    /// Magnitude of the configured hover indent
    pub indent: f32,
    /// Added to the area-pressure error
    pub pressure_extra: f32,
    /// Cone and ring waves enabled
    pub waves: bool,
}

impl PointerFrame {
    pub fn idle() -> Self {
        Self {
            active: false,
            pos: Vec2::ZERO,
            dir: Vec2::X,
            travel: 0.0,
            speed: 0.0,
            speed_n: 0.0,
            move_n: 0.0,
            boost: 1.0,
            pen_n: 0.0,
            dpen_n: 0.0,
            enter: 0.0,
            hover_radius: HOVER_RADIUS_MIN,
            indent: 0.0,
            pressure_extra: 0.0,
            waves: false,
        }
    }
}

/// Advance pointer decay and measure velocity and penetration for this frame
pub fn begin_frame(ctx: &mut SimContext, config: &JellyConfig, dt: f32) -> PointerFrame {
    let t = &config.tuning;
    let SimContext {
        boundary,
        pointer: ptr,
        layout,
        ..
    } = ctx;

    ptr.vel = clamp_length((ptr.pos - ptr.prev) / dt, t.speed_max);
    ptr.enter *= (-t.enter_decay * dt).exp();
    ptr.move_dist *= (-MOVE_DECAY * dt).exp();

    let pen_scale = t.penetration_scale.max(1.0);
    let mut pen_n = 0.0;
    let mut dpen_n = 0.0;
    match boundary.nearest_base(ptr.pos).filter(|_| ptr.inside) {
        Some(i) => {
            let inward = -boundary.base_normal(i);
            let pen = (ptr.pos - boundary.nodes[i].base).dot(inward).max(0.0);
            pen_n = (pen / pen_scale).min(1.0);
            let dpen = (pen - ptr.prev_penetration).max(0.0);
            dpen_n = (dpen / (pen_scale * 0.55).max(1.0)).min(1.0);
            ptr.prev_penetration = pen;
            ptr.penetration = pen;
        }
        None => {
            ptr.prev_penetration = 0.0;
            ptr.penetration = 0.0;
        }
    }

    let hover_radius = layout
        .as_ref()
        .map_or(HOVER_RADIUS_MIN, |layout| layout.hover_radius);
    let speed = ptr.vel.length().min(t.speed_max);
    let speed_n = if t.speed_max > 0.0 { speed / t.speed_max } else { 0.0 };
    let move_n = (ptr.move_dist / (hover_radius * 0.35).max(1.0)).min(1.0);
    let boost = 1.0 + t.fast_boost * move_n;

    let pressure_extra = if ptr.inside {
        t.pressure_boost
            * pen_n.powf(t.pressure_boost_pow)
            * speed_n.powf(t.pressure_boost_speed_pow)
            * (0.35 + 0.65 * move_n)
            * boost
    } else {
        0.0
    };

    PointerFrame {
        active: ptr.inside,
        pos: ptr.pos,
        dir: ptr.dir,
        travel: ptr.travel,
        speed,
        speed_n,
        move_n,
        boost,
        pen_n,
        dpen_n,
        enter: ptr.enter,
        hover_radius,
        indent: config.hover_indent.abs(),
        pressure_extra,
        waves: config.effective_waves(),
    }
}

/// Velocity is measured frame to frame
pub fn end_frame(ptr: &mut PointerState) {
    ptr.prev = ptr.pos;
}

/// Velocity change for a node at `pos` with outward `normal`.
///
/// The entry impulse is a per-frame kick; every other term is scaled by `dt`.
pub fn node_force(frame: &PointerFrame, config: &JellyConfig, pos: Vec2, normal: Vec2, dt: f32) -> Vec2 {
    if !frame.active {
        return Vec2::ZERO;
    }
    let t = &config.tuning;
    let hr = frame.hover_radius;
    let hi = frame.indent;
    let inward = -normal;
    let d = pos - frame.pos;
    let d2 = d.length_squared();
    let waves = frame.waves && frame.speed > t.cone_speed_min;
    let mut dv = Vec2::ZERO;

    // Radial ring: reaches past the interaction radius
    if waves && t.ring_strength > 0.0 {
        let r = d2.sqrt();
        let wr = (-r / (hr * t.ring_length).max(1.0)).exp().powf(t.ring_weight_pow);
        let phase = (r - frame.travel * t.ring_phase_travel) / (hr * t.ring_phase_scale).max(1.0);
        let ripple = (phase * TAU * t.ring_freq).sin();
        let amp = t.ring_mul * hi * t.ring_strength;
        dv += normal * (ripple * amp * wr * dt * frame.boost);
    }

    if d2 >= hr * hr {
        return dv;
    }

    // Entry impact: speed, depth and depth growth all matter
    if frame.enter > ENTER_EPSILON {
        let we = gaussian(d2, hr * t.enter_sigma).powf(t.enter_weight_pow);
        let amp = t.enter_strength
            * (t.enter_base + t.enter_speed_gain * frame.speed_n)
            * frame.speed_n.powf(t.enter_speed_pow)
            * frame.pen_n.powf(t.enter_depth_pow)
            * (0.25 + 0.75 * frame.dpen_n)
            * (0.35 + 0.65 * frame.move_n);
        dv += inward * (t.enter_mul * hi * amp * we * frame.enter * frame.boost);
    }

    // Continuous indentation under the pointer
    let wi = gaussian(d2, hr * t.indent_sigma).powf(t.indent_weight_pow);
    let indent_amp = t.indent_mul * hi * (t.indent_base + t.indent_speed_gain * frame.speed_n);
    dv += inward * (indent_amp * wi * dt * frame.boost);

    // Cone wave ahead of travel, plus drag along it
    if waves {
        let along = d.dot(frame.dir);
        if along > 0.0 {
            let across = d - frame.dir * along;
            let width = hr * t.cone_width_base + along * t.cone_width_slope;
            let w_cone = gaussian(across.length_squared(), width)
                * (-along / (hr * t.cone_length).max(MIN_SIGMA)).exp();

            let phase = (along - frame.travel * t.cone_phase_travel) / (hr * t.cone_phase_scale).max(MIN_SIGMA);
            let ripple = (phase * TAU * t.cone_freq).sin();

            let amp_n = t.cone_mul * hi * (t.cone_normal_base + t.cone_normal_speed_gain * frame.speed_n);
            dv += normal * (ripple * amp_n * w_cone * dt * frame.boost);

            let amp_t = t.cone_mul * config.hover_drag * (t.cone_tang_base + t.cone_tang_speed_gain * frame.speed_n);
            dv += frame.dir * (amp_t * w_cone * dt * frame.boost);
        }
    }

    dv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::sampler::CornerRadii;

    fn context(w: u32, h: u32) -> (SimContext, JellyConfig) {
        let config = JellyConfig::default();
        let mut ctx = SimContext::new();
        ctx.rebuild(w, h, CornerRadii::default(), &config);
        (ctx, config)
    }

    #[test]
    fn test_enter_arms_pulse() {
        let (mut ctx, _) = context(200, 200);
        pointer_enter(&mut ctx, Vec2::new(10.0, 100.0));
        let bleed = ctx.layout.as_ref().unwrap().bleed;
        assert!(ctx.pointer.inside);
        assert_eq!(ctx.pointer.enter, 1.0);
        assert_eq!(ctx.pointer.pos, Vec2::new(10.0 + bleed, 100.0 + bleed));
        assert_eq!(ctx.pointer.prev, ctx.pointer.pos);
        assert_eq!(ctx.pointer.travel, 0.0);
    }

    #[test]
    fn test_move_tracks_travel_and_direction() {
        let (mut ctx, _) = context(200, 200);
        pointer_enter(&mut ctx, Vec2::new(10.0, 100.0));
        pointer_move(&mut ctx, Vec2::new(40.0, 100.0));
        assert!((ctx.pointer.travel - 30.0).abs() < 1e-4);
        assert!((ctx.pointer.dir - Vec2::X).length() < 1e-5);

        // Jitter below the step threshold keeps the direction
        pointer_move(&mut ctx, Vec2::new(40.0, 100.1));
        assert!((ctx.pointer.dir - Vec2::X).length() < 1e-5);
        assert!((ctx.pointer.travel - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_leave_and_reenter_via_move() {
        let (mut ctx, config) = context(200, 200);
        pointer_enter(&mut ctx, Vec2::new(10.0, 100.0));
        let frame = begin_frame(&mut ctx, &config, 0.016);
        assert!(frame.enter < 1.0);

        pointer_leave(&mut ctx);
        assert!(!ctx.pointer.inside);
        assert_eq!(ctx.pointer.enter, 0.0);

        pointer_move(&mut ctx, Vec2::new(150.0, 20.0));
        assert!(ctx.pointer.inside);
        assert_eq!(ctx.pointer.enter, 1.0);
        assert_eq!(ctx.pointer.prev, ctx.pointer.pos);
    }

    #[test]
    fn test_velocity_is_clamped_and_reset_each_frame() {
        let (mut ctx, config) = context(200, 200);
        pointer_enter(&mut ctx, Vec2::new(100.0, 100.0));
        pointer_move(&mut ctx, Vec2::new(110.0, 100.0));
        let frame = begin_frame(&mut ctx, &config, 0.01);
        assert!((ctx.pointer.vel.x - 1000.0).abs() < 0.5);
        assert!((frame.speed_n - 1000.0 / config.tuning.speed_max).abs() < 1e-3);
        end_frame(&mut ctx.pointer);

        let frame = begin_frame(&mut ctx, &config, 0.01);
        assert_eq!(frame.speed, 0.0);

        pointer_move(&mut ctx, Vec2::new(190.0, 100.0));
        let frame = begin_frame(&mut ctx, &config, 0.01);
        assert!((frame.speed - config.tuning.speed_max).abs() < 1e-2);
    }

    #[test]
    fn test_penetration_depth() {
        let (mut ctx, config) = context(200, 200);
        // 20px below the top edge, away from corners
        pointer_enter(&mut ctx, Vec2::new(100.0, 20.0));
        let frame = begin_frame(&mut ctx, &config, 0.016);
        assert!((ctx.pointer.penetration - 20.0).abs() < 1.0);
        assert!((frame.pen_n - 20.0 / 42.0).abs() < 0.03);
        assert!(frame.dpen_n > 0.0);

        // Same depth next frame: no growth
        let frame = begin_frame(&mut ctx, &config, 0.016);
        assert_eq!(frame.dpen_n, 0.0);

        pointer_leave(&mut ctx);
        let frame = begin_frame(&mut ctx, &config, 0.016);
        assert_eq!(ctx.pointer.penetration, 0.0);
        assert!(!frame.active);
    }

    #[test]
    fn test_indent_pushes_inward_under_pointer() {
        let (mut ctx, config) = context(200, 200);
        pointer_enter(&mut ctx, Vec2::new(100.0, 5.0));
        let frame = begin_frame(&mut ctx, &config, 0.016);

        let i = ctx.boundary.nearest_base(ctx.pointer.pos).unwrap();
        let node = ctx.boundary.nodes[i];
        let normal = ctx.boundary.live_normal(i);
        let dv = node_force(&frame, &config, node.pos, normal, 0.016);
        assert!(dv.dot(normal) < 0.0);

        // Far corner, stationary pointer: no waves reach it
        let dv = node_force(&frame, &config, ctx.boundary.nodes[22].pos, normal, 0.016);
        assert_eq!(dv, Vec2::ZERO);
    }

    #[test]
    fn test_inactive_frame_is_inert() {
        let config = JellyConfig::default();
        let dv = node_force(&PointerFrame::idle(), &config, Vec2::ZERO, Vec2::Y, 0.016);
        assert_eq!(dv, Vec2::ZERO);
    }

    #[test]
    fn test_cone_drags_along_travel() {
        let mut config = JellyConfig::default();
        config.tuning.ring_strength = 0.0;
        let frame = PointerFrame {
            active: true,
            pos: Vec2::new(100.0, 5.0),
            dir: Vec2::X,
            travel: 0.0,
            speed: 800.0,
            speed_n: 800.0 / 4200.0,
            hover_radius: 60.0,
            indent: 1.25,
            waves: true,
            ..PointerFrame::idle()
        };
        // Node ahead on the top edge (normal points up, -y)
        let dv = node_force(&frame, &config, Vec2::new(120.0, 0.0), Vec2::NEG_Y, 0.016);
        assert!(dv.x > 0.0);

        // Behind the pointer only indentation acts, along the normal
        let dv = node_force(&frame, &config, Vec2::new(80.0, 0.0), Vec2::NEG_Y, 0.016);
        assert!(dv.x.abs() < 1e-6);
        assert!(dv.y > 0.0);

        config.reduced_motion = true;
        let calm = PointerFrame {
            waves: config.effective_waves(),
            ..frame
        };
        let dv = node_force(&calm, &config, Vec2::new(120.0, 0.0), Vec2::NEG_Y, 0.016);
        assert!(dv.x.abs() < 1e-6);
    }

    #[test]
    fn test_pressure_boost_only_when_configured() {
        let (mut ctx, mut config) = context(200, 200);
        pointer_enter(&mut ctx, Vec2::new(100.0, 10.0));
        pointer_move(&mut ctx, Vec2::new(100.0, 40.0));
        let frame = begin_frame(&mut ctx, &config, 0.016);
        assert_eq!(frame.pressure_extra, 0.0);

        config.tuning.pressure_boost = 0.5;
        pointer_move(&mut ctx, Vec2::new(100.0, 70.0));
        let frame = begin_frame(&mut ctx, &config, 0.016);
        assert!(frame.pressure_extra > 0.0);
    }

    #[test]
    fn test_click_impulse_direction() {
        let (mut ctx, _) = context(200, 200);
        let outward = ClickConfig {
            radius: 140.0,
            indent: 1.0,
            wave: 0.0,
        };
        pointer_down(&mut ctx, Vec2::new(100.0, 100.0), &outward);
        assert!(ctx.pointer.pressed);
        for i in 0..ctx.boundary.len() {
            assert!(ctx.boundary.nodes[i].vel.dot(ctx.boundary.radial_axis(i)) > 0.0);
        }
        pointer_up(&mut ctx);
        assert!(!ctx.pointer.pressed);
    }

    #[test]
    fn test_click_on_empty_boundary_is_noop() {
        let mut ctx = SimContext::new();
        pointer_down(&mut ctx, Vec2::ZERO, &ClickConfig::default());
        assert!(ctx.boundary.is_empty());
    }
}
