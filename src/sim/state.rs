//! Simulation state
//!
//! `SimContext` is the single mutable object shared by pointer handlers and
//! the frame step. Nothing here survives a reload.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;
use std::f32::consts::TAU;

use super::geometry::{OffsetLimits, centroid, neighbours, outward_normal, polygon_area};
use super::sampler::{CornerRadii, sample_boundary};
use crate::config::JellyConfig;
use crate::consts::*;

/// A point mass on the boundary ring
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Node {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Rest position on the undeformed outline
    pub base: Vec2,
}

impl Node {
    pub fn at_rest(base: Vec2) -> Self {
        Self {
            pos: base,
            vel: Vec2::ZERO,
            base,
        }
    }

    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.pos - self.base
    }
}

/// Mixes the node index into the phase seed
const IDLE_PHASE_SEED: u64 = 0x6a65_6c6c_7900_0000;

/// Two idle phases for node `index`, a pure function of the index
pub fn idle_phases(index: usize) -> [f32; 2] {
    let mut rng = Pcg32::seed_from_u64(IDLE_PHASE_SEED ^ index as u64);
    [rng.random::<f32>() * TAU, rng.random::<f32>() * TAU]
}

/// Node ring plus everything derived from its rest shape.
///
/// Always built whole by [`BoundaryState::from_base`] so the per-node vectors
/// share one length.
#[derive(Debug, Clone, Default)]
pub struct BoundaryState {
    pub nodes: Vec<Node>,
    /// Rest length of edge `i -> i + 1`
    pub rest: Vec<f32>,
    pub base_area: f32,
    pub base_center: Vec2,
    pub idle_phases: Vec<[f32; 2]>,
}

impl BoundaryState {
    pub fn from_base(base: Vec<Vec2>) -> Self {
        let n = base.len();
        let rest = (0..n).map(|i| base[i].distance(base[(i + 1) % n])).collect();
        let base_area = polygon_area(&base).max(1.0);
        let base_center = centroid(&base);
        let idle_phases = (0..n).map(idle_phases).collect();
        let nodes = base.into_iter().map(Node::at_rest).collect();
        Self {
            nodes,
            rest,
            base_area,
            base_center,
            idle_phases,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn positions(&self) -> Vec<Vec2> {
        self.nodes.iter().map(|n| n.pos).collect()
    }

    pub fn area(&self) -> f32 {
        polygon_area(&self.positions())
    }

    /// Relative area deficit: positive when compressed
    pub fn area_error(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        (self.base_area - self.area().max(1.0)) / self.base_area
    }

    /// Unit direction from the base centroid through node `i`'s base
    pub fn radial_axis(&self, i: usize) -> Vec2 {
        (self.nodes[i].base - self.base_center).normalize_or_zero()
    }

    /// Outward normal of the rest outline at node `i`
    pub fn base_normal(&self, i: usize) -> Vec2 {
        let (prev, next) = neighbours(i, self.len());
        outward_normal(
            self.nodes[prev].base,
            self.nodes[next].base,
            self.nodes[i].base,
            self.base_center,
        )
    }

    /// Outward normal of the live ring at node `i`
    pub fn live_normal(&self, i: usize) -> Vec2 {
        let (prev, next) = neighbours(i, self.len());
        outward_normal(
            self.nodes[prev].pos,
            self.nodes[next].pos,
            self.nodes[i].base,
            self.base_center,
        )
    }

    /// Index of the node whose base is nearest to `p`
    pub fn nearest_base(&self, p: Vec2) -> Option<usize> {
        self.nodes
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.base
                    .distance_squared(p)
                    .partial_cmp(&b.base.distance_squared(p))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
    }

    /// Largest radial offset outward (positive) and inward (negative)
    pub fn radial_extremes(&self) -> (f32, f32) {
        (0..self.len()).fold((0.0f32, 0.0f32), |(hi, lo), i| {
            let r = self.nodes[i].offset().dot(self.radial_axis(i));
            (hi.max(r), lo.min(r))
        })
    }
}

/// Measured host box and the values derived from it
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub radii: CornerRadii,
    /// Render margin around the host box
    pub bleed: f32,
    pub max_offset: f32,
    /// Pointer interaction radius
    pub hover_radius: f32,
}

impl Layout {
    pub fn new(width: u32, height: u32, radii: CornerRadii, config: &JellyConfig) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let min_side = width.min(height) as f32;

        let max_offset = config.max_offset.unwrap_or(min_side * MAX_OFFSET_FACTOR);
        let bleed = config
            .bleed
            .unwrap_or(max_offset * 1.7 + 18.0)
            .round()
            .clamp(BLEED_MIN, BLEED_MAX);
        let hover_radius = config
            .hover_radius
            .unwrap_or(min_side * HOVER_RADIUS_FACTOR)
            .min(min_side * HOVER_RADIUS_MAX_FACTOR)
            .max(HOVER_RADIUS_MIN);

        Self {
            width,
            height,
            radii,
            bleed,
            max_offset,
            hover_radius,
        }
    }

    pub fn min_side(&self) -> f32 {
        self.width.min(self.height) as f32
    }

    /// Size of the bleed-expanded box the path is drawn in
    pub fn render_size(&self) -> Vec2 {
        Vec2::new(
            self.width as f32 + self.bleed * 2.0,
            self.height as f32 + self.bleed * 2.0,
        )
    }

    /// Host-local coordinates to render-box coordinates
    #[inline]
    pub fn to_render(&self, local: Vec2) -> Vec2 {
        local + Vec2::splat(self.bleed)
    }

    pub fn offset_limits(&self) -> OffsetLimits {
        OffsetLimits::from_max_offset(self.max_offset)
    }
}

/// Pointer tracking, in render-box coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct PointerState {
    pub inside: bool,
    pub pressed: bool,
    pub pos: Vec2,
    pub prev: Vec2,
    pub vel: Vec2,
    /// Unit direction of recent travel
    pub dir: Vec2,
    /// Cumulative travel distance since entering
    pub travel: f32,
    /// Entry pulse, 1 on enter and decaying
    pub enter: f32,
    pub penetration: f32,
    pub prev_penetration: f32,
    /// Last per-event move distance (decays per frame)
    pub move_dist: f32,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            inside: false,
            pressed: false,
            pos: Vec2::ZERO,
            prev: Vec2::ZERO,
            vel: Vec2::ZERO,
            dir: Vec2::X,
            travel: 0.0,
            enter: 0.0,
            penetration: 0.0,
            prev_penetration: 0.0,
            move_dist: 0.0,
        }
    }
}

/// Everything the event handlers and the frame step mutate
#[derive(Debug, Clone, Default)]
pub struct SimContext {
    pub boundary: BoundaryState,
    pub pointer: PointerState,
    pub layout: Option<Layout>,
    /// Simulated seconds since mount (sum of clamped steps)
    pub time: f32,
    pub frame: u64,
}

impl SimContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a `width x height` measurement differs from the current layout
    pub fn size_changed(&self, width: u32, height: u32) -> bool {
        match &self.layout {
            Some(layout) => layout.width != width.max(1) || layout.height != height.max(1),
            None => true,
        }
    }

    /// Resample the rest shape and reset all node dynamics.
    ///
    /// The boundary is swapped as one value. Pointer state is kept, moved
    /// with the render box when the bleed changes.
    pub fn rebuild(&mut self, width: u32, height: u32, radii: CornerRadii, config: &JellyConfig) {
        let layout = Layout::new(width, height, radii, config);
        if let Some(old) = &self.layout {
            let shift = Vec2::splat(layout.bleed - old.bleed);
            self.pointer.pos += shift;
            self.pointer.prev += shift;
        }
        let offset = Vec2::splat(layout.bleed);
        let base: Vec<Vec2> = sample_boundary(
            layout.width as f32,
            layout.height as f32,
            &layout.radii,
            config.effective_node_count(),
        )
        .into_iter()
        .map(|p| p + offset)
        .collect();

        log::debug!(
            "Rebuild {}x{}: {} nodes, bleed {}, max offset {:.1}",
            layout.width,
            layout.height,
            base.len(),
            layout.bleed,
            layout.max_offset
        );

        self.boundary = BoundaryState::from_base(base);
        self.layout = Some(layout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_phases_deterministic() {
        assert_eq!(idle_phases(7), idle_phases(7));
        assert_ne!(idle_phases(7), idle_phases(8));
        let [a, b] = idle_phases(3);
        assert!((0.0..TAU).contains(&a));
        assert!((0.0..TAU).contains(&b));
    }

    #[test]
    fn test_layout_derived_values() {
        let config = JellyConfig::default();
        let layout = Layout::new(200, 100, CornerRadii::default(), &config);
        assert!((layout.max_offset - 10.0).abs() < 1e-5);
        // round(10 * 1.7 + 18) = 35
        assert_eq!(layout.bleed, 35.0);
        assert!((layout.hover_radius - 28.0).abs() < 1e-5);
        assert_eq!(layout.render_size(), Vec2::new(270.0, 170.0));

        let big = Layout::new(1000, 800, CornerRadii::default(), &config);
        assert_eq!(big.bleed, BLEED_MAX);
        assert!((big.hover_radius - 176.0).abs() < 1e-3);
    }

    #[test]
    fn test_rebuild_resets_dynamics() {
        let config = JellyConfig::default();
        let mut ctx = SimContext::new();
        ctx.rebuild(200, 200, CornerRadii::default(), &config);
        assert_eq!(ctx.boundary.len(), 44);
        assert_eq!(ctx.boundary.rest.len(), 44);
        assert_eq!(ctx.boundary.idle_phases.len(), 44);
        assert!(ctx.boundary.nodes.iter().all(|n| n.pos == n.base && n.vel == Vec2::ZERO));

        ctx.boundary.nodes[3].pos += Vec2::new(5.0, 5.0);
        ctx.boundary.nodes[3].vel = Vec2::new(100.0, 0.0);
        ctx.rebuild(200, 200, CornerRadii::default(), &config);
        assert_eq!(ctx.boundary.nodes[3].pos, ctx.boundary.nodes[3].base);
        assert_eq!(ctx.boundary.nodes[3].vel, Vec2::ZERO);
    }

    #[test]
    fn test_rebuild_idempotent() {
        let config = JellyConfig::default();
        let radii = CornerRadii::uniform(20.0);
        let mut a = SimContext::new();
        let mut b = SimContext::new();
        a.rebuild(240, 160, radii, &config);
        b.rebuild(240, 160, radii, &config);
        a.rebuild(240, 160, radii, &config);

        let bases_a: Vec<_> = a.boundary.nodes.iter().map(|n| n.base).collect();
        let bases_b: Vec<_> = b.boundary.nodes.iter().map(|n| n.base).collect();
        assert_eq!(bases_a, bases_b);
        assert_eq!(a.boundary.rest, b.boundary.rest);
        assert_eq!(a.boundary.base_area.to_bits(), b.boundary.base_area.to_bits());
    }

    #[test]
    fn test_rebuild_follows_bleed_change() {
        let config = JellyConfig::default();
        let mut ctx = SimContext::new();
        ctx.rebuild(100, 100, CornerRadii::default(), &config);
        crate::sim::pointer_enter(&mut ctx, Vec2::new(20.0, 30.0));
        let old_bleed = ctx.layout.as_ref().unwrap().bleed;

        ctx.rebuild(400, 400, CornerRadii::default(), &config);
        let new_bleed = ctx.layout.as_ref().unwrap().bleed;
        assert!(new_bleed > old_bleed);
        assert_eq!(ctx.pointer.pos, Vec2::new(20.0, 30.0) + Vec2::splat(new_bleed));
        assert_eq!(ctx.pointer.prev, ctx.pointer.pos);

        // Same host-local spot: no phantom jump
        crate::sim::pointer_move(&mut ctx, Vec2::new(20.0, 30.0));
        assert_eq!(ctx.pointer.pos, ctx.pointer.prev);
        assert!(ctx.pointer.move_dist < 1e-4);
    }

    #[test]
    fn test_size_changed() {
        let config = JellyConfig::default();
        let mut ctx = SimContext::new();
        assert!(ctx.size_changed(100, 100));
        ctx.rebuild(100, 100, CornerRadii::default(), &config);
        assert!(!ctx.size_changed(100, 100));
        assert!(ctx.size_changed(200, 100));
        // Zero sizes are floored to 1
        ctx.rebuild(0, 0, CornerRadii::default(), &config);
        assert!(!ctx.size_changed(1, 1));
    }

    #[test]
    fn test_base_normals_point_outward() {
        let config = JellyConfig::default();
        let mut ctx = SimContext::new();
        ctx.rebuild(300, 120, CornerRadii::uniform(16.0), &config);
        let b = &ctx.boundary;
        for i in 0..b.len() {
            assert!(b.base_normal(i).dot(b.radial_axis(i)) > 0.0, "node {i}");
        }
        assert_eq!(b.area_error(), 0.0);
    }
}
