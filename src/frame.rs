//! Frame scheduling
//!
//! `Jelly` owns one membrane instance: configuration, simulation context and
//! the frame clock. Hosts feed it measurements, pointer events and animation
//! timestamps; each tick runs exactly one step and one render.

use glam::Vec2;

use crate::config::JellyConfig;
use crate::consts::{MAX_DT, MIN_DT};
use crate::renderer::{RenderSink, catmull_rom_closed};
use crate::sim::{self, CornerRadii, Layout, SimContext, StepStats};

/// Wall-clock to simulation step conversion
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous tick, clamped to the step range.
    /// The first tick has no history and takes the minimum step.
    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let raw = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        if raw.is_finite() {
            raw.clamp(MIN_DT, MAX_DT)
        } else {
            MIN_DT
        }
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Round a measured content-box size to whole pixels, at least 1
pub fn content_size(width: f32, height: f32) -> (u32, u32) {
    let px = |v: f32| if v.is_finite() { v.round().max(1.0) as u32 } else { 1 };
    (px(width), px(height))
}

/// One membrane instance
#[derive(Debug, Clone)]
pub struct Jelly {
    config: JellyConfig,
    ctx: SimContext,
    clock: FrameClock,
    clip_supported: bool,
    path: String,
}

impl Jelly {
    pub fn new(config: JellyConfig, clip_supported: bool) -> Self {
        if !clip_supported {
            log::warn!("Path clipping unsupported, drawing outline only");
        }
        Self {
            config,
            ctx: SimContext::new(),
            clock: FrameClock::new(),
            clip_supported,
            path: String::new(),
        }
    }

    pub fn config(&self) -> &JellyConfig {
        &self.config
    }

    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.ctx.layout.as_ref()
    }

    pub fn clip_supported(&self) -> bool {
        self.clip_supported
    }

    /// Path data of the last rebuild or step
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Size of the bleed-expanded render box, once measured
    pub fn render_size(&self) -> Option<Vec2> {
        self.layout().map(Layout::render_size)
    }

    /// Margin between the host box and the render box
    pub fn bleed(&self) -> f32 {
        self.layout().map_or(0.0, |layout| layout.bleed)
    }

    /// Whether a rounded `width x height` measurement calls for a rebuild
    pub fn needs_rebuild(&self, width: u32, height: u32) -> bool {
        self.ctx.size_changed(width, height)
    }

    /// Full reset to the rest shape of a `width x height` box
    pub fn rebuild(&mut self, width: u32, height: u32, radii: CornerRadii) {
        self.ctx.rebuild(width, height, radii, &self.config);
        self.update_path();
    }

    /// Feed a content-box measurement; rebuilds only when the rounded size
    /// changed. Returns whether it rebuilt.
    pub fn resize(&mut self, width: f32, height: f32, radii: CornerRadii) -> bool {
        let (w, h) = content_size(width, height);
        if !self.needs_rebuild(w, h) {
            return false;
        }
        self.rebuild(w, h, radii);
        true
    }

    /// Swap the configuration; a measured instance is rebuilt with it
    pub fn set_config(&mut self, config: JellyConfig) {
        self.config = config;
        if let Some(layout) = self.ctx.layout.clone() {
            self.rebuild(layout.width, layout.height, layout.radii);
        }
    }

    pub fn pointer_enter(&mut self, x: f32, y: f32) {
        sim::pointer_enter(&mut self.ctx, Vec2::new(x, y));
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        sim::pointer_move(&mut self.ctx, Vec2::new(x, y));
    }

    pub fn pointer_leave(&mut self) {
        sim::pointer_leave(&mut self.ctx);
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        sim::pointer_down(&mut self.ctx, Vec2::new(x, y), &self.config.click);
    }

    pub fn pointer_up(&mut self) {
        sim::pointer_up(&mut self.ctx);
    }

    /// Animation tick at `now_ms`: one step, then one render.
    ///
    /// Before the first rebuild nothing happens and the clock is left alone.
    pub fn frame(&mut self, now_ms: f64, sink: &mut impl RenderSink) -> Option<StepStats> {
        if self.ctx.boundary.is_empty() {
            return None;
        }
        let dt = self.clock.delta(now_ms);
        let stats = self.advance(dt)?;
        self.render(sink);
        Some(stats)
    }

    /// Step by `dt` seconds (clamped) without touching the clock
    pub fn advance(&mut self, dt: f32) -> Option<StepStats> {
        let stats = sim::step(&mut self.ctx, &self.config, dt)?;
        self.update_path();
        Some(stats)
    }

    /// Push the current path to `sink`
    pub fn render(&self, sink: &mut impl RenderSink) {
        if self.path.is_empty() {
            return;
        }
        if self.clip_supported {
            sink.set_clip_path(&self.path);
        }
        if self.config.outline.enabled {
            sink.set_outline_path(&self.path);
        }
    }

    fn update_path(&mut self) {
        let points = self.ctx.boundary.positions();
        self.path = catmull_rom_closed(&points, self.config.path_tension).to_svg_path();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::PathRecorder;

    #[test]
    fn test_clock_clamps() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.delta(1000.0), MIN_DT);
        assert!((clock.delta(1016.0) - 0.016).abs() < 1e-6);
        assert_eq!(clock.delta(1516.0), MAX_DT);
        assert_eq!(clock.delta(1400.0), MIN_DT);
        clock.reset();
        assert_eq!(clock.delta(9000.0), MIN_DT);
    }

    #[test]
    fn test_content_size() {
        assert_eq!(content_size(100.4, 99.6), (100, 100));
        assert_eq!(content_size(0.2, -5.0), (1, 1));
        assert_eq!(content_size(f32::NAN, 10.0), (1, 10));
    }

    #[test]
    fn test_frame_before_measure_is_noop() {
        let mut jelly = Jelly::new(JellyConfig::default(), true);
        let mut sink = PathRecorder::default();
        assert!(jelly.frame(0.0, &mut sink).is_none());
        assert!(sink.clip.is_none() && sink.outline.is_none());
        assert_eq!(jelly.path(), "");
        assert_eq!(jelly.bleed(), 0.0);
    }

    #[test]
    fn test_resize_rebuilds_on_change_only() {
        let mut jelly = Jelly::new(JellyConfig::default(), true);
        assert!(jelly.resize(160.0, 90.0, CornerRadii::uniform(12.0)));
        assert!(!jelly.resize(160.3, 89.8, CornerRadii::uniform(12.0)));
        assert!(jelly.resize(161.0, 90.0, CornerRadii::uniform(12.0)));
        assert!(jelly.path().starts_with("M "));
        assert!(jelly.path().ends_with(" Z"));
        assert_eq!(jelly.path().matches(" C ").count(), 44);
    }

    #[test]
    fn test_render_targets() {
        let mut jelly = Jelly::new(JellyConfig::default(), true);
        jelly.resize(120.0, 80.0, CornerRadii::default());
        let mut sink = PathRecorder::default();
        jelly.frame(16.0, &mut sink).unwrap();
        assert_eq!(sink.clip.as_deref(), Some(jelly.path()));
        assert_eq!(sink.outline.as_deref(), Some(jelly.path()));

        let mut config = JellyConfig::default();
        config.outline.enabled = false;
        let mut bare = Jelly::new(config, false);
        bare.resize(120.0, 80.0, CornerRadii::default());
        let mut sink = PathRecorder::default();
        bare.frame(16.0, &mut sink).unwrap();
        assert!(sink.clip.is_none());
        assert!(sink.outline.is_none());
    }

    #[test]
    fn test_one_step_per_frame() {
        let mut jelly = Jelly::new(JellyConfig::default(), true);
        jelly.resize(120.0, 80.0, CornerRadii::default());
        let mut sink = PathRecorder::default();
        for k in 0..10 {
            jelly.frame(k as f64 * 16.0, &mut sink);
        }
        assert_eq!(jelly.context().frame, 10);
    }

    #[test]
    fn test_resize_during_interaction() {
        let mut jelly = Jelly::new(JellyConfig::default(), true);
        jelly.resize(100.0, 100.0, CornerRadii::default());
        assert_eq!(jelly.render_size(), Some(Vec2::new(170.0, 170.0)));

        let mut sink = PathRecorder::default();
        jelly.pointer_enter(5.0, 50.0);
        for k in 0..20 {
            jelly.pointer_move(5.0 + k as f32 * 4.0, 50.0);
            jelly.frame(k as f64 * 16.0, &mut sink);
        }
        jelly.pointer_down(50.0, 50.0);

        assert!(jelly.resize(200.0, 100.0, CornerRadii::default()));
        assert_eq!(jelly.render_size(), Some(Vec2::new(270.0, 170.0)));
        let ctx = jelly.context();
        assert!(ctx.boundary.nodes.iter().all(|n| n.pos == n.base && n.vel == Vec2::ZERO));
        assert_eq!(ctx.boundary.rest.len(), ctx.boundary.len());

        for k in 20..60 {
            jelly.frame(k as f64 * 16.0, &mut sink);
        }
        assert!(sink.outline.unwrap().ends_with(" Z"));
    }

    #[test]
    fn test_set_config_rebuilds() {
        let mut jelly = Jelly::new(JellyConfig::default(), true);
        jelly.resize(200.0, 120.0, CornerRadii::default());
        let mut config = JellyConfig::default();
        config.node_count = 60;
        jelly.set_config(config);
        assert_eq!(jelly.context().boundary.len(), 60);
        assert_eq!(jelly.path().matches(" C ").count(), 60);
    }
}
