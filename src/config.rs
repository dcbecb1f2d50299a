//! Jelly configuration
//!
//! Every field is optional in JSON; missing values fall back to the chosen
//! preset's defaults. `PointerTuning` is the extended layer - most hosts never
//! touch it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::{MAX_NODES, MIN_NODES};
use crate::error::JellyError;

/// Motion intensity presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MotionPreset {
    /// No ambient drift, pointer response only
    Still,
    Calm,
    #[default]
    Standard,
    Lively,
}

impl MotionPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotionPreset::Still => "Still",
            MotionPreset::Calm => "Calm",
            MotionPreset::Standard => "Standard",
            MotionPreset::Lively => "Lively",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "still" | "none" => Some(MotionPreset::Still),
            "calm" => Some(MotionPreset::Calm),
            "standard" | "default" => Some(MotionPreset::Standard),
            "lively" => Some(MotionPreset::Lively),
            _ => None,
        }
    }

    /// Idle drift strength for this preset
    pub fn idle_strength(&self) -> f32 {
        match self {
            MotionPreset::Still => 0.0,
            MotionPreset::Calm => 130.0,
            MotionPreset::Standard => 220.0,
            MotionPreset::Lively => 340.0,
        }
    }

    /// Radial ring wave strength for this preset
    pub fn ring_strength(&self) -> f32 {
        match self {
            MotionPreset::Still => 360.0,
            MotionPreset::Calm => 380.0,
            MotionPreset::Standard => 520.0,
            MotionPreset::Lively => 720.0,
        }
    }
}

/// Press/click impulse
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickConfig {
    /// Footprint of the impulse (pixels)
    pub radius: f32,
    /// Positive pushes outward, negative sucks inward
    pub indent: f32,
    /// Shockwave away from the click point
    pub wave: f32,
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self {
            radius: 140.0,
            indent: 1.35,
            wave: 0.8,
        }
    }
}

/// Ambient "breathing" motion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    pub enabled: bool,
    /// Overall force scale
    pub strength: f32,
    /// Cycles per second
    pub freq: f32,
    /// Waves around the perimeter
    pub waves: f32,
    /// 0..1 mix of the secondary wave
    pub turbulence: f32,
    /// 0..1 tangential component ratio
    pub tangential: f32,
    /// 0..1 idle amount while the pointer is inside
    pub interact_mul: f32,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strength: 220.0,
            freq: 0.55,
            waves: 2.2,
            turbulence: 0.35,
            tangential: 0.22,
            interact_mul: 0.25,
        }
    }
}

/// Outline stroke styling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineStyle {
    pub enabled: bool,
    pub stroke: String,
    pub stroke_width: f32,
    /// Extra CSS class for the outline path
    pub class_name: Option<String>,
}

impl Default for OutlineStyle {
    fn default() -> Self {
        Self {
            enabled: true,
            stroke: "rgba(255, 255, 255, 0.25)".to_string(),
            stroke_width: 1.5,
            class_name: None,
        }
    }
}

/// Extended pointer-force shaping
///
/// Sigma, width and length factors are relative to the interaction radius.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerTuning {
    /// px/s clamp for pointer velocity
    pub speed_max: f32,
    /// Depth (px) that counts as full penetration
    pub penetration_scale: f32,

    // === Entry impulse ===
    pub enter_strength: f32,
    pub enter_base: f32,
    pub enter_speed_gain: f32,
    pub enter_sigma: f32,
    pub enter_weight_pow: f32,
    pub enter_speed_pow: f32,
    pub enter_depth_pow: f32,
    /// Entry pulse decay (1/s)
    pub enter_decay: f32,
    pub enter_mul: f32,

    // === Continuous indentation ===
    pub indent_sigma: f32,
    pub indent_weight_pow: f32,
    pub indent_base: f32,
    pub indent_speed_gain: f32,
    pub indent_mul: f32,
    /// Extra response for large per-event moves
    pub fast_boost: f32,

    // === Directional cone wave ===
    pub cone_speed_min: f32,
    pub cone_width_base: f32,
    pub cone_width_slope: f32,
    pub cone_length: f32,
    pub cone_phase_travel: f32,
    pub cone_phase_scale: f32,
    pub cone_freq: f32,
    pub cone_normal_base: f32,
    pub cone_normal_speed_gain: f32,
    pub cone_tang_base: f32,
    pub cone_tang_speed_gain: f32,
    pub cone_mul: f32,

    // === Pressure coupling ===
    pub pressure_boost: f32,
    pub pressure_boost_pow: f32,
    pub pressure_boost_speed_pow: f32,

    // === Radial ring wave ===
    pub ring_strength: f32,
    pub ring_mul: f32,
    pub ring_freq: f32,
    pub ring_length: f32,
    pub ring_phase_travel: f32,
    pub ring_phase_scale: f32,
    pub ring_weight_pow: f32,
}

impl Default for PointerTuning {
    fn default() -> Self {
        Self {
            speed_max: 4200.0,
            penetration_scale: 42.0,

            enter_strength: 1.0,
            enter_base: 1400.0,
            enter_speed_gain: 2200.0,
            enter_sigma: 0.22,
            enter_weight_pow: 1.45,
            enter_speed_pow: 0.85,
            enter_depth_pow: 0.9,
            enter_decay: 10.0,
            enter_mul: 1.0,

            indent_sigma: 0.22,
            indent_weight_pow: 2.0,
            indent_base: 750.0,
            indent_speed_gain: 1400.0,
            indent_mul: 1.0,
            fast_boost: 1.1,

            cone_speed_min: 25.0,
            cone_width_base: 0.22,
            cone_width_slope: 0.38,
            cone_length: 1.8,
            cone_phase_travel: 0.65,
            cone_phase_scale: 0.55,
            cone_freq: 1.0,
            cone_normal_base: 420.0,
            cone_normal_speed_gain: 900.0,
            cone_tang_base: 220.0,
            cone_tang_speed_gain: 480.0,
            cone_mul: 1.0,

            pressure_boost: 0.0,
            pressure_boost_pow: 1.15,
            pressure_boost_speed_pow: 0.9,

            ring_strength: 520.0,
            ring_mul: 1.0,
            ring_freq: 1.0,
            ring_length: 3.0,
            ring_phase_travel: 0.85,
            ring_phase_scale: 0.75,
            ring_weight_pow: 1.0,
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JellyConfig {
    pub preset: MotionPreset,

    // === Boundary ===
    pub node_count: usize,
    /// Catmull-Rom tension, lower = smoother
    pub path_tension: f32,

    // === Springs ===
    pub edge_k: f32,
    pub shape_k: f32,
    /// Curvature stiffness (removes sharp kinks)
    pub bend_k: f32,
    pub pressure_k: f32,
    /// Bound on the total (area + boost) pressure error
    pub pressure_limit: f32,
    pub damping: f32,
    /// Post-step smoothing, 0..1
    pub smooth_k: f32,
    pub smooth_iters: u32,

    // === Layout ===
    /// Defaults to 10% of the shorter side
    pub max_offset: Option<f32>,
    /// Defaults to `1.7 * max_offset + 18`
    pub bleed: Option<f32>,

    // === Pointer ===
    /// Defaults to 22% of the shorter side
    pub hover_radius: Option<f32>,
    pub hover_indent: f32,
    pub hover_drag: f32,
    pub tuning: PointerTuning,
    pub click: ClickConfig,

    pub idle: IdleConfig,
    pub outline: OutlineStyle,

    // === Accessibility ===
    /// Disables idle drift and traveling waves
    pub reduced_motion: bool,
}

impl Default for JellyConfig {
    fn default() -> Self {
        Self {
            preset: MotionPreset::Standard,

            node_count: 44,
            path_tension: 0.65,

            edge_k: 170.0,
            shape_k: 95.0,
            bend_k: 70.0,
            pressure_k: 14000.0,
            pressure_limit: 0.35,
            damping: 9.0,
            smooth_k: 0.06,
            smooth_iters: 1,

            max_offset: None,
            bleed: None,

            hover_radius: None,
            hover_indent: 1.25,
            hover_drag: 0.35,
            tuning: PointerTuning::default(),
            click: ClickConfig::default(),

            idle: IdleConfig::default(),
            outline: OutlineStyle::default(),

            reduced_motion: false,
        }
    }
}

impl JellyConfig {
    /// Create a config from a motion preset (applies preset defaults)
    pub fn from_preset(preset: MotionPreset) -> Self {
        let mut config = Self::default();
        config.apply_preset(preset);
        config
    }

    /// Apply a motion preset (updates preset-dependent values)
    pub fn apply_preset(&mut self, preset: MotionPreset) {
        self.preset = preset;
        self.idle.strength = preset.idle_strength();
        self.idle.enabled = preset != MotionPreset::Still;
        self.tuning.ring_strength = preset.ring_strength();
    }

    /// Parse and validate a JSON config.
    ///
    /// A `preset` sets the starting values; explicit fields override them.
    pub fn from_json(json: &str) -> Result<Self, JellyError> {
        let overrides: Value = serde_json::from_str(json)?;
        let preset = match overrides.get("preset") {
            Some(value) => MotionPreset::deserialize(value)?,
            None => MotionPreset::default(),
        };
        let mut merged = serde_json::to_value(Self::from_preset(preset))?;
        merge_json(&mut merged, overrides);

        let config: Self = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the integrator can't use
    pub fn validate(&self) -> Result<(), JellyError> {
        let non_negative = [
            ("edge_k", self.edge_k),
            ("shape_k", self.shape_k),
            ("bend_k", self.bend_k),
            ("pressure_k", self.pressure_k),
            ("pressure_limit", self.pressure_limit),
            ("damping", self.damping),
            ("click.radius", self.click.radius),
            ("idle.strength", self.idle.strength),
            ("tuning.speed_max", self.tuning.speed_max),
            ("outline.stroke_width", self.outline.stroke_width),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(JellyError::invalid(field, format!("expected >= 0, got {value}")));
            }
        }

        let unit = [
            ("smooth_k", self.smooth_k),
            ("idle.turbulence", self.idle.turbulence),
            ("idle.tangential", self.idle.tangential),
            ("idle.interact_mul", self.idle.interact_mul),
        ];
        for (field, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(JellyError::invalid(field, format!("expected 0..=1, got {value}")));
            }
        }

        let optional = [
            ("max_offset", self.max_offset),
            ("bleed", self.bleed),
            ("hover_radius", self.hover_radius),
        ];
        for (field, value) in optional {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(JellyError::invalid(field, format!("expected >= 0, got {v}")));
                }
            }
        }

        if !self.path_tension.is_finite() {
            return Err(JellyError::invalid("path_tension", "must be finite"));
        }
        if self.node_count == 0 {
            return Err(JellyError::invalid("node_count", "must be positive"));
        }
        Ok(())
    }

    /// Node count after clamping to the supported range
    pub fn effective_node_count(&self) -> usize {
        self.node_count.clamp(MIN_NODES, MAX_NODES)
    }

    /// Idle drift (respects reduced_motion)
    pub fn effective_idle(&self) -> bool {
        self.idle.enabled && self.idle.strength > 0.0 && !self.reduced_motion
    }

    /// Cone and ring waves (respects reduced_motion)
    pub fn effective_waves(&self) -> bool {
        !self.reduced_motion
    }
}

/// Overlay `overrides` onto `base`, recursing into objects
fn merge_json(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                merge_json(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, overrides) => *base = overrides,
    }
}
