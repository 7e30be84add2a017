//! Tunable constants for the particle field.
//!
//! [`FieldConfig::default`] reproduces the landing-page look. Every value
//! can be overridden from a JSON object (see [`FieldConfig::from_json`]),
//! and [`FieldConfig::param_schema`] describes the accepted keys.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::color::Rgba;
use crate::error::FieldError;
use crate::palette::ParticlePalette;
use crate::params::{param_color, param_f64, param_string, param_usize};

const DEFAULT_AREA_PER_PARTICLE: f64 = 12_000.0;
const DEFAULT_MIN_PARTICLES: usize = 50;
const DEFAULT_FALLBACK_WIDTH: f64 = 1920.0;
const DEFAULT_FALLBACK_HEIGHT: f64 = 1080.0;
const DEFAULT_INITIAL_SPEED_SPREAD: f64 = 0.6;
const DEFAULT_RESTART_SPEED_SPREAD: f64 = 0.3;
const DEFAULT_MIN_SPEED: f64 = 0.05;
const DEFAULT_MAX_SPEED: f64 = 2.0;
const DEFAULT_DAMPING: f64 = 0.998;
/// One frame at 60 fps.
const DEFAULT_BASELINE_FRAME_MS: f64 = 16.67;
const DEFAULT_MAX_TIME_SCALE: f64 = 3.0;
const DEFAULT_SKIP_FRAME_MS: f64 = 200.0;
const DEFAULT_REPULSION_RADIUS: f64 = 200.0;
const DEFAULT_REPULSION_STRENGTH: f64 = 0.3;
const DEFAULT_POINTER_SWELL: f64 = 1.5;
const DEFAULT_BASE_SIZE_MIN: f64 = 1.5;
const DEFAULT_BASE_SIZE_RANGE: f64 = 1.5;
const DEFAULT_PULSE_RATE: f64 = 0.02;
const DEFAULT_PULSE_AMPLITUDE: f64 = 0.5;
const DEFAULT_LINK_DISTANCE: f64 = 180.0;
const DEFAULT_LINK_FALLOFF: f64 = 1200.0;
const DEFAULT_LINK_MAX_OPACITY: f64 = 0.2;
const DEFAULT_LINK_MIN_OPACITY: f64 = 0.08;
const DEFAULT_LINK_WIDTH: f64 = 1.0;

/// Simulation and appearance settings for a [`ParticleField`](crate::ParticleField).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Surface area (px^2) per particle when sizing the population.
    pub area_per_particle: f64,
    /// Population floor regardless of area.
    pub min_particles: usize,
    /// Width used when the surface reports zero width or height.
    pub fallback_width: f64,
    /// Height used when the surface reports zero width or height.
    pub fallback_height: f64,
    /// Spawn velocity components are drawn from `(r - 0.5) * spread`.
    pub initial_speed_spread: f64,
    /// Same draw, used to restart a particle that came to rest.
    pub restart_speed_spread: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    /// Per-step velocity multiplier.
    pub damping: f64,
    /// Frame duration that counts as one unit of simulated time.
    pub baseline_frame_ms: f64,
    /// Upper bound on simulated time per step, in baseline frames.
    pub max_time_scale: f64,
    /// Frames with a longer delta than this are skipped.
    pub skip_frame_ms: f64,
    pub repulsion_radius: f64,
    pub repulsion_strength: f64,
    /// Extra radius added at the pointer position, fading to 0 at the radius edge.
    pub pointer_swell: f64,
    pub base_size_min: f64,
    pub base_size_range: f64,
    /// Phase advance per baseline frame.
    pub pulse_rate: f64,
    pub pulse_amplitude: f64,
    /// Particles closer than this are linked.
    pub link_distance: f64,
    /// Opacity drops by 1 per `link_falloff` px.
    pub link_falloff: f64,
    pub link_max_opacity: f64,
    pub link_min_opacity: f64,
    pub link_width: f64,
    pub link_color: Rgba,
    pub palette: ParticlePalette,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            area_per_particle: DEFAULT_AREA_PER_PARTICLE,
            min_particles: DEFAULT_MIN_PARTICLES,
            fallback_width: DEFAULT_FALLBACK_WIDTH,
            fallback_height: DEFAULT_FALLBACK_HEIGHT,
            initial_speed_spread: DEFAULT_INITIAL_SPEED_SPREAD,
            restart_speed_spread: DEFAULT_RESTART_SPEED_SPREAD,
            min_speed: DEFAULT_MIN_SPEED,
            max_speed: DEFAULT_MAX_SPEED,
            damping: DEFAULT_DAMPING,
            baseline_frame_ms: DEFAULT_BASELINE_FRAME_MS,
            max_time_scale: DEFAULT_MAX_TIME_SCALE,
            skip_frame_ms: DEFAULT_SKIP_FRAME_MS,
            repulsion_radius: DEFAULT_REPULSION_RADIUS,
            repulsion_strength: DEFAULT_REPULSION_STRENGTH,
            pointer_swell: DEFAULT_POINTER_SWELL,
            base_size_min: DEFAULT_BASE_SIZE_MIN,
            base_size_range: DEFAULT_BASE_SIZE_RANGE,
            pulse_rate: DEFAULT_PULSE_RATE,
            pulse_amplitude: DEFAULT_PULSE_AMPLITUDE,
            link_distance: DEFAULT_LINK_DISTANCE,
            link_falloff: DEFAULT_LINK_FALLOFF,
            link_max_opacity: DEFAULT_LINK_MAX_OPACITY,
            link_min_opacity: DEFAULT_LINK_MIN_OPACITY,
            link_width: DEFAULT_LINK_WIDTH,
            link_color: Rgba::WHITE,
            palette: ParticlePalette::docs(),
        }
    }
}

impl FieldConfig {
    /// Builds a config from a JSON object, falling back to defaults per key.
    ///
    /// `palette` selects a named palette; `primary_color`, `secondary_color`
    /// and `highlight_color` override individual palette entries afterwards.
    /// The result is validated before it is returned.
    pub fn from_json(params: &Value) -> Result<Self, FieldError> {
        let d = Self::default();
        let mut palette = ParticlePalette::from_name(&param_string(params, "palette", "docs"))?;
        palette.primary = param_color(params, "primary_color", palette.primary)?;
        palette.secondary = param_color(params, "secondary_color", palette.secondary)?;
        palette.highlight = param_color(params, "highlight_color", palette.highlight)?;

        let config = Self {
            area_per_particle: param_f64(params, "area_per_particle", d.area_per_particle),
            min_particles: param_usize(params, "min_particles", d.min_particles),
            fallback_width: param_f64(params, "fallback_width", d.fallback_width),
            fallback_height: param_f64(params, "fallback_height", d.fallback_height),
            initial_speed_spread: param_f64(params, "initial_speed_spread", d.initial_speed_spread),
            restart_speed_spread: param_f64(params, "restart_speed_spread", d.restart_speed_spread),
            min_speed: param_f64(params, "min_speed", d.min_speed),
            max_speed: param_f64(params, "max_speed", d.max_speed),
            damping: param_f64(params, "damping", d.damping),
            baseline_frame_ms: param_f64(params, "baseline_frame_ms", d.baseline_frame_ms),
            max_time_scale: param_f64(params, "max_time_scale", d.max_time_scale),
            skip_frame_ms: param_f64(params, "skip_frame_ms", d.skip_frame_ms),
            repulsion_radius: param_f64(params, "repulsion_radius", d.repulsion_radius),
            repulsion_strength: param_f64(params, "repulsion_strength", d.repulsion_strength),
            pointer_swell: param_f64(params, "pointer_swell", d.pointer_swell),
            base_size_min: param_f64(params, "base_size_min", d.base_size_min),
            base_size_range: param_f64(params, "base_size_range", d.base_size_range),
            pulse_rate: param_f64(params, "pulse_rate", d.pulse_rate),
            pulse_amplitude: param_f64(params, "pulse_amplitude", d.pulse_amplitude),
            link_distance: param_f64(params, "link_distance", d.link_distance),
            link_falloff: param_f64(params, "link_falloff", d.link_falloff),
            link_max_opacity: param_f64(params, "link_max_opacity", d.link_max_opacity),
            link_min_opacity: param_f64(params, "link_min_opacity", d.link_min_opacity),
            link_width: param_f64(params, "link_width", d.link_width),
            link_color: param_color(params, "link_color", d.link_color)?,
            palette,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is finite and the ranges are consistent.
    pub fn validate(&self) -> Result<(), FieldError> {
        let finite = [
            ("area_per_particle", self.area_per_particle),
            ("fallback_width", self.fallback_width),
            ("fallback_height", self.fallback_height),
            ("initial_speed_spread", self.initial_speed_spread),
            ("restart_speed_spread", self.restart_speed_spread),
            ("min_speed", self.min_speed),
            ("max_speed", self.max_speed),
            ("damping", self.damping),
            ("baseline_frame_ms", self.baseline_frame_ms),
            ("max_time_scale", self.max_time_scale),
            ("skip_frame_ms", self.skip_frame_ms),
            ("repulsion_radius", self.repulsion_radius),
            ("repulsion_strength", self.repulsion_strength),
            ("pointer_swell", self.pointer_swell),
            ("base_size_min", self.base_size_min),
            ("base_size_range", self.base_size_range),
            ("pulse_rate", self.pulse_rate),
            ("pulse_amplitude", self.pulse_amplitude),
            ("link_distance", self.link_distance),
            ("link_falloff", self.link_falloff),
            ("link_max_opacity", self.link_max_opacity),
            ("link_min_opacity", self.link_min_opacity),
            ("link_width", self.link_width),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(FieldError::InvalidConfig(format!("{name} must be finite, got {value}")));
        }

        let positive = [
            ("area_per_particle", self.area_per_particle),
            ("fallback_width", self.fallback_width),
            ("fallback_height", self.fallback_height),
            ("max_speed", self.max_speed),
            ("baseline_frame_ms", self.baseline_frame_ms),
            ("max_time_scale", self.max_time_scale),
            ("skip_frame_ms", self.skip_frame_ms),
            ("repulsion_radius", self.repulsion_radius),
            ("link_falloff", self.link_falloff),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, v)| *v <= 0.0) {
            return Err(FieldError::InvalidConfig(format!("{name} must be positive, got {value}")));
        }

        if self.min_speed < 0.0 || self.min_speed > self.max_speed {
            return Err(FieldError::InvalidConfig(format!(
                "min_speed ({}) must be within [0, max_speed ({})]",
                self.min_speed, self.max_speed
            )));
        }
        if !(0.0..=1.0).contains(&self.damping) || self.damping == 0.0 {
            return Err(FieldError::InvalidConfig(format!(
                "damping must be in (0, 1], got {}",
                self.damping
            )));
        }
        if !(0.0..=1.0).contains(&self.link_min_opacity)
            || !(0.0..=1.0).contains(&self.link_max_opacity)
            || self.link_min_opacity > self.link_max_opacity
        {
            return Err(FieldError::InvalidConfig(format!(
                "link opacities must satisfy 0 <= min ({}) <= max ({}) <= 1",
                self.link_min_opacity, self.link_max_opacity
            )));
        }
        if self.link_distance < 0.0 || self.base_size_min < 0.0 || self.base_size_range < 0.0 {
            return Err(FieldError::InvalidConfig(
                "link_distance, base_size_min and base_size_range must be non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Current values as a flat JSON object accepted by [`from_json`](Self::from_json).
    pub fn params(&self) -> Value {
        json!({
            "area_per_particle": self.area_per_particle,
            "min_particles": self.min_particles,
            "fallback_width": self.fallback_width,
            "fallback_height": self.fallback_height,
            "initial_speed_spread": self.initial_speed_spread,
            "restart_speed_spread": self.restart_speed_spread,
            "min_speed": self.min_speed,
            "max_speed": self.max_speed,
            "damping": self.damping,
            "baseline_frame_ms": self.baseline_frame_ms,
            "max_time_scale": self.max_time_scale,
            "skip_frame_ms": self.skip_frame_ms,
            "repulsion_radius": self.repulsion_radius,
            "repulsion_strength": self.repulsion_strength,
            "pointer_swell": self.pointer_swell,
            "base_size_min": self.base_size_min,
            "base_size_range": self.base_size_range,
            "pulse_rate": self.pulse_rate,
            "pulse_amplitude": self.pulse_amplitude,
            "link_distance": self.link_distance,
            "link_falloff": self.link_falloff,
            "link_max_opacity": self.link_max_opacity,
            "link_min_opacity": self.link_min_opacity,
            "link_width": self.link_width,
            "link_color": self.link_color.to_css(),
            "primary_color": self.palette.primary.to_css(),
            "secondary_color": self.palette.secondary.to_css(),
            "highlight_color": self.palette.highlight.to_css(),
        })
    }

    /// Schema of every accepted key: type, default, range and description.
    pub fn param_schema() -> Value {
        fn number(default: f64, min: f64, max: f64, description: &str) -> Value {
            json!({
                "type": "number",
                "default": default,
                "min": min,
                "max": max,
                "description": description,
            })
        }
        fn color(default: Rgba, description: &str) -> Value {
            json!({
                "type": "color",
                "default": default.to_css(),
                "description": description,
            })
        }
        let palette = ParticlePalette::docs();
        json!({
            "palette": {
                "type": "string",
                "default": "docs",
                "options": ParticlePalette::list_names(),
                "description": "Named particle palette"
            },
            "area_per_particle": number(DEFAULT_AREA_PER_PARTICLE, 1000.0, 100_000.0, "Surface area (px^2) per particle"),
            "min_particles": {
                "type": "integer",
                "default": DEFAULT_MIN_PARTICLES,
                "min": 0,
                "max": 1000,
                "description": "Population floor regardless of area"
            },
            "fallback_width": number(DEFAULT_FALLBACK_WIDTH, 1.0, 8192.0, "Width used when the surface reports zero size"),
            "fallback_height": number(DEFAULT_FALLBACK_HEIGHT, 1.0, 8192.0, "Height used when the surface reports zero size"),
            "initial_speed_spread": number(DEFAULT_INITIAL_SPEED_SPREAD, 0.0, 4.0, "Spread of spawn velocity components"),
            "restart_speed_spread": number(DEFAULT_RESTART_SPEED_SPREAD, 0.0, 4.0, "Spread of restart velocity components"),
            "min_speed": number(DEFAULT_MIN_SPEED, 0.0, 1.0, "Lower speed bound (px per baseline frame)"),
            "max_speed": number(DEFAULT_MAX_SPEED, 0.1, 10.0, "Upper speed bound (px per baseline frame)"),
            "damping": number(DEFAULT_DAMPING, 0.9, 1.0, "Velocity multiplier per step"),
            "baseline_frame_ms": number(DEFAULT_BASELINE_FRAME_MS, 1.0, 100.0, "Frame duration of one simulated time unit"),
            "max_time_scale": number(DEFAULT_MAX_TIME_SCALE, 1.0, 10.0, "Cap on simulated time per step, in baseline frames"),
            "skip_frame_ms": number(DEFAULT_SKIP_FRAME_MS, 50.0, 2000.0, "Frames with longer deltas are skipped"),
            "repulsion_radius": number(DEFAULT_REPULSION_RADIUS, 1.0, 1000.0, "Pointer influence radius (px)"),
            "repulsion_strength": number(DEFAULT_REPULSION_STRENGTH, 0.0, 5.0, "Peak pointer push per baseline frame"),
            "pointer_swell": number(DEFAULT_POINTER_SWELL, 0.0, 10.0, "Size added at the pointer, fading to 0 at the radius"),
            "base_size_min": number(DEFAULT_BASE_SIZE_MIN, 0.0, 20.0, "Smallest base particle radius (px)"),
            "base_size_range": number(DEFAULT_BASE_SIZE_RANGE, 0.0, 20.0, "Random extra base radius (px)"),
            "pulse_rate": number(DEFAULT_PULSE_RATE, 0.0, 1.0, "Pulse phase advance per baseline frame (rad)"),
            "pulse_amplitude": number(DEFAULT_PULSE_AMPLITUDE, 0.0, 5.0, "Pulse radius amplitude (px)"),
            "link_distance": number(DEFAULT_LINK_DISTANCE, 0.0, 1000.0, "Particles closer than this are linked (px)"),
            "link_falloff": number(DEFAULT_LINK_FALLOFF, 1.0, 10_000.0, "Link opacity drops by 1 per this many px"),
            "link_max_opacity": number(DEFAULT_LINK_MAX_OPACITY, 0.0, 1.0, "Link opacity at zero distance"),
            "link_min_opacity": number(DEFAULT_LINK_MIN_OPACITY, 0.0, 1.0, "Link opacity floor"),
            "link_width": number(DEFAULT_LINK_WIDTH, 0.1, 10.0, "Link stroke width (px)"),
            "link_color": color(Rgba::WHITE, "Link stroke color; alpha is replaced by the distance opacity"),
            "primary_color": color(palette.primary, "First particle color"),
            "secondary_color": color(palette.secondary, "Second particle color"),
            "highlight_color": color(palette.highlight, "Particle center dot color"),
        })
    }
}
