//! The particle field: population, stepping, and drawing.
//!
//! A `ParticleField` sizes its population from the surface area, advances
//! every particle once per frame with frame-rate independent time scaling,
//! and draws glowing discs plus faint links between nearby particles.

use glam::DVec2;
use serde_json::Value;
use tracing::debug;

use crate::animation::{Animation, StepOutcome};
use crate::config::FieldConfig;
use crate::error::FieldError;
use crate::particle::Particle;
use crate::prng::Xorshift64;
use crate::surface::{Size, Surface};

/// Outer glow radius relative to the middle glow.
const OUTER_GLOW_SCALE: f64 = 1.2;
/// Middle glow radius relative to the particle size.
const GLOW_SCALE: f64 = 1.5;
const OUTER_GLOW_ALPHA: f64 = 0.1;
const GLOW_ALPHA: f64 = 0.2;
/// Highlight dot radius relative to the particle size.
const HIGHLIGHT_SCALE: f64 = 0.4;

/// A line between two nearby particles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub from: DVec2,
    pub to: DVec2,
    pub distance: f64,
    pub opacity: f64,
}

/// Number of particles for a surface of `size`.
///
/// `max(floor(area / area_per_particle), min_particles)`.
pub fn particle_count_for(size: Size, config: &FieldConfig) -> usize {
    let by_area = (size.area() / config.area_per_particle).floor();
    let by_area = if by_area.is_finite() && by_area > 0.0 {
        by_area as usize
    } else {
        0
    };
    by_area.max(config.min_particles)
}

/// Link opacity for two particles `distance` px apart.
pub fn link_opacity(distance: f64, config: &FieldConfig) -> f64 {
    (config.link_max_opacity - distance / config.link_falloff).max(config.link_min_opacity)
}

/// A population of drifting particles on a bounded surface.
#[derive(Debug, Clone)]
pub struct ParticleField {
    config: FieldConfig,
    bounds: Size,
    particles: Vec<Particle>,
    pointer: Option<DVec2>,
    rng: Xorshift64,
}

impl ParticleField {
    /// Creates an empty field. Call [`initialize`](Self::initialize) before stepping.
    pub fn new(config: FieldConfig, seed: u64) -> Self {
        Self {
            config,
            bounds: Size::default(),
            particles: Vec::new(),
            pointer: None,
            rng: Xorshift64::new(seed),
        }
    }

    /// Measures `surface` and spawns a fresh population for its size.
    ///
    /// A surface reporting a zero side is treated as
    /// `fallback_width x fallback_height`.
    pub fn initialize(&mut self, surface: &dyn Surface) {
        let fallback = Size::new(self.config.fallback_width, self.config.fallback_height);
        let measured = surface.size();
        if measured.is_degenerate() {
            debug!(
                width = measured.width,
                height = measured.height,
                "surface has no area, using fallback size"
            );
        }
        self.bounds = measured.or_fallback(fallback);
        self.reseed();
    }

    /// Re-measures after a resize and reseeds.
    pub fn resize(&mut self, surface: &dyn Surface) {
        self.initialize(surface);
    }

    /// Replaces every particle with a freshly spawned one inside the current bounds.
    pub fn reseed(&mut self) {
        let count = particle_count_for(self.bounds, &self.config);
        let bounds = self.bounds;
        let config = &self.config;
        let rng = &mut self.rng;
        self.particles = (0..count)
            .map(|_| Particle::spawn(bounds, config, rng))
            .collect();
        debug!(
            count,
            width = bounds.width,
            height = bounds.height,
            "particles seeded"
        );
    }

    /// Advances every particle by `delta_ms` of wall-clock time.
    ///
    /// Deltas above `skip_frame_ms` (a hidden tab, a debugger pause) and
    /// non-finite deltas skip the frame without touching any state. Negative
    /// deltas count as zero.
    pub fn step(&mut self, delta_ms: f64) -> StepOutcome {
        if !delta_ms.is_finite() || delta_ms > self.config.skip_frame_ms {
            return StepOutcome::Skipped;
        }
        let time_scale =
            (delta_ms.max(0.0) / self.config.baseline_frame_ms).min(self.config.max_time_scale);
        for particle in &mut self.particles {
            particle.advance(
                self.pointer,
                time_scale,
                self.bounds,
                &self.config,
                &mut self.rng,
            );
        }
        StepOutcome::Advanced { time_scale }
    }

    /// Clears `surface` and draws every particle followed by the links.
    pub fn draw(&self, surface: &mut dyn Surface) -> Result<(), FieldError> {
        surface.clear()?;
        let highlight = self.config.palette.highlight;
        for p in &self.particles {
            let glow = p.size * GLOW_SCALE;
            surface.fill_disc(p.position, glow * OUTER_GLOW_SCALE, p.color.fade(OUTER_GLOW_ALPHA))?;
            surface.fill_disc(p.position, glow, p.color.fade(GLOW_ALPHA))?;
            surface.fill_disc(p.position, p.size, p.color)?;
            surface.fill_disc(p.position, p.size * HIGHLIGHT_SCALE, highlight)?;
        }
        for link in self.links() {
            surface.stroke_line(
                link.from,
                link.to,
                self.config.link_width,
                self.config.link_color.with_alpha(link.opacity),
            )?;
        }
        Ok(())
    }

    /// Every unordered pair of particles closer than `link_distance`.
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        let particles = &self.particles;
        let config = &self.config;
        particles.iter().enumerate().flat_map(move |(i, a)| {
            particles[i + 1..].iter().filter_map(move |b| {
                let distance = a.position.distance(b.position);
                (distance < config.link_distance).then(|| Link {
                    from: a.position,
                    to: b.position,
                    distance,
                    opacity: link_opacity(distance, config),
                })
            })
        })
    }

    /// Sets or clears the pointer that repels particles.
    pub fn set_pointer(&mut self, pointer: Option<DVec2>) {
        self.pointer = pointer;
    }

    pub fn pointer(&self) -> Option<DVec2> {
        self.pointer
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Surface size the particles currently wrap within.
    pub fn bounds(&self) -> Size {
        self.bounds
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }
}

impl Animation for ParticleField {
    fn initialize(&mut self, surface: &dyn Surface) {
        ParticleField::initialize(self, surface);
    }

    fn step(&mut self, delta_ms: f64) -> StepOutcome {
        ParticleField::step(self, delta_ms)
    }

    fn draw(&self, surface: &mut dyn Surface) -> Result<(), FieldError> {
        ParticleField::draw(self, surface)
    }

    fn set_pointer(&mut self, pointer: Option<DVec2>) {
        ParticleField::set_pointer(self, pointer);
    }

    fn params(&self) -> Value {
        self.config.params()
    }

    fn param_schema(&self) -> Value {
        FieldConfig::param_schema()
    }
}
