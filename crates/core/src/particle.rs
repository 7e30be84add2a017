//! A single drifting particle.

use glam::DVec2;

use crate::color::Rgba;
use crate::config::FieldConfig;
use crate::prng::Xorshift64;
use crate::surface::Size;

/// One point in the field.
///
/// After every [`advance`](Particle::advance) the speed lies in
/// `[config.min_speed, config.max_speed]` and the position lies in
/// `[0, width) x [0, height)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: DVec2,
    /// Pixels per baseline frame.
    pub velocity: DVec2,
    pub base_size: f64,
    /// Radius after pulse and pointer swell.
    pub size: f64,
    pub color: Rgba,
    /// Pulse phase in radians.
    pub phase: f64,
}

impl Particle {
    /// Spawns a particle at a random point of `bounds`.
    pub fn spawn(bounds: Size, config: &FieldConfig, rng: &mut Xorshift64) -> Self {
        let position = DVec2::new(
            wrap(rng.next_f64() * bounds.width, bounds.width),
            wrap(rng.next_f64() * bounds.height, bounds.height),
        );
        let velocity = DVec2::new(
            rng.next_centered(config.initial_speed_spread),
            rng.next_centered(config.initial_speed_spread),
        );
        let base_size = config.base_size_min + rng.next_f64() * config.base_size_range;
        let color = config.palette.pick(rng);
        let phase = rng.next_angle();
        Self {
            position,
            velocity,
            base_size,
            size: base_size,
            color,
            phase,
        }
    }

    /// Advances by `time_scale` baseline frames.
    ///
    /// `pointer`, when present, pushes the particle away within
    /// `config.repulsion_radius`.
    pub fn advance(
        &mut self,
        pointer: Option<DVec2>,
        time_scale: f64,
        bounds: Size,
        config: &FieldConfig,
        rng: &mut Xorshift64,
    ) {
        self.phase += config.pulse_rate * time_scale;
        self.position += self.velocity * time_scale;

        let pulse = self.phase.sin() * config.pulse_amplitude;
        let swell = pointer.map_or(0.0, |p| self.repel_from(p, time_scale, config));
        self.size = self.base_size + pulse + swell;

        self.velocity *= config.damping;
        self.enforce_speed(config, rng);

        self.position = DVec2::new(
            wrap(self.position.x, bounds.width),
            wrap(self.position.y, bounds.height),
        );
    }

    /// Current speed in pixels per baseline frame.
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    /// Applies the pointer push and returns the size swell for this frame.
    fn repel_from(&mut self, pointer: DVec2, time_scale: f64, config: &FieldConfig) -> f64 {
        let away = self.position - pointer;
        let dist = away.length();
        let radius = config.repulsion_radius;
        if dist <= 0.0 || dist >= radius {
            return 0.0;
        }
        let proximity = (radius - dist) / radius;
        let force = proximity * proximity * config.repulsion_strength;
        self.velocity += away / dist * force * time_scale;
        proximity * config.pointer_swell
    }

    fn enforce_speed(&mut self, config: &FieldConfig, rng: &mut Xorshift64) {
        if self.velocity.length_squared() == 0.0 {
            self.velocity = DVec2::new(
                rng.next_centered(config.restart_speed_spread),
                rng.next_centered(config.restart_speed_spread),
            );
            if self.velocity.length_squared() == 0.0 {
                self.velocity = DVec2::from_angle(rng.next_angle()) * config.min_speed;
            }
        }
        self.velocity = self
            .velocity
            .clamp_length(config.min_speed, config.max_speed);
    }
}

/// Wraps `value` into `[0, extent)`.
///
/// Euclidean remainder keeps any overshoot; the final guard catches the case
/// where a tiny negative value rounds up to exactly `extent`.
pub fn wrap(value: f64, extent: f64) -> f64 {
    if extent <= 0.0 {
        return 0.0;
    }
    let wrapped = value.rem_euclid(extent);
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}
