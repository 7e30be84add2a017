#![deny(unsafe_code)]
//! CPU rendering for the ambient particle field.
//!
//! [`RasterSurface`] implements the core `Surface` trait in memory, so a
//! `ParticleField` can be stepped and drawn without a browser. [`render`]
//! runs a fixed number of frames headlessly and returns the final surface;
//! `snapshot::write_png` (feature `png`) saves it.

pub mod buffer;
pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use ambient_field_core::{FieldConfig, FieldError, ParticleField, StepOutcome};
use glam::DVec2;
use tracing::debug;

pub use buffer::RasterSurface;

/// Parameters of a headless render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    /// Frames stepped before the final draw.
    pub frames: usize,
    /// Simulated time between frames.
    pub frame_ms: f64,
    /// Pointer held still for the whole run.
    pub pointer: Option<DVec2>,
}

impl Default for RenderJob {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            seed: 42,
            frames: 120,
            frame_ms: 16.67,
            pointer: None,
        }
    }
}

/// Result of [`render`]: the drawn surface and the field that produced it.
pub struct Rendered {
    pub surface: RasterSurface,
    pub field: ParticleField,
    pub frames_skipped: usize,
}

/// Seeds a field on a fresh surface, steps `job.frames` times and draws once.
pub fn render(job: &RenderJob, config: FieldConfig) -> Result<Rendered, FieldError> {
    config.validate()?;
    let mut surface = RasterSurface::new(job.width, job.height)?;
    let mut field = ParticleField::new(config, job.seed);
    field.initialize(&surface);
    field.set_pointer(job.pointer);

    let mut frames_skipped = 0;
    for _ in 0..job.frames {
        if field.step(job.frame_ms) == StepOutcome::Skipped {
            frames_skipped += 1;
        }
    }
    field.draw(&mut surface)?;
    debug!(
        frames = job.frames,
        frames_skipped,
        particles = field.particles().len(),
        "headless render complete"
    );
    Ok(Rendered {
        surface,
        field,
        frames_skipped,
    })
}
