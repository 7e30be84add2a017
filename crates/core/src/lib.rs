#![deny(unsafe_code)]
//! Core types for the ambient particle field.
//!
//! Provides the `Animation` trait, the `ParticleField` simulation and its
//! `Particle`s, the `Surface` drawing trait (with a `RecordingSurface` for
//! inspection), `Rgba` colors and `ParticlePalette`, `FieldConfig`, the
//! `Xorshift64` PRNG, and JSON parameter helpers. Nothing here touches a
//! clock or a window: time arrives as millisecond deltas and pixels leave
//! through a `Surface`.

pub mod animation;
pub mod color;
pub mod config;
pub mod error;
pub mod field;
pub mod palette;
pub mod params;
pub mod particle;
pub mod prng;
pub mod surface;

pub use animation::{Animation, StepOutcome};
pub use color::Rgba;
pub use config::FieldConfig;
pub use error::FieldError;
pub use field::{Link, ParticleField};
pub use palette::ParticlePalette;
pub use particle::Particle;
pub use prng::Xorshift64;
pub use surface::{DrawCommand, RecordingSurface, Size, Surface};
