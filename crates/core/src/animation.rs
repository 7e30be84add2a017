//! The `Animation` trait driven by the frame loop.
//!
//! The trait is object-safe so a controller can hold `Box<dyn Animation>`
//! when the concrete effect is chosen at runtime.

use glam::DVec2;
use serde_json::Value;

use crate::error::FieldError;
use crate::surface::Surface;

/// Result of one [`Animation::step`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// State advanced by `time_scale` baseline frames.
    Advanced { time_scale: f64 },
    /// The delta was too large (or not a number) and the frame was dropped.
    Skipped,
}

/// A frame-driven visual effect.
pub trait Animation {
    /// Measures `surface` and (re)creates the animated state for its size.
    fn initialize(&mut self, surface: &dyn Surface);

    /// Advances by `delta_ms` of wall-clock time since the previous frame.
    fn step(&mut self, delta_ms: f64) -> StepOutcome;

    /// Renders the current state.
    fn draw(&self, surface: &mut dyn Surface) -> Result<(), FieldError>;

    /// Latest pointer position, or `None` once the pointer has left.
    fn set_pointer(&mut self, pointer: Option<DVec2>);

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing every parameter: type, range, default, description.
    fn param_schema(&self) -> Value;
}
