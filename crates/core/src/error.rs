//! Error types for the ambient field core.

use thiserror::Error;

/// Errors produced by field, surface, and configuration operations.
#[derive(Debug, Error)]
pub enum FieldError {
    /// A surface reported a non-finite or negative size.
    #[error("invalid dimensions: width and height must be finite and non-negative")]
    InvalidDimensions,

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A configuration value was out of range or inconsistent with another.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A palette name was not recognized.
    #[error("unknown palette: {0}")]
    UnknownPalette(String),

    /// The drawing backend rejected a call.
    #[error("surface error: {0}")]
    Surface(String),

    /// The host refused to schedule a frame or timer.
    #[error("host error: {0}")]
    Host(String),

    /// An I/O error (snapshot write, config read).
    #[error("I/O error: {0}")]
    Io(String),
}
