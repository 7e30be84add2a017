//! Particle palettes.
//!
//! A palette has two translucent particle colors, chosen per particle with
//! equal probability at spawn time, plus a highlight color used for the
//! bright dot at each particle's center.

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::FieldError;
use crate::prng::Xorshift64;

/// Names accepted by [`ParticlePalette::from_name`].
const PALETTE_NAMES: &[&str] = &["docs", "sunset", "mono"];

/// Two particle colors and a center highlight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticlePalette {
    pub primary: Rgba,
    pub secondary: Rgba,
    pub highlight: Rgba,
}

impl ParticlePalette {
    /// Emerald and blue on white cores, the documentation site's landing look.
    pub fn docs() -> Self {
        Self {
            primary: Rgba::from_rgba8(16, 185, 129, 0.9),
            secondary: Rgba::from_rgba8(59, 130, 246, 0.9),
            highlight: Rgba::WHITE,
        }
    }

    /// Amber and rose.
    pub fn sunset() -> Self {
        Self {
            primary: Rgba::from_rgba8(245, 158, 11, 0.9),
            secondary: Rgba::from_rgba8(244, 63, 94, 0.9),
            highlight: Rgba::from_rgba8(255, 247, 237, 1.0),
        }
    }

    /// Two grays.
    pub fn mono() -> Self {
        Self {
            primary: Rgba::from_rgba8(203, 213, 225, 0.9),
            secondary: Rgba::from_rgba8(100, 116, 139, 0.9),
            highlight: Rgba::WHITE,
        }
    }

    /// Looks up a named palette.
    pub fn from_name(name: &str) -> Result<Self, FieldError> {
        match name {
            "docs" => Ok(Self::docs()),
            "sunset" => Ok(Self::sunset()),
            "mono" => Ok(Self::mono()),
            other => Err(FieldError::UnknownPalette(other.to_string())),
        }
    }

    /// All palette names accepted by [`from_name`](Self::from_name).
    pub fn list_names() -> &'static [&'static str] {
        PALETTE_NAMES
    }

    /// Picks one of the two particle colors with equal probability.
    pub fn pick(&self, rng: &mut Xorshift64) -> Rgba {
        if rng.next_f64() > 0.5 {
            self.primary
        } else {
            self.secondary
        }
    }
}

impl Default for ParticlePalette {
    fn default() -> Self {
        Self::docs()
    }
}
