//! Translucent colors for particles and links.
//!
//! [`Rgba`] stores sRGB components and straight (non-premultiplied) alpha as
//! `f64` in [0, 1]. It parses and prints the CSS notations a canvas 2D
//! context accepts, so the same value can be handed to a browser fill style
//! or to the CPU rasterizer.

use crate::error::FieldError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// sRGB color with straight alpha, all components in [0, 1].
///
/// Serializes as a CSS string `"rgba(r, g, b, a)"` with 8-bit color channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    /// Opaque white.
    pub const WHITE: Rgba = Rgba {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    /// Builds a color from 8-bit channels and an alpha in [0, 1].
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Parses `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` or `rgba(r, g, b, a)`.
    ///
    /// Channels in the functional forms are 0-255; alpha is 0-1.
    pub fn parse(input: &str) -> Result<Self, FieldError> {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::from_hex(hex);
        }
        if let Some(body) = s.strip_prefix("rgba(").and_then(|b| b.strip_suffix(')')) {
            return Self::from_channels(input, body, true);
        }
        if let Some(body) = s.strip_prefix("rgb(").and_then(|b| b.strip_suffix(')')) {
            return Self::from_channels(input, body, false);
        }
        Err(FieldError::InvalidColor(format!(
            "unrecognized color syntax: {input:?}"
        )))
    }

    fn from_hex(hex: &str) -> Result<Self, FieldError> {
        if hex.len() != 6 && hex.len() != 8 {
            return Err(FieldError::InvalidColor(format!(
                "expected 6 or 8 hex digits, got {}",
                hex.len()
            )));
        }
        let byte = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| FieldError::InvalidColor(format!("invalid hex digits in #{hex}")))
        };
        let alpha = if hex.len() == 8 {
            byte(6)? as f64 / 255.0
        } else {
            1.0
        };
        Ok(Self::from_rgba8(byte(0)?, byte(2)?, byte(4)?, alpha))
    }

    fn from_channels(input: &str, body: &str, with_alpha: bool) -> Result<Self, FieldError> {
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let expected = if with_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return Err(FieldError::InvalidColor(format!(
                "expected {expected} components in {input:?}"
            )));
        }
        let number = |s: &str| {
            s.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| FieldError::InvalidColor(format!("bad component {s:?} in {input:?}")))
        };
        let channel = |s: &str| -> Result<f64, FieldError> {
            let v = number(s)?;
            if !(0.0..=255.0).contains(&v) {
                return Err(FieldError::InvalidColor(format!(
                    "channel {v} out of 0-255 in {input:?}"
                )));
            }
            Ok(v / 255.0)
        };
        let a = if with_alpha {
            let a = number(parts[3])?;
            if !(0.0..=1.0).contains(&a) {
                return Err(FieldError::InvalidColor(format!(
                    "alpha {a} out of 0-1 in {input:?}"
                )));
            }
            a
        } else {
            1.0
        };
        Ok(Self {
            r: channel(parts[0])?,
            g: channel(parts[1])?,
            b: channel(parts[2])?,
            a,
        })
    }

    /// Returns the same color with alpha replaced, clamped to [0, 1].
    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Returns the same color with alpha multiplied by `factor`.
    ///
    /// Equivalent to drawing with a canvas `globalAlpha` of `factor`.
    pub fn fade(self, factor: f64) -> Self {
        self.with_alpha(self.a * factor)
    }

    /// Quantizes to four bytes, alpha scaled to 0-255.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Formats as a CSS `rgba(...)` string usable as a canvas fill or stroke style.
    pub fn to_css(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({r}, {g}, {b}, {})", format_alpha(self.a))
    }
}

/// Prints alpha with at most three decimals and no trailing zeros.
fn format_alpha(a: f64) -> String {
    let fixed = format!("{:.3}", a.clamp(0.0, 1.0));
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgba::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    // -- Parsing --

    #[test]
    fn parses_css_rgba() {
        let c = Rgba::parse("rgba(16, 185, 129, 0.9)").unwrap();
        assert!(approx_eq(c.r, 16.0 / 255.0));
        assert!(approx_eq(c.g, 185.0 / 255.0));
        assert!(approx_eq(c.b, 129.0 / 255.0));
        assert!(approx_eq(c.a, 0.9));
    }

    #[test]
    fn parses_css_rgb_as_opaque() {
        let c = Rgba::parse("rgb(255,255,255)").unwrap();
        assert_eq!(c, Rgba::WHITE);
    }

    #[test]
    fn parses_hex_with_and_without_alpha() {
        let opaque = Rgba::parse("#3b82f6").unwrap();
        assert_eq!(opaque.to_rgba8(), [59, 130, 246, 255]);
        let translucent = Rgba::parse("#3b82f680").unwrap();
        assert_eq!(translucent.to_rgba8(), [59, 130, 246, 128]);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(Rgba::parse("").is_err());
        assert!(Rgba::parse("#fff").is_err());
        assert!(Rgba::parse("#gggggg").is_err());
        assert!(Rgba::parse("rgba(1, 2, 3)").is_err());
        assert!(Rgba::parse("rgba(1, 2, 3, 1.5)").is_err());
        assert!(Rgba::parse("rgb(300, 0, 0)").is_err());
        assert!(Rgba::parse("hsl(0, 50%, 50%)").is_err());
    }

    // -- Alpha helpers --

    #[test]
    fn fade_multiplies_alpha() {
        let c = Rgba::from_rgba8(16, 185, 129, 0.9).fade(0.1);
        assert!(approx_eq(c.a, 0.09));
    }

    #[test]
    fn with_alpha_clamps() {
        assert_eq!(Rgba::WHITE.with_alpha(2.0).a, 1.0);
        assert_eq!(Rgba::WHITE.with_alpha(-1.0).a, 0.0);
    }

    // -- CSS output --

    #[test]
    fn to_css_matches_canvas_notation() {
        let c = Rgba::from_rgba8(59, 130, 246, 0.9);
        assert_eq!(c.to_css(), "rgba(59, 130, 246, 0.9)");
        assert_eq!(Rgba::WHITE.to_css(), "rgba(255, 255, 255, 1)");
        assert_eq!(Rgba::TRANSPARENT.to_css(), "rgba(0, 0, 0, 0)");
    }

    #[test]
    fn to_css_limits_alpha_precision() {
        let c = Rgba::WHITE.with_alpha(0.2 - 70.0 / 1200.0);
        assert_eq!(c.to_css(), "rgba(255, 255, 255, 0.142)");
    }

    // -- Serde --

    #[test]
    fn serializes_as_css_string() {
        let json = serde_json::to_string(&Rgba::from_rgba8(16, 185, 129, 0.9)).unwrap();
        assert_eq!(json, "\"rgba(16, 185, 129, 0.9)\"");
    }

    #[test]
    fn deserialize_rejects_invalid_color() {
        let result: Result<Rgba, _> = serde_json::from_str("\"not-a-color\"");
        assert!(result.is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn css_output_parses_back_to_same_bytes(
                r: u8,
                g: u8,
                b: u8,
                a in 0.0_f64..=1.0,
            ) {
                let original = Rgba::from_rgba8(r, g, b, a);
                let parsed = Rgba::parse(&original.to_css()).unwrap();
                let [pr, pg, pb, _] = parsed.to_rgba8();
                prop_assert_eq!((pr, pg, pb), (r, g, b));
                prop_assert!((parsed.a - original.a).abs() <= 0.0005 + 1e-12);
            }
        }
    }
}
