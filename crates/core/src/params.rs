//! Helpers for reading typed settings out of a JSON object.
//!
//! The numeric and string helpers fall back to the default whenever the key
//! is missing or holds the wrong JSON type, so partial config objects work.
//! Colors are the exception: a present but unparseable color is an error,
//! since silently drawing in a default color hides the typo.

use serde_json::Value;

use crate::color::Rgba;
use crate::error::FieldError;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
///
/// JSON integers are accepted and converted.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing or wrong type.
///
/// Only non-negative integers are accepted.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Extracts a `String` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Extracts a color from `params[name]`.
///
/// Missing keys and non-string values yield `default`; a string that does
/// not parse as a color is reported as `FieldError::InvalidColor`.
pub fn param_color(params: &Value, name: &str, default: Rgba) -> Result<Rgba, FieldError> {
    match params.get(name).and_then(Value::as_str) {
        Some(s) => Rgba::parse(s)
            .map_err(|e| FieldError::InvalidColor(format!("{name}: {e}"))),
        None => Ok(default),
    }
}
