//! Timing settings for the frame loop supervisor.

use ambient_field_core::params::param_f64;
use ambient_field_core::FieldError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const DEFAULT_WATCHDOG_PERIOD_MS: f64 = 1000.0;
const DEFAULT_STALL_THRESHOLD_MS: f64 = 2000.0;
const DEFAULT_RESUME_DELAY_MS: f64 = 100.0;

/// How often the watchdog looks, how long a silence counts as a stall, and
/// how long to wait after the page becomes visible before restarting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    pub watchdog_period_ms: f64,
    pub stall_threshold_ms: f64,
    pub resume_delay_ms: f64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            watchdog_period_ms: DEFAULT_WATCHDOG_PERIOD_MS,
            stall_threshold_ms: DEFAULT_STALL_THRESHOLD_MS,
            resume_delay_ms: DEFAULT_RESUME_DELAY_MS,
        }
    }
}

impl LoopConfig {
    /// Reads the three timings from a JSON object, defaulting per key.
    pub fn from_json(params: &Value) -> Result<Self, FieldError> {
        let config = Self {
            watchdog_period_ms: param_f64(params, "watchdog_period_ms", DEFAULT_WATCHDOG_PERIOD_MS),
            stall_threshold_ms: param_f64(params, "stall_threshold_ms", DEFAULT_STALL_THRESHOLD_MS),
            resume_delay_ms: param_f64(params, "resume_delay_ms", DEFAULT_RESUME_DELAY_MS),
        };
        config.validate()?;
        Ok(config)
    }

    /// Periods must be finite and positive; the resume delay may be zero.
    pub fn validate(&self) -> Result<(), FieldError> {
        for (name, value) in [
            ("watchdog_period_ms", self.watchdog_period_ms),
            ("stall_threshold_ms", self.stall_threshold_ms),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(FieldError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !self.resume_delay_ms.is_finite() || self.resume_delay_ms < 0.0 {
            return Err(FieldError::InvalidConfig(format!(
                "resume_delay_ms must be non-negative, got {}",
                self.resume_delay_ms
            )));
        }
        Ok(())
    }

    pub fn params(&self) -> Value {
        json!({
            "watchdog_period_ms": self.watchdog_period_ms,
            "stall_threshold_ms": self.stall_threshold_ms,
            "resume_delay_ms": self.resume_delay_ms,
        })
    }

    pub fn param_schema() -> Value {
        json!({
            "watchdog_period_ms": {
                "type": "number",
                "default": DEFAULT_WATCHDOG_PERIOD_MS,
                "min": 100.0,
                "max": 10_000.0,
                "description": "Interval between liveness checks (ms)"
            },
            "stall_threshold_ms": {
                "type": "number",
                "default": DEFAULT_STALL_THRESHOLD_MS,
                "min": 100.0,
                "max": 60_000.0,
                "description": "Silence after which a running loop is restarted (ms)"
            },
            "resume_delay_ms": {
                "type": "number",
                "default": DEFAULT_RESUME_DELAY_MS,
                "min": 0.0,
                "max": 5000.0,
                "description": "Delay before restarting when the page becomes visible (ms)"
            }
        })
    }
}
