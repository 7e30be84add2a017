//! Liveness supervisor for the frame loop.
//!
//! The frame callback beats a [`Heartbeat`]; the watchdog runs on its own
//! interval and compares the heartbeat age against a threshold. It never acts
//! by itself: it returns a [`Verdict`] and the animator decides what to do.

use serde::Serialize;

use crate::heartbeat::Heartbeat;
use crate::state::RunState;

/// Outcome of one watchdog inspection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// The loop is stopped on purpose; nothing to supervise.
    Idle,
    Healthy,
    /// Running, but no frame for longer than the threshold.
    Stalled { silent_for_ms: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Watchdog {
    stall_threshold_ms: f64,
}

impl Watchdog {
    pub fn new(stall_threshold_ms: f64) -> Self {
        Self { stall_threshold_ms }
    }

    pub fn stall_threshold_ms(&self) -> f64 {
        self.stall_threshold_ms
    }

    /// A running loop whose heartbeat is strictly older than the threshold is stalled.
    pub fn inspect(&self, run_state: RunState, heartbeat: &Heartbeat, now: f64) -> Verdict {
        if run_state == RunState::Stopped {
            return Verdict::Idle;
        }
        let silent_for_ms = heartbeat.age(now);
        if silent_for_ms > self.stall_threshold_ms {
            Verdict::Stalled { silent_for_ms }
        } else {
            Verdict::Healthy
        }
    }
}
