//! Lifecycle state owned by one mounted animator.

use serde::Serialize;

use crate::heartbeat::Heartbeat;
use crate::host::{FrameHandle, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

/// Run flag, heartbeat and every outstanding host handle.
///
/// Each handle is `Some` exactly while the host may still fire it, so
/// cancelling means `take()` followed by the host call.
#[derive(Debug, Clone, Default)]
pub struct AnimationState {
    pub run_state: RunState,
    pub heartbeat: Heartbeat,
    pub frame: Option<FrameHandle>,
    pub watchdog: Option<TimerHandle>,
    pub resume: Option<TimerHandle>,
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LoopStats {
    pub frames_drawn: u64,
    pub frames_skipped: u64,
    pub starts: u64,
    pub watchdog_restarts: u64,
    /// Frames whose draw failed; the loop kept going.
    pub frame_errors: u64,
    /// Requests the host refused (frame, interval or timer).
    pub host_errors: u64,
}
