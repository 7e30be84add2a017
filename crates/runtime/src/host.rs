//! Scheduling primitives supplied by whoever embeds the animator.
//!
//! In a browser these are `requestAnimationFrame`, `setInterval` and
//! `setTimeout`; the CLI implements them with channel tickers. Scheduled
//! callbacks come back to the animator as [`HostEvent`](crate::HostEvent)s.

use ambient_field_core::FieldError;

/// Identifies a requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Identifies an interval or one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

pub trait Host {
    /// Monotonic milliseconds.
    fn now(&self) -> f64;

    /// Asks for one `HostEvent::Frame` at the next display refresh.
    fn request_frame(&mut self) -> Result<FrameHandle, FieldError>;

    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Starts delivering `HostEvent::WatchdogTick` every `period_ms`.
    fn start_interval(&mut self, period_ms: f64) -> Result<TimerHandle, FieldError>;

    fn clear_interval(&mut self, handle: TimerHandle);

    /// Delivers one `HostEvent::ResumeTimer` after `delay_ms`.
    fn schedule_resume(&mut self, delay_ms: f64) -> Result<TimerHandle, FieldError>;

    fn cancel_resume(&mut self, handle: TimerHandle);
}
