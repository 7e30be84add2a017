//! A native [`Host`] backed by `crossbeam-channel` timers.
//!
//! Frames come from one-shot `after` channels at a fixed interval, the
//! watchdog from a `tick` channel, and the resume timer from another `after`.
//! Cancelling a handle drops its receiver. [`run_for`] selects over whichever
//! receivers are live and feeds the resulting events to the animator on the
//! calling thread.

use std::time::{Duration, Instant};

use ambient_field_core::{Animation, FieldError, Surface};
use ambient_field_runtime::{Animator, FrameHandle, Host, HostEvent, TimerHandle};
use crossbeam_channel::{after, never, select, tick, Receiver};
use tracing::{debug, info};

/// A window of host time during which frame requests are never answered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outage {
    pub start_ms: f64,
    pub end_ms: f64,
}

impl Outage {
    fn contains(&self, ms: f64) -> bool {
        ms >= self.start_ms && ms < self.end_ms
    }
}

pub struct HeadlessHost {
    origin: Instant,
    frame_interval: Duration,
    outage: Option<Outage>,
    next_id: u64,
    frame: Option<(FrameHandle, Receiver<Instant>)>,
    watchdog: Option<(TimerHandle, Receiver<Instant>)>,
    resume: Option<(TimerHandle, Receiver<Instant>)>,
}

fn millis(ms: f64) -> Result<Duration, FieldError> {
    Duration::try_from_secs_f64(ms / 1000.0)
        .map_err(|e| FieldError::Host(format!("invalid timer duration {ms} ms: {e}")))
}

impl HeadlessHost {
    pub fn new(frame_interval: Duration, outage: Option<Outage>) -> Self {
        Self {
            origin: Instant::now(),
            frame_interval,
            outage,
            next_id: 0,
            frame: None,
            watchdog: None,
            resume: None,
        }
    }

    /// Host milliseconds at `instant`.
    pub fn millis_at(&self, instant: Instant) -> f64 {
        instant.saturating_duration_since(self.origin).as_secs_f64() * 1000.0
    }

    fn source<H>(slot: &Option<(H, Receiver<Instant>)>) -> Receiver<Instant> {
        slot.as_ref().map_or_else(never, |(_, rx)| rx.clone())
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Host for HeadlessHost {
    fn now(&self) -> f64 {
        self.millis_at(Instant::now())
    }

    fn request_frame(&mut self) -> Result<FrameHandle, FieldError> {
        let handle = FrameHandle(self.next_id());
        let now = self.now();
        let rx = match self.outage {
            Some(outage) if outage.contains(now) => never(),
            _ => after(self.frame_interval),
        };
        self.frame = Some((handle, rx));
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.frame.as_ref().is_some_and(|(h, _)| *h == handle) {
            self.frame = None;
        }
    }

    fn start_interval(&mut self, period_ms: f64) -> Result<TimerHandle, FieldError> {
        let period = millis(period_ms)?;
        if period.is_zero() {
            return Err(FieldError::Host("interval period must be positive".into()));
        }
        let handle = TimerHandle(self.next_id());
        self.watchdog = Some((handle, tick(period)));
        Ok(handle)
    }

    fn clear_interval(&mut self, handle: TimerHandle) {
        if self.watchdog.as_ref().is_some_and(|(h, _)| *h == handle) {
            self.watchdog = None;
        }
    }

    fn schedule_resume(&mut self, delay_ms: f64) -> Result<TimerHandle, FieldError> {
        let delay = millis(delay_ms)?;
        let handle = TimerHandle(self.next_id());
        self.resume = Some((handle, after(delay)));
        Ok(handle)
    }

    fn cancel_resume(&mut self, handle: TimerHandle) {
        if self.resume.as_ref().is_some_and(|(h, _)| *h == handle) {
            self.resume = None;
        }
    }
}

/// Mounts `animator` and dispatches host events until `duration` has passed.
pub fn run_for<A, S>(animator: &mut Animator<A, S, HeadlessHost>, duration: Duration)
where
    A: Animation,
    S: Surface,
{
    let deadline = after(duration);
    animator.mount();
    info!(duration_ms = duration.as_millis() as u64, "live loop running");
    loop {
        let host = animator.host();
        let frame = HeadlessHost::source(&host.frame);
        let watchdog = HeadlessHost::source(&host.watchdog);
        let resume = HeadlessHost::source(&host.resume);
        let event = select! {
            recv(frame) -> at => Some(HostEvent::Frame {
                timestamp: at.map_or_else(|_| host.now(), |at| host.millis_at(at)),
            }),
            recv(watchdog) -> at => Some(HostEvent::WatchdogTick {
                now: at.map_or_else(|_| host.now(), |at| host.millis_at(at)),
            }),
            recv(resume) -> _ => Some(HostEvent::ResumeTimer),
            recv(deadline) -> _ => None,
        };
        let Some(event) = event else {
            break;
        };
        animator.handle(event);
    }
    debug!(stats = ?animator.stats(), "live loop finished");
}
