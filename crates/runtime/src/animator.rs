//! The mounted animation loop.
//!
//! An [`Animator`] owns one animation, the surface it draws on, and the host
//! that schedules its callbacks. The host turns every callback and input into
//! a [`HostEvent`] and passes it to [`Animator::handle`]; nothing else mutates
//! the loop. Dropping the animator cancels whatever the host still has
//! scheduled.

use ambient_field_core::{Animation, FieldError, StepOutcome, Surface};
use glam::DVec2;
use tracing::{debug, info, warn};

use crate::config::LoopConfig;
use crate::events::HostEvent;
use crate::heartbeat::Heartbeat;
use crate::host::Host;
use crate::state::{AnimationState, LoopStats, RunState};
use crate::watchdog::{Verdict, Watchdog};

pub struct Animator<A, S, H>
where
    A: Animation,
    S: Surface,
    H: Host,
{
    animation: A,
    surface: S,
    host: H,
    config: LoopConfig,
    watchdog: Watchdog,
    state: AnimationState,
    stats: LoopStats,
    mounted: bool,
}

impl<A, S, H> Animator<A, S, H>
where
    A: Animation,
    S: Surface,
    H: Host,
{
    /// Builds a stopped, unmounted animator.
    pub fn new(animation: A, surface: S, host: H, config: LoopConfig) -> Self {
        Self {
            animation,
            surface,
            host,
            watchdog: Watchdog::new(config.stall_threshold_ms),
            config,
            state: AnimationState::default(),
            stats: LoopStats::default(),
            mounted: false,
        }
    }

    /// Arms the watchdog interval and starts the loop.
    ///
    /// Mounting twice only restarts; the interval is armed once.
    pub fn mount(&mut self) {
        if !self.mounted {
            self.mounted = true;
            match self.host.start_interval(self.config.watchdog_period_ms) {
                Ok(handle) => self.state.watchdog = Some(handle),
                Err(e) => self.record_host_error("watchdog interval", &e),
            }
        }
        self.start();
    }

    /// (Re)starts the loop from scratch.
    ///
    /// Cancels any pending frame and resume timer, re-measures the surface,
    /// reseeds the animation, resets the heartbeat and requests a frame.
    /// Safe to call in any state.
    pub fn start(&mut self) {
        self.cancel_frame();
        if let Some(handle) = self.state.resume.take() {
            self.host.cancel_resume(handle);
        }
        self.surface.sync_size();
        self.animation.initialize(&self.surface);
        self.state.heartbeat.beat(self.host.now());
        self.state.run_state = RunState::Running;
        self.stats.starts += 1;
        let size = self.surface.size();
        info!(width = size.width, height = size.height, "animation started");
        self.request_frame();
    }

    /// Stops the loop, cancelling the pending frame. The watchdog stays armed.
    pub fn stop(&mut self) {
        self.cancel_frame();
        if self.state.run_state == RunState::Running {
            debug!("animation stopped");
        }
        self.state.run_state = RunState::Stopped;
    }

    /// Dispatches one host event.
    pub fn handle(&mut self, event: HostEvent) {
        match event {
            HostEvent::Frame { timestamp } => self.on_frame(timestamp),
            HostEvent::WatchdogTick { now } => self.on_watchdog(now),
            HostEvent::ResumeTimer => {
                self.state.resume = None;
                self.resume();
            }
            HostEvent::PointerMoved { x, y } | HostEvent::TouchMoved { x, y } => {
                self.animation.set_pointer(Some(DVec2::new(x, y)));
            }
            HostEvent::PointerLeft | HostEvent::TouchEnded => self.animation.set_pointer(None),
            HostEvent::Resized => {
                self.surface.sync_size();
                self.animation.initialize(&self.surface);
            }
            HostEvent::VisibilityChanged { hidden: true } => {
                if let Some(handle) = self.state.resume.take() {
                    self.host.cancel_resume(handle);
                }
                self.stop();
            }
            HostEvent::VisibilityChanged { hidden: false } => self.schedule_resume(),
            HostEvent::FocusGained => {
                if self.state.run_state == RunState::Stopped {
                    self.start();
                }
            }
        }
    }

    /// Cancels every outstanding host handle and stops. Idempotent; also run on drop.
    pub fn teardown(&mut self) {
        let had_handles = self.state.frame.is_some()
            || self.state.watchdog.is_some()
            || self.state.resume.is_some();
        self.cancel_frame();
        if let Some(handle) = self.state.watchdog.take() {
            self.host.clear_interval(handle);
        }
        if let Some(handle) = self.state.resume.take() {
            self.host.cancel_resume(handle);
        }
        self.state.run_state = RunState::Stopped;
        self.mounted = false;
        if had_handles {
            debug!("animator torn down");
        }
    }

    pub fn run_state(&self) -> RunState {
        self.state.run_state
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn heartbeat(&self) -> Heartbeat {
        self.state.heartbeat
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn animation(&self) -> &A {
        &self.animation
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    fn on_frame(&mut self, timestamp: f64) {
        // A frame that was cancelled after the host queued it.
        if self.state.run_state != RunState::Running {
            return;
        }
        self.state.frame = None;
        // Next frame first, so a failing step can never end the loop.
        self.request_frame();

        let delta = self.state.heartbeat.age(timestamp);
        self.state.heartbeat.beat(timestamp);
        match self.animation.step(delta) {
            StepOutcome::Skipped => {
                self.stats.frames_skipped += 1;
                debug!(delta_ms = delta, "frame skipped");
            }
            StepOutcome::Advanced { .. } => match self.animation.draw(&mut self.surface) {
                Ok(()) => self.stats.frames_drawn += 1,
                Err(e) => {
                    self.stats.frame_errors += 1;
                    warn!(error = %e, "frame failed, continuing");
                }
            },
        }
    }

    fn on_watchdog(&mut self, now: f64) {
        let verdict = self
            .watchdog
            .inspect(self.state.run_state, &self.state.heartbeat, now);
        if let Verdict::Stalled { silent_for_ms } = verdict {
            warn!(silent_for_ms, "animation stalled, restarting");
            self.stats.watchdog_restarts += 1;
            self.start();
        }
    }

    fn schedule_resume(&mut self) {
        if let Some(handle) = self.state.resume.take() {
            self.host.cancel_resume(handle);
        }
        match self.host.schedule_resume(self.config.resume_delay_ms) {
            Ok(handle) => self.state.resume = Some(handle),
            Err(e) => {
                self.record_host_error("resume timer", &e);
                self.resume();
            }
        }
    }

    /// Starts the loop unless something else already restarted it.
    fn resume(&mut self) {
        if self.state.run_state == RunState::Stopped {
            self.start();
        }
    }

    fn request_frame(&mut self) {
        match self.host.request_frame() {
            Ok(handle) => self.state.frame = Some(handle),
            Err(e) => self.record_host_error("frame request", &e),
        }
    }

    fn cancel_frame(&mut self) {
        if let Some(handle) = self.state.frame.take() {
            self.host.cancel_frame(handle);
        }
    }

    fn record_host_error(&mut self, what: &str, error: &FieldError) {
        self.stats.host_errors += 1;
        warn!(error = %error, "{what} failed");
    }
}

impl<A, S, H> Drop for Animator<A, S, H>
where
    A: Animation,
    S: Surface,
    H: Host,
{
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FrameHandle, TimerHandle};
    use ambient_field_core::{FieldConfig, ParticleField, RecordingSurface};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Calls the animator made on its host, in order.
    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        RequestFrame(u64),
        CancelFrame(u64),
        StartInterval(f64),
        ClearInterval(u64),
        ScheduleResume(f64),
        CancelResume(u64),
    }

    /// Host with a settable clock that logs every call into a shared list.
    struct ScriptedHost {
        now: Rc<RefCell<f64>>,
        calls: Rc<RefCell<Vec<Call>>>,
        next: u64,
        refuse_frames: bool,
    }

    impl Host for ScriptedHost {
        fn now(&self) -> f64 {
            *self.now.borrow()
        }

        fn request_frame(&mut self) -> Result<FrameHandle, FieldError> {
            if self.refuse_frames {
                return Err(FieldError::Host("no frames".into()));
            }
            self.next += 1;
            self.calls.borrow_mut().push(Call::RequestFrame(self.next));
            Ok(FrameHandle(self.next))
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.calls.borrow_mut().push(Call::CancelFrame(handle.0));
        }

        fn start_interval(&mut self, period_ms: f64) -> Result<TimerHandle, FieldError> {
            self.next += 1;
            self.calls.borrow_mut().push(Call::StartInterval(period_ms));
            Ok(TimerHandle(self.next))
        }

        fn clear_interval(&mut self, handle: TimerHandle) {
            self.calls.borrow_mut().push(Call::ClearInterval(handle.0));
        }

        fn schedule_resume(&mut self, delay_ms: f64) -> Result<TimerHandle, FieldError> {
            self.next += 1;
            self.calls.borrow_mut().push(Call::ScheduleResume(delay_ms));
            Ok(TimerHandle(self.next))
        }

        fn cancel_resume(&mut self, handle: TimerHandle) {
            self.calls.borrow_mut().push(Call::CancelResume(handle.0));
        }
    }

    /// Surface whose draws fail on demand.
    struct FlakySurface {
        inner: RecordingSurface,
        fail: bool,
    }

    impl Surface for FlakySurface {
        fn size(&self) -> ambient_field_core::Size {
            self.inner.size()
        }

        fn clear(&mut self) -> Result<(), FieldError> {
            if self.fail {
                return Err(FieldError::Surface("context lost".into()));
            }
            self.inner.clear()
        }

        fn fill_disc(
            &mut self,
            center: DVec2,
            radius: f64,
            color: ambient_field_core::Rgba,
        ) -> Result<(), FieldError> {
            self.inner.fill_disc(center, radius, color)
        }

        fn stroke_line(
            &mut self,
            from: DVec2,
            to: DVec2,
            width: f64,
            color: ambient_field_core::Rgba,
        ) -> Result<(), FieldError> {
            self.inner.stroke_line(from, to, width, color)
        }
    }

    type TestAnimator = Animator<ParticleField, RecordingSurface, ScriptedHost>;

    struct Harness {
        now: Rc<RefCell<f64>>,
        calls: Rc<RefCell<Vec<Call>>>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                now: Rc::new(RefCell::new(0.0)),
                calls: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn host(&self) -> ScriptedHost {
            ScriptedHost {
                now: Rc::clone(&self.now),
                calls: Rc::clone(&self.calls),
                next: 0,
                refuse_frames: false,
            }
        }

        fn animator(&self) -> TestAnimator {
            Animator::new(
                ParticleField::new(FieldConfig::default(), 7),
                RecordingSurface::new(400.0, 300.0),
                self.host(),
                LoopConfig::default(),
            )
        }

        fn set_now(&self, now: f64) {
            *self.now.borrow_mut() = now;
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls.borrow().iter().filter(|c| pred(c)).count()
        }
    }

    // -- mount / start / stop --

    #[test]
    fn mount_arms_watchdog_and_requests_first_frame() {
        let h = Harness::new();
        let mut a = h.animator();
        assert_eq!(a.run_state(), RunState::Stopped);
        a.mount();
        assert_eq!(a.run_state(), RunState::Running);
        assert!(a.is_mounted());
        assert_eq!(
            h.calls(),
            vec![Call::StartInterval(1000.0), Call::RequestFrame(2)]
        );
        assert_eq!(a.animation().particles().len(), 50);
    }

    #[test]
    fn mounting_twice_arms_one_interval() {
        let h = Harness::new();
        let mut a = h.animator();
        a.mount();
        a.mount();
        assert_eq!(h.count(|c| matches!(c, Call::StartInterval(_))), 1);
        assert_eq!(a.stats().starts, 2);
    }

    #[test]
    fn start_cancels_pending_frame_before_requesting_new_one() {
        let h = Harness::new();
        let mut a = h.animator();
        a.mount();
        a.start();
        assert_eq!(
            h.calls()[1..],
            [Call::RequestFrame(2), Call::CancelFrame(2), Call::RequestFrame(3)]
        );
    }

    #[test]
    fn stop_cancels_frame_and_ignores_late_frames() {
        let h = Harness::new();
        let mut a = h.animator();
        a.mount();
        a.stop();
        assert_eq!(a.run_state(), RunState::Stopped);
        assert!(h.calls().contains(&Call::CancelFrame(2)));
        let requests = h.count(|c| matches!(c, Call::RequestFrame(_)));
        a.handle(HostEvent::Frame { timestamp: 16.0 });
        assert_eq!(h.count(|c| matches!(c, Call::RequestFrame(_))), requests);
        assert_eq!(a.stats().frames_drawn, 0);
    }

    // -- frames --

    #[test]
    fn frame_requests_next_then_steps_and_draws() {
        let h = Harness::new();
        let mut a = h.animator();
        a.mount();
        a.handle(HostEvent::Frame { timestamp: 16.0 });
        assert_eq!(h.calls().last(), Some(&Call::RequestFrame(3)));
        assert_eq!(a.heartbeat().last(), 16.0);
        assert_eq!(a.stats().frames_drawn, 1);
        assert_eq!(a.surface().disc_count(), 200);
    }

    #[test]
    fn long_gap_skips_frame_but_keeps_loop_alive() {
        let h = Harness::new();
        let mut a = h.animator();
        a.mount();
        let before = a.animation().particles().to_vec();
        a.handle(HostEvent::Frame { timestamp: 500.0 });
        assert_eq!(a.stats().frames_skipped, 1);
        assert_eq!(a.stats().frames_drawn, 0);
        assert_eq!(a.animation().particles(), before.as_slice());
        assert_eq!(a.heartbeat().last(), 500.0);
        assert_eq!(h.calls().last(), Some(&Call::RequestFrame(3)));
    }

    #[test]
    fn draw_failure_is_counted_and_loop_continues() {
        let h = Harness::new();
        let mut a = Animator::new(
            ParticleField::new(FieldConfig::default(), 7),
            FlakySurface {
                inner: RecordingSurface::new(400.0, 300.0),
                fail: true,
            },
            h.host(),
            LoopConfig::default(),
        );
        a.mount();
        a.handle(HostEvent::Frame { timestamp: 16.0 });
        a.handle(HostEvent::Frame { timestamp: 32.0 });
        assert_eq!(a.stats().frame_errors, 2);
        assert_eq!(a.run_state(), RunState::Running);
        assert_eq!(h.count(|c| matches!(c, Call::RequestFrame(_))), 3);
    }

    #[test]
    fn refused_frame_request_is_counted() {
        let h = Harness::new();
        let mut host = h.host();
        host.refuse_frames = true;
        let mut a = Animator::new(
            ParticleField::new(FieldConfig::default(), 7),
            RecordingSurface::new(400.0, 300.0),
            host,
            LoopConfig::default(),
        );
        a.mount();
        assert_eq!(a.stats().host_errors, 1);
        assert_eq!(a.run_state(), RunState::Running);
    }

    // -- watchdog --

    #[test]
    fn stall_triggers_restart_with_fresh_particles_and_heartbeat() {
        let h = Harness::new();
        let mut a = h.animator();
        a.mount();
        a.handle(HostEvent::Frame { timestamp: 16.0 });
        let before = a.animation().particles().to_vec();

        h.set_now(2100.0);
        a.handle(HostEvent::WatchdogTick { now: 2100.0 });
        assert_eq!(a.stats().watchdog_restarts, 1);
        assert_eq!(a.heartbeat().last(), 2100.0);
        assert_ne!(a.animation().particles(), before.as_slice());
        // The pending frame from the stalled loop is cancelled and replaced.
        let calls = h.calls();
        assert_eq!(calls[calls.len() - 2..], [Call::CancelFrame(3), Call::RequestFrame(4)]);
    }

    #[test]
    fn healthy_loop_is_left_alone() {
        let h = Harness::new();
        let mut a = h.animator();
        a.mount();
        a.handle(HostEvent::Frame { timestamp: 1000.0 });
        a.handle(HostEvent::WatchdogTick { now: 3000.0 });
        assert_eq!(a.stats().watchdog_restarts, 0);
    }

    #[test]
    fn stopped_loop_is_not_restarted_by_watchdog() {
        let h = Harness::new();
        let mut a = h.animator();
        a.mount();
        a.handle(HostEvent::VisibilityChanged { hidden: true });
        a.handle(HostEvent::WatchdogTick { now: 10_000.0 });
        assert_eq!(a.run_state(), RunState::Stopped);
        assert_eq!(a.stats().watchdog_restarts, 0);
    }

    // -- input --

    #[test]
    fn pointer_and_touch_update_the_animation() {
        let h = Harness::new();
        let mut a = h.animator();
        a.mount();
        a.handle(HostEvent::PointerMoved { x: 10.0, y: 20.0 });
        assert_eq!(a.animation().pointer(), Some(DVec2::new(10.0, 20.0)));
        a.handle(HostEvent::PointerLeft);
        assert_eq!(a.animation().pointer(), None);
        a.handle(HostEvent::TouchMoved { x: 5.0, y: 6.0 });
        assert_eq!(a.animation().pointer(), Some(DVec2::new(5.0, 6.0)));
        a.handle(HostEvent::TouchEnded);
        assert_eq!(a.animation().pointer(), None);
    }

    #[test]
    fn resize_reseeds_for_new_surface_size() {
        let h = Harness::new();
        let mut a = h.animator();
        a.mount();
        a.surface.set_size(2400.0, 1000.0);
        a.handle(HostEvent::Resized);
        assert_eq!(a.animation().particles().len(), 200);
        assert_eq!(a.animation().bounds(), ambient_field_core::Size::new(2400.0, 1000.0));
    }

    // -- visibility and focus --

    #[test]
    fn visible_again_restarts_after_resume_delay() {
        let h = Harness::new();
        let mut a = h.animator();
        a.mount();
        a.handle(HostEvent::VisibilityChanged { hidden: true });
        assert_eq!(a.run_state(), RunState::Stopped);
        a.handle(HostEvent::VisibilityChanged { hidden: false });
        assert_eq!(a.run_state(), RunState::Stopped);
        assert_eq!(h.calls().last(), Some(&Call::ScheduleResume(100.0)));
        a.handle(HostEvent::ResumeTimer);
        assert_eq!(a.run_state(), RunState::Running);
        assert_eq!(a.stats().starts, 2);
    }

    #[test]
    fn resume_leaves_a_loop_started_by_focus_alone() {
        let h = Harness::new();
        let mut a = h.animator();
        a.mount();
        a.handle(HostEvent::VisibilityChanged { hidden: true });
        a.handle(HostEvent::FocusGained);
        let particles = a.animation().particles().to_vec();
        a.handle(HostEvent::VisibilityChanged { hidden: false });
        a.handle(HostEvent::ResumeTimer);
        assert_eq!(a.run_state(), RunState::Running);
        assert_eq!(a.stats().starts, 2);
        assert_eq!(a.animation().particles(), particles.as_slice());
    }

    #[test]
    fn hiding_again_cancels_pending_resume() {
        let h = Harness::new();
        let mut a = h.animator();
        a.mount();
        a.handle(HostEvent::VisibilityChanged { hidden: true });
        a.handle(HostEvent::VisibilityChanged { hidden: false });
        a.handle(HostEvent::VisibilityChanged { hidden: true });
        assert_eq!(h.count(|c| matches!(c, Call::CancelResume(_))), 1);
    }

    #[test]
    fn focus_starts_only_when_stopped() {
        let h = Harness::new();
        let mut a = h.animator();
        a.mount();
        a.handle(HostEvent::FocusGained);
        assert_eq!(a.stats().starts, 1);
        a.stop();
        a.handle(HostEvent::FocusGained);
        assert_eq!(a.stats().starts, 2);
        assert_eq!(a.run_state(), RunState::Running);
    }

    // -- teardown --

    #[test]
    fn drop_cancels_every_pending_handle_once() {
        let h = Harness::new();
        {
            let mut a = h.animator();
            a.mount();
            a.handle(HostEvent::VisibilityChanged { hidden: false });
            a.teardown();
            a.teardown();
        }
        assert_eq!(h.count(|c| matches!(c, Call::CancelFrame(_))), 1);
        assert_eq!(h.count(|c| matches!(c, Call::ClearInterval(_))), 1);
        assert_eq!(h.count(|c| matches!(c, Call::CancelResume(_))), 1);
    }

    #[test]
    fn drop_without_teardown_still_cleans_up() {
        let h = Harness::new();
        {
            let mut a = h.animator();
            a.mount();
        }
        assert!(h.calls().contains(&Call::ClearInterval(1)));
        assert!(h.calls().contains(&Call::CancelFrame(2)));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn event() -> impl Strategy<Value = HostEvent> {
            prop_oneof![
                (1.0_f64..300.0).prop_map(|dt| HostEvent::Frame { timestamp: dt }),
                (0.0_f64..5000.0).prop_map(|dt| HostEvent::WatchdogTick { now: dt }),
                Just(HostEvent::ResumeTimer),
                (0.0_f64..400.0, 0.0_f64..300.0).prop_map(|(x, y)| HostEvent::PointerMoved { x, y }),
                Just(HostEvent::PointerLeft),
                Just(HostEvent::Resized),
                any::<bool>().prop_map(|hidden| HostEvent::VisibilityChanged { hidden }),
                Just(HostEvent::FocusGained),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            /// Timestamps in generated events are offsets from the previous
            /// clock value, so time only moves forward.
            #[test]
            fn at_most_one_frame_pending_and_running_implies_frame(
                events in prop::collection::vec(event(), 1..40),
            ) {
                let h = Harness::new();
                let mut a = h.animator();
                a.mount();
                let mut clock = 0.0;
                for event in events {
                    let event = match event {
                        HostEvent::Frame { timestamp } => {
                            clock += timestamp;
                            HostEvent::Frame { timestamp: clock }
                        }
                        HostEvent::WatchdogTick { now } => {
                            clock += now;
                            HostEvent::WatchdogTick { now: clock }
                        }
                        other => other,
                    };
                    h.set_now(clock);
                    a.handle(event);
                    prop_assert_eq!(
                        a.run_state() == RunState::Running,
                        a.state.frame.is_some()
                    );
                }
                let requested = h.count(|c| matches!(c, Call::RequestFrame(_)));
                let cancelled = h.count(|c| matches!(c, Call::CancelFrame(_)));
                let pending = usize::from(a.state.frame.is_some());
                prop_assert!(cancelled + pending <= requested);
            }
        }
    }
}
