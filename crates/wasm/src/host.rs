//! Browser scheduling for the animator.
//!
//! `WebHost` owns one closure per callback kind and hands the same closure to
//! `requestAnimationFrame`, `setInterval` or `setTimeout` every time. Each
//! closure holds a `Weak` to the cell that owns the animator, so a callback
//! that fires after teardown finds nothing and returns.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ambient_field_core::{FieldError, ParticleField};
use ambient_field_runtime::{Animator, FrameHandle, Host, HostEvent, TimerHandle};
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Performance, Window};

use crate::canvas::CanvasSurface;

pub type WebAnimator = Animator<ParticleField, CanvasSurface, WebHost>;

/// The mounted animator, `None` once torn down.
pub type Shared = Rc<RefCell<Option<WebAnimator>>>;

/// Delivers `event` to the animator behind `cell`, if it is still mounted.
pub fn dispatch(cell: &Weak<RefCell<Option<WebAnimator>>>, event: HostEvent) {
    let Some(cell) = cell.upgrade() else {
        return;
    };
    let Ok(mut slot) = cell.try_borrow_mut() else {
        warn!(?event, "animator busy, event dropped");
        return;
    };
    if let Some(animator) = slot.as_mut() {
        animator.handle(event);
    }
}

fn host_error(op: &str, e: JsValue) -> FieldError {
    FieldError::Host(format!("{op}: {e:?}"))
}

/// Unwraps a browser API the loop cannot run without.
fn required<T>(api: Option<T>, name: &str) -> Result<T, FieldError> {
    api.ok_or_else(|| FieldError::Host(format!("{name} is not available")))
}

pub struct WebHost {
    window: Window,
    performance: Performance,
    on_frame: Closure<dyn FnMut(f64)>,
    on_watchdog: Closure<dyn FnMut()>,
    on_resume: Closure<dyn FnMut()>,
}

impl WebHost {
    /// Frame timestamps and watchdog ticks both read `performance.now()`,
    /// so a window without `Performance` is refused.
    pub fn new(
        window: Window,
        cell: Weak<RefCell<Option<WebAnimator>>>,
    ) -> Result<Self, FieldError> {
        let performance = required(window.performance(), "window.performance")?;

        let on_frame = {
            let cell = cell.clone();
            Closure::wrap(Box::new(move |timestamp: f64| {
                dispatch(&cell, HostEvent::Frame { timestamp });
            }) as Box<dyn FnMut(f64)>)
        };
        let on_watchdog = {
            let cell = cell.clone();
            let performance = performance.clone();
            Closure::wrap(Box::new(move || {
                let now = performance.now();
                dispatch(&cell, HostEvent::WatchdogTick { now });
            }) as Box<dyn FnMut()>)
        };
        let on_resume = Closure::wrap(Box::new(move || {
            dispatch(&cell, HostEvent::ResumeTimer);
        }) as Box<dyn FnMut()>);

        Ok(Self {
            window,
            performance,
            on_frame,
            on_watchdog,
            on_resume,
        })
    }
}

impl Host for WebHost {
    fn now(&self) -> f64 {
        self.performance.now()
    }

    fn request_frame(&mut self) -> Result<FrameHandle, FieldError> {
        self.window
            .request_animation_frame(self.on_frame.as_ref().unchecked_ref())
            .map(|id| FrameHandle(id as u64))
            .map_err(|e| host_error("requestAnimationFrame", e))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(e) = self.window.cancel_animation_frame(handle.0 as i32) {
            warn!(error = ?e, "cancelAnimationFrame failed");
        }
    }

    fn start_interval(&mut self, period_ms: f64) -> Result<TimerHandle, FieldError> {
        self.window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                self.on_watchdog.as_ref().unchecked_ref(),
                period_ms.round() as i32,
            )
            .map(|id| TimerHandle(id as u64))
            .map_err(|e| host_error("setInterval", e))
    }

    fn clear_interval(&mut self, handle: TimerHandle) {
        self.window.clear_interval_with_handle(handle.0 as i32);
    }

    fn schedule_resume(&mut self, delay_ms: f64) -> Result<TimerHandle, FieldError> {
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                self.on_resume.as_ref().unchecked_ref(),
                delay_ms.round() as i32,
            )
            .map(|id| TimerHandle(id as u64))
            .map_err(|e| host_error("setTimeout", e))
    }

    fn cancel_resume(&mut self, handle: TimerHandle) {
        self.window.clear_timeout_with_handle(handle.0 as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_browser_api_is_a_host_error() {
        let err = required(None::<u32>, "window.performance").unwrap_err();
        assert!(matches!(err, FieldError::Host(_)));
        assert_eq!(err.to_string(), "host error: window.performance is not available");
        assert_eq!(required(Some(3), "window.performance").unwrap(), 3);
    }
}
