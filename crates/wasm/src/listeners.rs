//! DOM event listeners that forward input to the animator.
//!
//! Each [`Listener`] removes itself from its target when dropped, so clearing
//! the list detaches everything.

use std::cell::RefCell;
use std::rc::Weak;

use ambient_field_runtime::HostEvent;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    AddEventListenerOptions, Document, Event, EventTarget, HtmlCanvasElement, MouseEvent,
    TouchEvent, Window,
};

use crate::host::{dispatch, WebAnimator};

pub struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        kind: &'static str,
        passive: bool,
        callback: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::wrap(Box::new(callback) as Box<dyn FnMut(Event)>);
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            callback.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        // Removal only fails if the target is gone, which detaches it anyway.
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

/// Maps a DOM event to a host event; `None` ignores it.
type Translate = fn(&Event, &Document) -> Option<HostEvent>;

fn pointer_moved(event: &Event, _: &Document) -> Option<HostEvent> {
    let mouse = event.dyn_ref::<MouseEvent>()?;
    Some(HostEvent::PointerMoved {
        x: f64::from(mouse.client_x()),
        y: f64::from(mouse.client_y()),
    })
}

fn touch_moved(event: &Event, _: &Document) -> Option<HostEvent> {
    let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
    Some(HostEvent::TouchMoved {
        x: f64::from(touch.client_x()),
        y: f64::from(touch.client_y()),
    })
}

fn pointer_left(_: &Event, _: &Document) -> Option<HostEvent> {
    Some(HostEvent::PointerLeft)
}

fn touch_ended(_: &Event, _: &Document) -> Option<HostEvent> {
    Some(HostEvent::TouchEnded)
}

fn resized(_: &Event, _: &Document) -> Option<HostEvent> {
    Some(HostEvent::Resized)
}

fn focus_gained(_: &Event, _: &Document) -> Option<HostEvent> {
    Some(HostEvent::FocusGained)
}

fn visibility_changed(_: &Event, document: &Document) -> Option<HostEvent> {
    Some(HostEvent::VisibilityChanged {
        hidden: document.hidden(),
    })
}

/// Attaches pointer and touch listeners to the canvas, resize and focus to
/// the window, and visibility to the document.
pub fn attach_all(
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
    cell: Weak<RefCell<Option<WebAnimator>>>,
) -> Result<Vec<Listener>, JsValue> {
    let on_canvas: &EventTarget = canvas.as_ref();
    let on_window: &EventTarget = window.as_ref();
    let on_document: &EventTarget = document.as_ref();
    let bindings: [(&EventTarget, &'static str, bool, Translate); 8] = [
        (on_canvas, "mousemove", false, pointer_moved as Translate),
        (on_canvas, "mouseleave", false, pointer_left as Translate),
        (on_canvas, "touchmove", true, touch_moved as Translate),
        (on_canvas, "touchend", false, touch_ended as Translate),
        (on_canvas, "touchcancel", false, touch_ended as Translate),
        (on_window, "resize", false, resized as Translate),
        (on_document, "visibilitychange", false, visibility_changed as Translate),
        (on_window, "focus", false, focus_gained as Translate),
    ];

    bindings
        .into_iter()
        .map(|(target, kind, passive, translate)| {
            let cell = cell.clone();
            let document = document.clone();
            Listener::attach(target, kind, passive, move |event: Event| {
                if let Some(host_event) = translate(&event, &document) {
                    dispatch(&cell, host_event);
                }
            })
        })
        .collect()
}
