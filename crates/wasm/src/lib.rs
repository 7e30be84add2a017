//! WASM bindings for the ambient particle field.
//!
//! JavaScript calls [`AmbientField::mount`] with the id of a `<canvas>`; when
//! the element exists the field starts animating on it, driven by
//! `requestAnimationFrame` and supervised by a `setInterval` watchdog.
//! Calling `teardown()` (or freeing the handle) stops everything and
//! detaches the listeners.

mod canvas;
mod host;
mod listeners;
mod logging;

use std::cell::RefCell;
use std::rc::Rc;

use ambient_field_core::{FieldConfig, FieldError, ParticleField};
use ambient_field_runtime::{Animator, LoopConfig, RunState};
use serde_json::Value;
use tracing::{debug, info};
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use canvas::CanvasSurface;
use host::{Shared, WebHost};
use listeners::Listener;

fn to_js(e: FieldError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Parses the optional JSON settings string; absent means all defaults.
fn parse_settings(config_json: Option<&str>) -> Result<Value, FieldError> {
    let Some(text) = config_json.filter(|t| !t.trim().is_empty()) else {
        return Ok(Value::Object(Default::default()));
    };
    match serde_json::from_str(text) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(FieldError::InvalidConfig("settings must be a JSON object".into())),
        Err(e) => Err(FieldError::InvalidConfig(format!("settings are not valid JSON: {e}"))),
    }
}

/// Turns a `Math.random()` draw into a non-zero PRNG seed.
fn seed_from_random(r: f64) -> u64 {
    ((r.clamp(0.0, 1.0) * (1_u64 << 53) as f64) as u64) | 1
}

/// A particle field mounted on a page canvas.
#[wasm_bindgen]
pub struct AmbientField {
    animator: Shared,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl AmbientField {
    /// Mounts on the canvas with id `canvas_id`.
    ///
    /// Returns `undefined` when there is no such element (not the landing
    /// page). Throws on invalid settings, a canvas without a 2D context, or
    /// a window without `performance`.
    pub fn mount(canvas_id: &str, config_json: Option<String>) -> Result<Option<AmbientField>, JsValue> {
        logging::init();
        let Some(window) = web_sys::window() else {
            return Ok(None);
        };
        let Some(document) = window.document() else {
            return Ok(None);
        };
        let Some(element) = document.get_element_by_id(canvas_id) else {
            debug!(canvas_id, "canvas not found, nothing to mount");
            return Ok(None);
        };
        let canvas: HtmlCanvasElement = element
            .dyn_into()
            .map_err(|_| JsValue::from_str("element is not a canvas"))?;

        let settings = parse_settings(config_json.as_deref()).map_err(to_js)?;
        let field_config = FieldConfig::from_json(&settings).map_err(to_js)?;
        let loop_config = LoopConfig::from_json(&settings).map_err(to_js)?;
        let seed = seed_from_random(js_sys::Math::random());

        let surface = CanvasSurface::new(window.clone(), canvas.clone())?;
        let cell: Shared = Rc::new(RefCell::new(None));
        let host = WebHost::new(window.clone(), Rc::downgrade(&cell)).map_err(to_js)?;
        let mut animator = Animator::new(
            ParticleField::new(field_config, seed),
            surface,
            host,
            loop_config,
        );
        // Callbacks are asynchronous, so none can run before the cell is filled.
        animator.mount();
        *cell.borrow_mut() = Some(animator);

        let listeners = listeners::attach_all(&window, &document, &canvas, Rc::downgrade(&cell))?;
        info!(canvas_id, "ambient field mounted");
        Ok(Some(AmbientField {
            animator: cell,
            listeners,
        }))
    }

    /// Stops the loop, cancels pending callbacks and detaches listeners. Idempotent.
    pub fn teardown(&mut self) {
        self.listeners.clear();
        let animator = self
            .animator
            .try_borrow_mut()
            .ok()
            .and_then(|mut slot| slot.take());
        if animator.is_some() {
            debug!("ambient field torn down");
        }
    }

    /// Loop counters as a JSON string, or `undefined` after teardown.
    pub fn stats(&self) -> Option<String> {
        let slot = self.animator.try_borrow().ok()?;
        let stats = slot.as_ref()?.stats();
        serde_json::to_string(&stats).ok()
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.animator
            .try_borrow()
            .ok()
            .and_then(|slot| slot.as_ref().map(|a| a.run_state() == RunState::Running))
            .unwrap_or(false)
    }
}

impl Drop for AmbientField {
    fn drop(&mut self) {
        self.teardown();
    }
}
