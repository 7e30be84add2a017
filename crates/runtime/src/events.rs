//! Everything the host can tell the animator.

use serde::{Deserialize, Serialize};

/// A callback or input event delivered to [`Animator::handle`](crate::Animator::handle).
///
/// Serialized with a `type` tag so recorded event traces can be replayed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// A requested frame fired at `timestamp` (host milliseconds).
    Frame { timestamp: f64 },
    /// The watchdog interval fired.
    WatchdogTick { now: f64 },
    /// The post-visibility resume timer fired.
    ResumeTimer,
    PointerMoved { x: f64, y: f64 },
    PointerLeft,
    /// First touch point moved.
    TouchMoved { x: f64, y: f64 },
    /// Touch ended or was cancelled.
    TouchEnded,
    Resized,
    VisibilityChanged { hidden: bool },
    FocusGained,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn events_use_snake_case_tags() {
        let v = serde_json::to_value(HostEvent::PointerMoved { x: 1.0, y: 2.0 }).unwrap();
        assert_eq!(v, json!({"type": "pointer_moved", "x": 1.0, "y": 2.0}));
        let v = serde_json::to_value(HostEvent::FocusGained).unwrap();
        assert_eq!(v, json!({"type": "focus_gained"}));
    }

    #[test]
    fn events_parse_from_trace_lines() {
        let e: HostEvent =
            serde_json::from_str(r#"{"type": "visibility_changed", "hidden": true}"#).unwrap();
        assert_eq!(e, HostEvent::VisibilityChanged { hidden: true });
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let r: Result<HostEvent, _> = serde_json::from_str(r#"{"type": "scroll"}"#);
        assert!(r.is_err());
    }
}
