#![deny(unsafe_code)]
//! Lifecycle for a frame-driven animation.
//!
//! [`Animator`] runs an [`Animation`](ambient_field_core::Animation) on a
//! [`Surface`](ambient_field_core::Surface) against a [`Host`] that schedules
//! frames and timers. A [`Watchdog`] compares the frame [`Heartbeat`] to a
//! stall threshold and the animator restarts the loop when it goes silent.

pub mod animator;
pub mod config;
pub mod events;
pub mod heartbeat;
pub mod host;
pub mod state;
pub mod watchdog;

pub use animator::Animator;
pub use config::LoopConfig;
pub use events::HostEvent;
pub use heartbeat::Heartbeat;
pub use host::{FrameHandle, Host, TimerHandle};
pub use state::{AnimationState, LoopStats, RunState};
pub use watchdog::{Verdict, Watchdog};
