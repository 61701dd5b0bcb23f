//! Controller input: typed events from the headset runtime mapped to actions.
//!
//! # Invariants
//! - Handlers consume actions, never raw events.
//! - A thumbstick push only teleports once it is strictly past the threshold.

pub mod action;
pub mod event;

pub use action::{Action, ActionMap, TELEPORT_THRESHOLD};
pub use event::{FaceButton, InputEvent};
