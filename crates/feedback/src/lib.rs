//! Feedback display: transient markers acknowledging placement, removal,
//! teleport and selection changes.
//!
//! # Invariants
//! - Markers never affect building or locomotion state.
//! - Every marker spawned is scheduled for removal; the queue holds ids only.
//! - Expiring a marker that is already gone is a no-op.

mod display;
mod schedule;

pub use display::{FeedbackConfig, FeedbackDisplay, FeedbackKind, SELECTION_TEXT_OFFSET};
pub use schedule::ExpiryQueue;
