//! Session: owns the scene and both controller behaviors, and routes each
//! input event to exactly one handler.
//!
//! # Invariants
//! - Events are handled one at a time, to completion.
//! - A failed action is logged and leaves selection and blocks untouched.
//! - Feedback expiry only happens when the clock is advanced.
//! - The scene event log is drained into the session snapshot after every
//!   mutating call.

pub mod config;
pub mod script;
mod session;

pub use config::{ConfigError, SceneLayout, SessionConfig};
pub use script::{ScriptStep, Step};
pub use session::{Outcome, Session, SessionError};
