//! Locomotion: instantaneous rig jumps along the viewer's heading.
//!
//! # Invariants
//! - Only the rig moves; its height never changes.
//! - One qualifying push produces exactly one jump.

mod teleport;

pub use teleport::{TeleportConfig, TeleportLocomotion, TeleportOutcome, teleport_offset};
