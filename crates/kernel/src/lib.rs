//! Scene Kernel: authoritative entity state for a block-building session.
//!
//! # Invariants
//! - All state mutations flow through explicit operations and are logged.
//! - Anchors (ground, head, rig, controllers) resolve to at most one entity each.
//! - Intersection lists are sorted nearest-first.

pub mod raycast;
pub mod scene;

pub use raycast::{Intersection, MAX_RAY_DISTANCE};
pub use scene::{Anchor, EntityData, EntityKind, Scene, SceneError, SceneEvent};
