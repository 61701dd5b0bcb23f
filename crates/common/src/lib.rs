//! Shared types used across every blockspace crate.
//!
//! # Invariants
//! - `BlockType` is a closed set; its declaration order is the cycle order.
//! - `Transform` rotations are unit quaternions.

pub mod block;
pub mod marker;
pub mod types;

pub use block::{BlockType, Color};
pub use marker::Marker;
pub use types::{EntityId, Hand, Ray, Transform};
