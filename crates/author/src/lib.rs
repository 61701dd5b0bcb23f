//! In-World Authoring: placing and removing unit blocks on the ground grid.
//!
//! # Invariants
//! - At most one block per grid cell.
//! - Every block sits at the fixed half-height above the ground.
//! - The selected block type is always one of the fixed set.

mod block_world;
mod grid;

pub use block_world::{BlockWorld, BuildConfig, PlaceOutcome, RemoveOutcome};
pub use grid::{BlockGrid, CellCoord};
