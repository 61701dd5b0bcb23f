//! Developer Tooling: read-only views of a scene for logs and the CLI.
//!
//! # Invariants
//! - Inspection never mutates the scene.

mod inspector;

pub use inspector::{BlockInfo, EntityInfo, SceneInspector, SceneSummary};
