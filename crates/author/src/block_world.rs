use crate::grid::{BlockGrid, CellCoord};
use blockspace_common::{BlockType, EntityId, Transform};
use blockspace_feedback::{FeedbackDisplay, FeedbackKind};
use blockspace_kernel::{EntityKind, Intersection, Scene, SceneError};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Block geometry and feedback placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Edge length of a grid cell.
    pub grid_size: f32,
    /// Height of a block's center above the ground.
    pub block_half_height: f32,
    /// How far above a block's center its feedback marker appears.
    pub feedback_lift: f32,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            grid_size: 1.0,
            block_half_height: 0.5,
            feedback_lift: 0.5,
        }
    }
}

/// Result of a placement attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaceOutcome {
    Placed {
        entity: EntityId,
        cell: CellCoord,
        block_type: BlockType,
    },
    /// The cell already holds a block; nothing changed.
    Occupied { cell: CellCoord, existing: EntityId },
    /// The pointer did not reach the ground.
    NoIntersection,
}

/// Result of a removal attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RemoveOutcome {
    Removed {
        entity: EntityId,
        position: Vec3,
        block_type: BlockType,
    },
    /// The nearest hit is something other than a block.
    NotABlock(EntityId),
    /// The pointer hit nothing.
    NoTarget,
}

/// Block building state for one session: occupancy plus the selected type.
#[derive(Debug, Clone)]
pub struct BlockWorld {
    config: BuildConfig,
    selected: BlockType,
    grid: BlockGrid,
}

impl Default for BlockWorld {
    fn default() -> Self {
        Self::new(BuildConfig::default())
    }
}

impl BlockWorld {
    /// Start with an empty grid and grass selected.
    pub fn new(config: BuildConfig) -> Self {
        let grid = BlockGrid::new(config.grid_size);
        Self {
            config,
            selected: BlockType::default(),
            grid,
        }
    }

    /// Start building in a scene that may already contain blocks.
    pub fn attach(config: BuildConfig, scene: &Scene) -> Self {
        let mut world = Self::new(config);
        world.grid.rebuild(scene);
        world
    }

    /// Block type the next placement will use.
    pub fn selected(&self) -> BlockType {
        self.selected
    }

    /// Occupied cells whose block is still in the scene.
    pub fn block_count(&self, scene: &Scene) -> usize {
        self.grid.iter().filter(|(_, id)| scene.contains(*id)).count()
    }

    /// Block occupying `cell`, if it is still in the scene.
    pub fn block_at(&self, scene: &Scene, cell: CellCoord) -> Option<EntityId> {
        self.grid.get(cell).filter(|id| scene.contains(*id))
    }

    /// Place a block of the selected type in the cell under `ground_hit`.
    pub fn place_block(
        &mut self,
        scene: &mut Scene,
        feedback: &mut FeedbackDisplay,
        ground_hit: Option<Vec3>,
        now: Duration,
    ) -> Result<PlaceOutcome, SceneError> {
        let Some(point) = ground_hit else {
            tracing::debug!("no ground intersection for block placement");
            return Ok(PlaceOutcome::NoIntersection);
        };

        let cell = self.grid.snap(point);
        if let Some(existing) = self.block_at(scene, cell) {
            tracing::debug!(%cell, "block already exists at cell");
            return Ok(PlaceOutcome::Occupied { cell, existing });
        }
        if let Some(stale) = self.grid.get(cell) {
            // Removed behind our back; reclaim the cell.
            self.grid.release(cell, stale);
        }

        let position = self.grid.center(cell, self.config.block_half_height);
        let block_type = self.selected;
        let entity = scene.spawn(EntityKind::Block(block_type), Transform::at(position))?;
        self.grid.insert(cell, entity);
        tracing::info!(%block_type, %cell, entity = %entity.short(), "placed block");

        feedback.show(
            scene,
            FeedbackKind::Placed,
            position + Vec3::Y * self.config.feedback_lift,
            now,
        )?;
        Ok(PlaceOutcome::Placed {
            entity,
            cell,
            block_type,
        })
    }

    /// Remove the block at the nearest of `intersections`, if it is one.
    pub fn remove_block(
        &mut self,
        scene: &mut Scene,
        feedback: &mut FeedbackDisplay,
        intersections: &[Intersection],
        now: Duration,
    ) -> Result<RemoveOutcome, SceneError> {
        let Some(nearest) = intersections.first() else {
            tracing::debug!("no block to remove at intersection");
            return Ok(RemoveOutcome::NoTarget);
        };
        let Some(data) = scene.get(nearest.entity) else {
            tracing::debug!(entity = %nearest.entity.short(), "intersected entity is gone");
            return Ok(RemoveOutcome::NoTarget);
        };
        let Some(block_type) = data.kind.block_type() else {
            tracing::debug!(entity = %nearest.entity.short(), "intersected entity is not a block");
            return Ok(RemoveOutcome::NotABlock(nearest.entity));
        };

        let entity = nearest.entity;
        let position = scene
            .world_transform(entity)
            .ok_or(SceneError::EntityNotFound(entity))?
            .position;
        feedback.show(
            scene,
            FeedbackKind::Removed,
            position + Vec3::Y * self.config.feedback_lift,
            now,
        )?;
        scene.despawn(entity);
        self.grid.release(self.grid.snap(position), entity);
        tracing::info!(%block_type, ?position, entity = %entity.short(), "removed block");

        Ok(RemoveOutcome::Removed {
            entity,
            position,
            block_type,
        })
    }

    /// Advance to the next block type, wrapping after the last.
    pub fn cycle_block_type(
        &mut self,
        scene: &mut Scene,
        feedback: &mut FeedbackDisplay,
        now: Duration,
    ) -> BlockType {
        let next = self.selected.next();
        self.select_block_type(scene, feedback, next, now)
    }

    /// Switch directly to `block_type`.
    ///
    /// The selection always changes; the on-screen confirmation is skipped
    /// if the scene has no head to anchor it to.
    pub fn select_block_type(
        &mut self,
        scene: &mut Scene,
        feedback: &mut FeedbackDisplay,
        block_type: BlockType,
        now: Duration,
    ) -> BlockType {
        self.selected = block_type;
        tracing::info!(%block_type, "selected block type");
        if let Err(e) = feedback.show_selection(scene, block_type, now) {
            tracing::warn!("selection display skipped: {e}");
        }
        self.selected
    }
}
