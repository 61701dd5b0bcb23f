use blockspace_common::EntityId;
use blockspace_kernel::Scene;
use glam::Vec3;
use std::collections::HashMap;

/// A cell on the horizontal block lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub x: i32,
    pub z: i32,
}

impl CellCoord {
    /// Cell at lattice indices `x`, `z`.
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

impl std::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Cell-keyed occupancy map for placed blocks.
///
/// Positions snap to the nearest cell center; exact halves round toward
/// positive infinity.
#[derive(Debug, Clone)]
pub struct BlockGrid {
    cell_size: f32,
    cells: HashMap<CellCoord, EntityId>,
}

impl BlockGrid {
    /// Empty grid with cells `cell_size` wide.
    ///
    /// # Panics
    /// If `cell_size` is not positive. Session configs are validated before
    /// they get here.
    pub fn new(cell_size: f32) -> Self {
        assert!(cell_size > 0.0, "cell_size must be positive");
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    /// Snap a world position to the nearest cell.
    pub fn snap(&self, pos: Vec3) -> CellCoord {
        let snap_axis = |v: f32| (v / self.cell_size + 0.5).floor() as i32;
        CellCoord::new(snap_axis(pos.x), snap_axis(pos.z))
    }

    /// World position of a cell's center at height `y`.
    pub fn center(&self, cell: CellCoord, y: f32) -> Vec3 {
        Vec3::new(
            cell.x as f32 * self.cell_size,
            y,
            cell.z as f32 * self.cell_size,
        )
    }

    /// Entity recorded for `cell`, whether or not it is still in a scene.
    pub fn get(&self, cell: CellCoord) -> Option<EntityId> {
        self.cells.get(&cell).copied()
    }

    /// Claim `cell` for `entity`. Returns false and leaves the map untouched
    /// if the cell is already taken.
    pub fn insert(&mut self, cell: CellCoord, entity: EntityId) -> bool {
        if self.cells.contains_key(&cell) {
            return false;
        }
        self.cells.insert(cell, entity);
        true
    }

    /// Release `cell` only if it is held by `entity`.
    pub fn release(&mut self, cell: CellCoord, entity: EntityId) -> bool {
        if self.cells.get(&cell) == Some(&entity) {
            self.cells.remove(&cell);
            true
        } else {
            false
        }
    }

    /// Rebuild the map from the blocks currently in `scene`.
    ///
    /// If two blocks share a cell the first in entity order wins.
    pub fn rebuild(&mut self, scene: &Scene) {
        self.cells.clear();
        for (id, _, position) in scene.blocks() {
            let cell = self.snap(position);
            self.cells.entry(cell).or_insert(id);
        }
    }

    /// Every recorded `(cell, entity)` pair, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, EntityId)> + '_ {
        self.cells.iter().map(|(c, id)| (*c, *id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockspace_common::{BlockType, Transform};
    use blockspace_kernel::EntityKind;

    #[test]
    fn snap_rounds_to_nearest_cell() {
        let grid = BlockGrid::new(1.0);
        assert_eq!(grid.snap(Vec3::new(0.4, 0.0, 0.6)), CellCoord::new(0, 1));
        assert_eq!(grid.snap(Vec3::new(-1.4, 3.0, -0.6)), CellCoord::new(-1, -1));
    }

    #[test]
    fn snap_halves_round_up() {
        let grid = BlockGrid::new(1.0);
        assert_eq!(grid.snap(Vec3::new(0.5, 0.0, -0.5)), CellCoord::new(1, 0));
        assert_eq!(grid.snap(Vec3::new(-1.5, 0.0, 2.5)), CellCoord::new(-1, 3));
    }

    #[test]
    fn nearby_points_share_a_cell() {
        let grid = BlockGrid::new(1.0);
        let a = grid.snap(Vec3::new(2.05, 0.5, 3.0));
        let b = grid.snap(Vec3::new(1.95, 0.5, 2.92));
        assert_eq!(a, b);
    }

    #[test]
    fn center_scales_with_cell_size() {
        let grid = BlockGrid::new(2.0);
        assert_eq!(grid.snap(Vec3::new(2.9, 0.0, -3.1)), CellCoord::new(1, -2));
        assert_eq!(
            grid.center(CellCoord::new(1, -2), 0.5),
            Vec3::new(2.0, 0.5, -4.0)
        );
    }

    #[test]
    fn insert_refuses_occupied_cell() {
        let mut grid = BlockGrid::new(1.0);
        let first = EntityId::new();
        let second = EntityId::new();
        assert!(grid.insert(CellCoord::new(0, 0), first));
        assert!(!grid.insert(CellCoord::new(0, 0), second));
        assert_eq!(grid.get(CellCoord::new(0, 0)), Some(first));
    }

    #[test]
    fn release_checks_owner() {
        let mut grid = BlockGrid::new(1.0);
        let owner = EntityId::new();
        grid.insert(CellCoord::new(4, 4), owner);
        assert!(!grid.release(CellCoord::new(4, 4), EntityId::new()));
        assert!(grid.release(CellCoord::new(4, 4), owner));
        assert_eq!(grid.get(CellCoord::new(4, 4)), None);
    }

    #[test]
    fn rebuild_from_scene() {
        let mut scene = Scene::new();
        let id = scene
            .spawn(
                EntityKind::Block(BlockType::Stone),
                Transform::at(Vec3::new(3.0, 0.5, -2.0)),
            )
            .unwrap();
        scene
            .spawn(EntityKind::Head, Transform::at(Vec3::new(0.0, 1.6, 0.0)))
            .unwrap();

        let mut grid = BlockGrid::new(1.0);
        grid.rebuild(&scene);
        assert_eq!(grid.iter().collect::<Vec<_>>(), vec![(CellCoord::new(3, -2), id)]);
    }
}
