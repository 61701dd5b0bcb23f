use blockspace_common::{BlockType, EntityId};
use blockspace_kernel::{Anchor, EntityKind, Scene};
use glam::Vec3;
use std::collections::BTreeMap;

/// Scene inspector for developer tooling.
pub struct SceneInspector;

impl SceneInspector {
    /// Entity counts and rig position.
    pub fn summary(scene: &Scene) -> SceneSummary {
        SceneSummary {
            entity_count: scene.entity_count(),
            block_count: scene.block_count(),
            marker_count: scene.marker_count(),
            pending_events: scene.events().len(),
            rig_position: scene.anchor_transform(Anchor::Rig).ok().map(|t| t.position),
        }
    }

    /// World-space details for one entity.
    pub fn inspect_entity(scene: &Scene, id: EntityId) -> Option<EntityInfo> {
        let data = scene.get(id)?;
        let world = scene.world_transform(id)?;
        Some(EntityInfo {
            id,
            kind: kind_label(&data.kind),
            position: world.position.to_array(),
            yaw_degrees: world.yaw_degrees(),
        })
    }

    /// Blocks ordered by x, then z.
    pub fn list_blocks(scene: &Scene) -> Vec<BlockInfo> {
        let mut blocks: Vec<BlockInfo> = scene
            .blocks()
            .map(|(id, block_type, position)| BlockInfo {
                id,
                block_type,
                position,
            })
            .collect();
        blocks.sort_by(|a, b| {
            a.position
                .x
                .total_cmp(&b.position.x)
                .then(a.position.z.total_cmp(&b.position.z))
        });
        blocks
    }

    /// Number of placed blocks of each type.
    pub fn block_census(scene: &Scene) -> BTreeMap<BlockType, usize> {
        let mut census = BTreeMap::new();
        for (_, block_type, _) in scene.blocks() {
            *census.entry(block_type).or_insert(0) += 1;
        }
        census
    }
}

fn kind_label(kind: &EntityKind) -> String {
    match kind {
        EntityKind::Ground { .. } => "ground".into(),
        EntityKind::Rig => "rig".into(),
        EntityKind::Head => "head".into(),
        EntityKind::Controller(hand) => format!("{hand} controller"),
        EntityKind::Block(t) => format!("{} block", t.name().to_lowercase()),
        EntityKind::Marker(m) => format!("marker {}", m.color()),
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone)]
pub struct SceneSummary {
    pub entity_count: usize,
    pub block_count: usize,
    pub marker_count: usize,
    pub pending_events: usize,
    pub rig_position: Option<Vec3>,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: entities={} blocks={} markers={} pending_events={}",
            self.entity_count, self.block_count, self.marker_count, self.pending_events
        )?;
        if let Some(p) = self.rig_position {
            write!(f, " rig=({:.2}, {:.2}, {:.2})", p.x, p.y, p.z)?;
        }
        Ok(())
    }
}

/// Detailed info about a single entity.
#[derive(Debug, Clone)]
pub struct EntityInfo {
    pub id: EntityId,
    pub kind: String,
    pub position: [f32; 3],
    pub yaw_degrees: f32,
}

impl std::fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Entity [{}] {} pos=({:.2}, {:.2}, {:.2}) yaw={:.1}",
            self.id.short(),
            self.kind,
            self.position[0],
            self.position[1],
            self.position[2],
            self.yaw_degrees,
        )
    }
}

/// A placed block as listed by the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockInfo {
    pub id: EntityId,
    pub block_type: BlockType,
    pub position: Vec3,
}

impl std::fmt::Display for BlockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<5} at ({:.0}, {:.1}, {:.0})",
            self.block_type.name(),
            self.position.x,
            self.position.y,
            self.position.z
        )
    }
}
