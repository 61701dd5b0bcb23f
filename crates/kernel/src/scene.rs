use blockspace_common::{BlockType, EntityId, Hand, Marker, Transform};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tag carried by every scene entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Bounded horizontal plane that placement rays land on.
    Ground { half_extent: f32 },
    /// Movable anchor the viewpoint and controllers hang off.
    Rig,
    /// The viewer's head / camera.
    Head,
    Controller(Hand),
    /// A placed unit cube.
    Block(BlockType),
    /// Ephemeral feedback; never targeted by pointer intersections.
    Marker(Marker),
}

impl EntityKind {
    /// The anchor slot this kind occupies, if it is a singleton.
    pub fn anchor(&self) -> Option<Anchor> {
        match self {
            EntityKind::Ground { .. } => Some(Anchor::Ground),
            EntityKind::Rig => Some(Anchor::Rig),
            EntityKind::Head => Some(Anchor::Head),
            EntityKind::Controller(hand) => Some(Anchor::Controller(*hand)),
            EntityKind::Block(_) | EntityKind::Marker(_) => None,
        }
    }

    /// Material, if this is a block.
    pub fn block_type(&self) -> Option<BlockType> {
        match self {
            EntityKind::Block(t) => Some(*t),
            _ => None,
        }
    }

    /// True for placed blocks.
    pub fn is_block(&self) -> bool {
        matches!(self, EntityKind::Block(_))
    }

    /// True for transient feedback markers.
    pub fn is_marker(&self) -> bool {
        matches!(self, EntityKind::Marker(_))
    }
}

/// Named scene references the behaviors depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Anchor {
    Ground,
    Head,
    Rig,
    Controller(Hand),
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Anchor::Ground => f.write_str("ground"),
            Anchor::Head => f.write_str("head"),
            Anchor::Rig => f.write_str("rig"),
            Anchor::Controller(hand) => write!(f, "{hand} controller"),
        }
    }
}

/// Errors from scene operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("{0} not found in scene")]
    MissingAnchor(Anchor),
    #[error("{0} is already bound to entity {1:?}")]
    AnchorTaken(Anchor, EntityId),
    #[error("entity {0:?} not found")]
    EntityNotFound(EntityId),
}

/// An event record produced by every mutation to the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SceneEvent {
    Spawned {
        id: EntityId,
        parent: Option<EntityId>,
        kind: EntityKind,
        transform: Transform,
    },
    /// Carries the data the entity had so the log can be read back.
    Despawned {
        id: EntityId,
        kind: EntityKind,
        transform: Transform,
    },
    TransformUpdated {
        id: EntityId,
        old: Transform,
        new: Transform,
    },
}

/// Per-entity data. `transform` is relative to `parent` when one is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityData {
    pub kind: EntityKind,
    pub transform: Transform,
    pub parent: Option<EntityId>,
}

/// The scene graph a session mutates.
///
/// Uses BTreeMap for deterministic iteration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    entities: BTreeMap<EntityId, EntityData>,
    anchors: BTreeMap<Anchor, EntityId>,
    #[serde(skip)]
    event_log: Vec<SceneEvent>,
}

impl Scene {
    /// Empty scene with no anchors bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Events logged since the last drain.
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    /// All live entities in id order.
    pub fn entities(&self) -> &BTreeMap<EntityId, EntityData> {
        &self.entities
    }

    /// Spawn a root entity. Fails if `kind` is an anchor that is already bound.
    pub fn spawn(&mut self, kind: EntityKind, transform: Transform) -> Result<EntityId, SceneError> {
        self.spawn_under(None, kind, transform)
    }

    /// Spawn an entity whose transform is relative to `parent`.
    pub fn spawn_child(
        &mut self,
        parent: EntityId,
        kind: EntityKind,
        transform: Transform,
    ) -> Result<EntityId, SceneError> {
        self.spawn_under(Some(parent), kind, transform)
    }

    fn spawn_under(
        &mut self,
        parent: Option<EntityId>,
        kind: EntityKind,
        transform: Transform,
    ) -> Result<EntityId, SceneError> {
        if let Some(p) = parent {
            if !self.entities.contains_key(&p) {
                return Err(SceneError::EntityNotFound(p));
            }
        }
        if let Some(anchor) = kind.anchor() {
            if let Some(existing) = self.anchors.get(&anchor) {
                return Err(SceneError::AnchorTaken(anchor, *existing));
            }
        }
        let id = EntityId::new();
        self.insert(id, parent, kind.clone(), transform);
        self.event_log.push(SceneEvent::Spawned {
            id,
            parent,
            kind,
            transform,
        });
        Ok(id)
    }

    fn insert(&mut self, id: EntityId, parent: Option<EntityId>, kind: EntityKind, transform: Transform) {
        if let Some(anchor) = kind.anchor() {
            self.anchors.insert(anchor, id);
        }
        self.entities.insert(
            id,
            EntityData {
                kind,
                transform,
                parent,
            },
        );
    }

    /// Remove an entity and everything parented under it.
    ///
    /// Returns the removed entity's data, or `None` if it was already gone.
    pub fn despawn(&mut self, id: EntityId) -> Option<EntityData> {
        let children: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|(_, d)| d.parent == Some(id))
            .map(|(child, _)| *child)
            .collect();
        for child in children {
            self.despawn(child);
        }

        let data = self.entities.remove(&id)?;
        if let Some(anchor) = data.kind.anchor() {
            if self.anchors.get(&anchor) == Some(&id) {
                self.anchors.remove(&anchor);
            }
        }
        self.event_log.push(SceneEvent::Despawned {
            id,
            kind: data.kind.clone(),
            transform: data.transform,
        });
        Some(data)
    }

    /// Entity data, with its transform relative to its parent.
    pub fn get(&self, id: EntityId) -> Option<&EntityData> {
        self.entities.get(&id)
    }

    /// Whether `id` is still in the scene.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Update an entity's local transform and log the change.
    pub fn set_transform(&mut self, id: EntityId, new: Transform) -> bool {
        if let Some(data) = self.entities.get_mut(&id) {
            let old = data.transform;
            data.transform = new;
            self.event_log
                .push(SceneEvent::TransformUpdated { id, old, new });
            true
        } else {
            false
        }
    }

    /// Transform in world space, composed through every parent.
    pub fn world_transform(&self, id: EntityId) -> Option<Transform> {
        let data = self.entities.get(&id)?;
        match data.parent {
            Some(parent) => {
                let parent_world = self.world_transform(parent)?;
                Some(parent_world.compose(&data.transform))
            }
            None => Some(data.transform),
        }
    }

    /// Resolve an anchor to its entity.
    pub fn anchor(&self, anchor: Anchor) -> Result<EntityId, SceneError> {
        self.anchors
            .get(&anchor)
            .copied()
            .ok_or(SceneError::MissingAnchor(anchor))
    }

    /// World transform of an anchor entity.
    pub fn anchor_transform(&self, anchor: Anchor) -> Result<Transform, SceneError> {
        let id = self.anchor(anchor)?;
        self.world_transform(id)
            .ok_or(SceneError::EntityNotFound(id))
    }

    /// All placed blocks with their type and world position.
    pub fn blocks(&self) -> impl Iterator<Item = (EntityId, BlockType, glam::Vec3)> + '_ {
        self.entities.iter().filter_map(|(id, data)| {
            let block_type = data.kind.block_type()?;
            let position = self.world_transform(*id)?.position;
            Some((*id, block_type, position))
        })
    }

    /// Number of placed blocks.
    pub fn block_count(&self) -> usize {
        self.entities.values().filter(|d| d.kind.is_block()).count()
    }

    /// Number of feedback markers currently shown.
    pub fn marker_count(&self) -> usize {
        self.entities.values().filter(|d| d.kind.is_marker()).count()
    }

    /// Rebuild a scene from a sequence of events.
    pub fn replay(events: &[SceneEvent]) -> Self {
        let mut scene = Self::new();
        for event in events {
            scene.apply_event(event);
        }
        scene
    }

    /// Apply one logged event without logging it again.
    pub fn apply_event(&mut self, event: &SceneEvent) {
        match event {
            SceneEvent::Spawned {
                id,
                parent,
                kind,
                transform,
            } => {
                self.insert(*id, *parent, kind.clone(), *transform);
            }
            SceneEvent::Despawned { id, kind, .. } => {
                self.entities.remove(id);
                if let Some(anchor) = kind.anchor() {
                    if self.anchors.get(&anchor) == Some(id) {
                        self.anchors.remove(&anchor);
                    }
                }
            }
            SceneEvent::TransformUpdated { id, new, .. } => {
                if let Some(data) = self.entities.get_mut(id) {
                    data.transform = *new;
                }
            }
        }
    }
}
