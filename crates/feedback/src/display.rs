use crate::schedule::ExpiryQueue;
use blockspace_common::{BlockType, Color, EntityId, Marker, Transform};
use blockspace_kernel::{Anchor, EntityKind, Scene, SceneError};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where selection text appears relative to the head: above and in front.
pub const SELECTION_TEXT_OFFSET: Vec3 = Vec3::new(0.0, 0.5, -2.0);

/// Lifetimes of each marker kind, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub placement_ms: u64,
    pub removal_ms: u64,
    pub teleport_ms: u64,
    pub selection_ms: u64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            placement_ms: 300,
            removal_ms: 300,
            teleport_ms: 500,
            selection_ms: 1500,
        }
    }
}

impl FeedbackConfig {
    /// How long a marker of `kind` stays up.
    pub fn lifetime(&self, kind: &FeedbackKind) -> Duration {
        let ms = match kind {
            FeedbackKind::Placed => self.placement_ms,
            FeedbackKind::Removed => self.removal_ms,
            FeedbackKind::Teleported => self.teleport_ms,
            FeedbackKind::SelectionChanged(_) => self.selection_ms,
        };
        Duration::from_millis(ms)
    }
}

/// The event a marker acknowledges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Placed,
    Removed,
    Teleported,
    SelectionChanged(BlockType),
}

impl FeedbackKind {
    fn marker(&self) -> Marker {
        match self {
            FeedbackKind::Placed => Marker::Sphere {
                radius: 0.2,
                color: Color::GREEN,
                opacity: 0.5,
            },
            FeedbackKind::Removed => Marker::Sphere {
                radius: 0.3,
                color: Color::RED,
                opacity: 0.5,
            },
            FeedbackKind::Teleported => Marker::Ring {
                inner_radius: 0.8,
                outer_radius: 1.2,
                color: Color::CYAN,
                opacity: 0.7,
            },
            FeedbackKind::SelectionChanged(block_type) => Marker::Text {
                value: format!("Selected: {}", block_type.name()),
                color: block_type.color(),
                scale: 2.0,
            },
        }
    }

    fn rotation(&self) -> Quat {
        match self {
            // Rings lie flat on the floor.
            FeedbackKind::Teleported => Quat::from_rotation_x(-90f32.to_radians()),
            _ => Quat::IDENTITY,
        }
    }
}

/// Spawns feedback markers and removes them when their lifetime runs out.
#[derive(Debug, Default)]
pub struct FeedbackDisplay {
    config: FeedbackConfig,
    expiries: ExpiryQueue,
}

impl FeedbackDisplay {
    /// Create a display with no markers pending.
    pub fn new(config: FeedbackConfig) -> Self {
        Self {
            config,
            expiries: ExpiryQueue::new(),
        }
    }

    /// Markers still waiting to expire.
    pub fn pending(&self) -> usize {
        self.expiries.pending()
    }

    /// When the next marker is due to expire.
    pub fn next_due(&self) -> Option<Duration> {
        self.expiries.next_due()
    }

    /// Spawn a marker for `kind` at `position` and schedule its removal.
    pub fn show(
        &mut self,
        scene: &mut Scene,
        kind: FeedbackKind,
        position: Vec3,
        now: Duration,
    ) -> Result<EntityId, SceneError> {
        let transform = Transform {
            position,
            rotation: kind.rotation(),
            ..Transform::default()
        };
        let id = scene.spawn(EntityKind::Marker(kind.marker()), transform)?;
        let due = now + self.config.lifetime(&kind);
        self.expiries.schedule(id, due);
        tracing::debug!(?kind, ?position, due_ms = due.as_millis() as u64, "feedback shown");
        Ok(id)
    }

    /// Show the selected type's name in front of the viewer.
    ///
    /// Needs the head anchor; without it nothing is spawned.
    pub fn show_selection(
        &mut self,
        scene: &mut Scene,
        block_type: BlockType,
        now: Duration,
    ) -> Result<EntityId, SceneError> {
        let head = scene.anchor_transform(Anchor::Head)?;
        let position = head.position + SELECTION_TEXT_OFFSET;
        self.show(scene, FeedbackKind::SelectionChanged(block_type), position, now)
    }

    /// Remove every marker whose lifetime has ended by `now`.
    pub fn advance(&mut self, scene: &mut Scene, now: Duration) -> usize {
        self.expiries.expire(scene, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn marker_of(scene: &Scene, id: EntityId) -> Marker {
        match &scene.get(id).unwrap().kind {
            EntityKind::Marker(m) => m.clone(),
            other => panic!("expected marker, got {other:?}"),
        }
    }

    #[test]
    fn config_defaults() {
        let c = FeedbackConfig::default();
        assert_eq!(c.lifetime(&FeedbackKind::Placed), ms(300));
        assert_eq!(c.lifetime(&FeedbackKind::Removed), ms(300));
        assert_eq!(c.lifetime(&FeedbackKind::Teleported), ms(500));
        assert_eq!(
            c.lifetime(&FeedbackKind::SelectionChanged(BlockType::Wood)),
            ms(1500)
        );
    }

    #[test]
    fn each_marker_expires_after_its_lifetime() {
        let mut scene = Scene::new();
        let mut display = FeedbackDisplay::default();
        let placed = display
            .show(&mut scene, FeedbackKind::Placed, Vec3::ZERO, ms(0))
            .unwrap();
        let ring = display
            .show(&mut scene, FeedbackKind::Teleported, Vec3::ZERO, ms(0))
            .unwrap();

        assert_eq!(display.advance(&mut scene, ms(299)), 0);
        assert!(scene.contains(placed));

        assert_eq!(display.advance(&mut scene, ms(300)), 1);
        assert!(!scene.contains(placed));
        assert!(scene.contains(ring));

        assert_eq!(display.advance(&mut scene, ms(500)), 1);
        assert_eq!(scene.marker_count(), 0);
        assert_eq!(display.pending(), 0);
    }

    #[test]
    fn teleport_ring_lies_flat() {
        let mut scene = Scene::new();
        let mut display = FeedbackDisplay::default();
        let id = display
            .show(&mut scene, FeedbackKind::Teleported, Vec3::ZERO, ms(0))
            .unwrap();
        let up = scene.get(id).unwrap().transform.rotation * Vec3::Z;
        assert!((up - Vec3::Y).length() < 1e-5);
        assert!(matches!(marker_of(&scene, id), Marker::Ring { .. }));
    }

    #[test]
    fn selection_text_sits_in_front_of_head() {
        let mut scene = Scene::new();
        scene
            .spawn(EntityKind::Head, Transform::at(Vec3::new(1.0, 1.6, 3.0)))
            .unwrap();
        let mut display = FeedbackDisplay::default();
        let id = display
            .show_selection(&mut scene, BlockType::Stone, ms(0))
            .unwrap();

        let pos = scene.get(id).unwrap().transform.position;
        assert!((pos - Vec3::new(1.0, 2.1, 1.0)).length() < 1e-5);
        assert_eq!(
            marker_of(&scene, id),
            Marker::Text {
                value: "Selected: Stone".into(),
                color: BlockType::Stone.color(),
                scale: 2.0,
            }
        );
        assert_eq!(display.next_due(), Some(ms(1500)));
    }

    #[test]
    fn selection_without_head_spawns_nothing() {
        let mut scene = Scene::new();
        let mut display = FeedbackDisplay::default();
        assert_eq!(
            display.show_selection(&mut scene, BlockType::Grass, ms(0)),
            Err(SceneError::MissingAnchor(Anchor::Head))
        );
        assert_eq!(scene.entity_count(), 0);
        assert_eq!(display.pending(), 0);
    }
}
