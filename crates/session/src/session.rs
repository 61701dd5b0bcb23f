use crate::config::{ConfigError, SceneLayout, SessionConfig};
use blockspace_author::{BlockWorld, PlaceOutcome, RemoveOutcome};
use blockspace_common::{BlockType, EntityId, Hand, Ray, Transform};
use blockspace_feedback::FeedbackDisplay;
use blockspace_input::{Action, ActionMap, InputEvent};
use blockspace_kernel::{Anchor, EntityKind, Scene, SceneError};
use blockspace_locomotion::{TeleportLocomotion, TeleportOutcome};
use glam::{EulerRot, Quat};
use std::collections::BTreeSet;
use std::time::Duration;

/// Errors from starting a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
}

/// What handling one action produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Placed(PlaceOutcome),
    Removed(RemoveOutcome),
    Selected(BlockType),
    Teleported(TeleportOutcome),
    ControllerConnected(Hand),
    ControllerDisconnected(Hand),
    /// A required scene anchor was missing; nothing changed.
    Failed(SceneError),
}

/// One user's building session.
///
/// Owns the scene, the block world, locomotion and feedback. Every input
/// event is routed through [`Session::handle`].
///
/// The scene's event log is drained after every call that mutates it and
/// folded into `snapshot`, so it never outgrows one step.
#[derive(Debug)]
pub struct Session {
    scene: Scene,
    snapshot: Scene,
    blocks: BlockWorld,
    locomotion: TeleportLocomotion,
    feedback: FeedbackDisplay,
    actions: ActionMap,
    connected: BTreeSet<Hand>,
}

impl Session {
    /// Build the standard scene (ground, rig, head, two controllers) and
    /// start a session in it.
    pub fn new(config: &SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let scene = build_scene(&config.layout)?;
        Ok(Self::start(config, scene))
    }

    /// Start a session in an existing scene. Blocks already present are
    /// adopted into the occupancy map.
    pub fn with_scene(config: &SessionConfig, scene: Scene) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self::start(config, scene))
    }

    fn start(config: &SessionConfig, mut scene: Scene) -> Self {
        let blocks = BlockWorld::attach(config.build.clone(), &scene);
        // The snapshot starts from current state; earlier history is dropped.
        scene.drain_events();
        Self {
            snapshot: scene.clone(),
            scene,
            blocks,
            locomotion: TeleportLocomotion::new(config.teleport.clone()),
            feedback: FeedbackDisplay::new(config.feedback.clone()),
            actions: ActionMap::new(config.teleport.threshold),
            connected: BTreeSet::new(),
        }
    }

    /// The live scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The scene as rebuilt from every drained event since the session began.
    ///
    /// Matches [`Session::scene`] whenever the session is between calls.
    pub fn snapshot(&self) -> &Scene {
        &self.snapshot
    }

    /// Blocks standing in the scene.
    pub fn block_count(&self) -> usize {
        self.blocks.block_count(&self.scene)
    }

    /// Pending feedback markers.
    pub fn feedback(&self) -> &FeedbackDisplay {
        &self.feedback
    }

    /// Block type the next placement will use.
    pub fn selected(&self) -> BlockType {
        self.blocks.selected()
    }

    /// Hands currently reported as connected, left first.
    pub fn connected_hands(&self) -> impl Iterator<Item = Hand> + '_ {
        self.connected.iter().copied()
    }

    /// Handle one input event at time `now`.
    ///
    /// Returns `None` when the event maps to no action (stick inside the
    /// deadzone).
    pub fn handle(&mut self, event: &InputEvent, now: Duration) -> Option<Outcome> {
        let _span = tracing::info_span!("input", hand = %event.hand()).entered();
        let action = self.actions.map(event)?;
        Some(self.apply(action, now))
    }

    /// Run one action to completion.
    pub fn apply(&mut self, action: Action, now: Duration) -> Outcome {
        let result = match action {
            Action::PlaceBlock(hand) => self.place(hand, now).map(Outcome::Placed),
            Action::RemoveBlock(hand) => self.remove(hand, now).map(Outcome::Removed),
            Action::CycleBlockType => Ok(Outcome::Selected(self.blocks.cycle_block_type(
                &mut self.scene,
                &mut self.feedback,
                now,
            ))),
            Action::SelectBlockType(block_type) => {
                Ok(Outcome::Selected(self.blocks.select_block_type(
                    &mut self.scene,
                    &mut self.feedback,
                    block_type,
                    now,
                )))
            }
            Action::Teleport(axes) => self
                .locomotion
                .teleport_move(&mut self.scene, &mut self.feedback, axes, now)
                .map(Outcome::Teleported),
            Action::ControllerConnected(hand) => {
                tracing::info!(%hand, "controller connected");
                self.connected.insert(hand);
                Ok(Outcome::ControllerConnected(hand))
            }
            Action::ControllerDisconnected(hand) => {
                tracing::warn!(%hand, "controller disconnected");
                self.connected.remove(&hand);
                Ok(Outcome::ControllerDisconnected(hand))
            }
        };
        self.flush_events();
        result.unwrap_or_else(|e| {
            tracing::warn!(?action, "action aborted: {e}");
            Outcome::Failed(e)
        })
    }

    /// Expire feedback markers due by `now`. Returns how many were removed.
    pub fn advance(&mut self, now: Duration) -> usize {
        let expired = self.feedback.advance(&mut self.scene, now);
        self.flush_events();
        expired
    }

    /// Drain the scene's event log into the snapshot.
    fn flush_events(&mut self) {
        for event in self.scene.drain_events() {
            self.snapshot.apply_event(&event);
        }
    }

    /// Point a controller: yaw about the vertical axis, then pitch.
    pub fn aim_controller(
        &mut self,
        hand: Hand,
        yaw_degrees: f32,
        pitch_degrees: f32,
    ) -> Result<(), SceneError> {
        let id = self.scene.anchor(Anchor::Controller(hand))?;
        let rotation = Quat::from_euler(
            EulerRot::YXZ,
            yaw_degrees.to_radians(),
            pitch_degrees.to_radians(),
            0.0,
        );
        self.set_rotation(id, rotation)
    }

    /// Turn the head to face `yaw_degrees`.
    pub fn turn_head(&mut self, yaw_degrees: f32) -> Result<(), SceneError> {
        let id = self.scene.anchor(Anchor::Head)?;
        self.set_rotation(id, Quat::from_rotation_y(yaw_degrees.to_radians()))
    }

    fn set_rotation(&mut self, id: EntityId, rotation: Quat) -> Result<(), SceneError> {
        let current = self
            .scene
            .get(id)
            .ok_or(SceneError::EntityNotFound(id))?
            .transform;
        self.scene.set_transform(
            id,
            Transform {
                rotation,
                ..current
            },
        );
        self.flush_events();
        Ok(())
    }

    fn pointer(&self, hand: Hand) -> Result<Ray, SceneError> {
        let controller = self.scene.anchor_transform(Anchor::Controller(hand))?;
        Ok(Ray::from_transform(&controller))
    }

    fn place(&mut self, hand: Hand, now: Duration) -> Result<PlaceOutcome, SceneError> {
        let ray = self.pointer(hand)?;
        let hit = self.scene.raycast_ground(&ray)?;
        self.blocks
            .place_block(&mut self.scene, &mut self.feedback, hit, now)
    }

    fn remove(&mut self, hand: Hand, now: Duration) -> Result<RemoveOutcome, SceneError> {
        let ray = self.pointer(hand)?;
        let hits = self.scene.intersections(&ray);
        self.blocks
            .remove_block(&mut self.scene, &mut self.feedback, &hits, now)
    }
}

fn build_scene(layout: &SceneLayout) -> Result<Scene, SceneError> {
    let mut scene = Scene::new();
    scene.spawn(
        EntityKind::Ground {
            half_extent: layout.ground_half_extent,
        },
        Transform::default(),
    )?;
    let rig = scene.spawn(EntityKind::Rig, Transform::at(layout.rig_position))?;
    scene.spawn_child(rig, EntityKind::Head, Transform::at(layout.head_offset))?;

    let tilt = Quat::from_rotation_x(layout.controller_pitch_degrees.to_radians());
    for (hand, mirror) in [(Hand::Left, -1.0), (Hand::Right, 1.0)] {
        let mut offset = layout.controller_offset;
        offset.x *= mirror;
        scene.spawn_child(
            rig,
            EntityKind::Controller(hand),
            Transform {
                position: offset,
                rotation: tilt,
                ..Transform::default()
            },
        )?;
    }
    tracing::debug!(entities = scene.entity_count(), "scene built");
    Ok(scene)
}
