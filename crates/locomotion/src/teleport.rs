use blockspace_common::Transform;
use blockspace_feedback::{FeedbackDisplay, FeedbackKind};
use blockspace_kernel::{Anchor, Scene, SceneError};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Jump length, trigger threshold and ring placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleportConfig {
    /// Distance covered by one jump, in world units.
    pub distance: f32,
    /// Forward/back stick travel that must be exceeded to jump.
    pub threshold: f32,
    /// How far below the rig the confirmation ring is drawn.
    pub ring_drop: f32,
}

impl Default for TeleportConfig {
    fn default() -> Self {
        Self {
            distance: 2.0,
            threshold: 0.8,
            ring_drop: 1.5,
        }
    }
}

/// Result of a teleport request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TeleportOutcome {
    Teleported { from: Vec3, to: Vec3 },
    /// Stick travel did not pass the threshold.
    Ignored,
}

/// Horizontal offset for one jump.
///
/// `stick_y > 0` mirrors X against Z; the two branches are kept exactly as the
/// controller bindings expect.
pub fn teleport_offset(yaw_degrees: f32, distance: f32, stick_y: f32) -> Vec3 {
    let radians = yaw_degrees.to_radians();
    let (sign_x, sign_z) = if stick_y > 0.0 { (-1.0, 1.0) } else { (1.0, -1.0) };
    Vec3::new(
        radians.sin() * distance * sign_x,
        0.0,
        radians.cos() * distance * sign_z,
    )
}

/// Moves the rig in discrete jumps.
#[derive(Debug, Clone, Default)]
pub struct TeleportLocomotion {
    config: TeleportConfig,
}

impl TeleportLocomotion {
    /// Create a locomotion handler with the given jump settings.
    pub fn new(config: TeleportConfig) -> Self {
        Self { config }
    }

    /// Jump the rig along the head's heading.
    ///
    /// Needs both the rig and the head; if either is missing nothing moves.
    pub fn teleport_move(
        &self,
        scene: &mut Scene,
        feedback: &mut FeedbackDisplay,
        axes: Vec2,
        now: Duration,
    ) -> Result<TeleportOutcome, SceneError> {
        if axes.y.is_nan() || axes.y.abs() <= self.config.threshold {
            return Ok(TeleportOutcome::Ignored);
        }

        let rig = scene.anchor(Anchor::Rig)?;
        let yaw = scene.anchor_transform(Anchor::Head)?.yaw_degrees();
        let local = scene
            .get(rig)
            .ok_or(SceneError::EntityNotFound(rig))?
            .transform;
        let from = scene
            .world_transform(rig)
            .ok_or(SceneError::EntityNotFound(rig))?
            .position;

        let delta = teleport_offset(yaw, self.config.distance, axes.y);
        scene.set_transform(
            rig,
            Transform {
                position: local.position + delta,
                ..local
            },
        );
        let to = scene
            .world_transform(rig)
            .ok_or(SceneError::EntityNotFound(rig))?
            .position;
        tracing::info!(?from, ?to, yaw, "teleported");

        feedback.show(
            scene,
            FeedbackKind::Teleported,
            to - Vec3::Y * self.config.ring_drop,
            now,
        )?;
        Ok(TeleportOutcome::Teleported { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockspace_kernel::EntityKind;
    use glam::Quat;

    const EPS: f32 = 1e-4;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPS
    }

    fn rig_scene(yaw_degrees: f32) -> Scene {
        let mut scene = Scene::new();
        let rig = scene
            .spawn(EntityKind::Rig, Transform::at(Vec3::new(1.0, 0.25, -3.0)))
            .unwrap();
        scene
            .spawn_child(
                rig,
                EntityKind::Head,
                Transform {
                    position: Vec3::new(0.0, 1.6, 0.0),
                    rotation: Quat::from_rotation_y(yaw_degrees.to_radians()),
                    ..Transform::default()
                },
            )
            .unwrap();
        scene
    }

    fn rig_position(scene: &Scene) -> Vec3 {
        scene.anchor_transform(Anchor::Rig).unwrap().position
    }

    #[test]
    fn offset_math() {
        assert!(approx(teleport_offset(0.0, 2.0, 0.9), Vec3::new(0.0, 0.0, 2.0)));
        assert!(approx(teleport_offset(90.0, 2.0, -0.9), Vec3::new(2.0, 0.0, 0.0)));
        assert!(approx(teleport_offset(0.0, 2.0, -0.9), Vec3::new(0.0, 0.0, -2.0)));
    }

    #[test]
    fn pull_back_at_zero_yaw_moves_plus_z() {
        let mut scene = rig_scene(0.0);
        let mut feedback = FeedbackDisplay::default();
        let outcome = TeleportLocomotion::default()
            .teleport_move(&mut scene, &mut feedback, Vec2::new(0.0, 0.9), Duration::ZERO)
            .unwrap();
        let TeleportOutcome::Teleported { from, to } = outcome else {
            panic!("expected teleport");
        };
        assert!(approx(from, Vec3::new(1.0, 0.25, -3.0)));
        assert!(approx(to, Vec3::new(1.0, 0.25, -1.0)));
        assert!(approx(rig_position(&scene), to));
    }

    #[test]
    fn push_forward_at_ninety_degrees_moves_plus_x() {
        let mut scene = rig_scene(90.0);
        let mut feedback = FeedbackDisplay::default();
        TeleportLocomotion::default()
            .teleport_move(&mut scene, &mut feedback, Vec2::new(0.0, -0.9), Duration::ZERO)
            .unwrap();
        assert!(approx(rig_position(&scene), Vec3::new(3.0, 0.25, -3.0)));
    }

    #[test]
    fn head_follows_the_rig() {
        let mut scene = rig_scene(0.0);
        let mut feedback = FeedbackDisplay::default();
        TeleportLocomotion::default()
            .teleport_move(&mut scene, &mut feedback, Vec2::new(0.0, 1.0), Duration::ZERO)
            .unwrap();
        let head = scene.anchor_transform(Anchor::Head).unwrap().position;
        assert!(approx(head, Vec3::new(1.0, 1.85, -1.0)));
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut scene = rig_scene(0.0);
        let mut feedback = FeedbackDisplay::default();
        let loco = TeleportLocomotion::default();
        let at_threshold = loco
            .teleport_move(&mut scene, &mut feedback, Vec2::new(0.0, 0.8), Duration::ZERO)
            .unwrap();
        assert_eq!(at_threshold, TeleportOutcome::Ignored);
        assert!(approx(rig_position(&scene), Vec3::new(1.0, 0.25, -3.0)));

        let nan = loco
            .teleport_move(&mut scene, &mut feedback, Vec2::new(0.0, f32::NAN), Duration::ZERO)
            .unwrap();
        assert_eq!(nan, TeleportOutcome::Ignored);
        assert!(approx(rig_position(&scene), Vec3::new(1.0, 0.25, -3.0)));
        assert_eq!(scene.marker_count(), 0);

        let past = loco
            .teleport_move(&mut scene, &mut feedback, Vec2::new(0.0, 0.81), Duration::ZERO)
            .unwrap();
        assert!(matches!(past, TeleportOutcome::Teleported { .. }));
    }

    #[test]
    fn ring_appears_below_new_position_and_expires() {
        let mut scene = rig_scene(0.0);
        let mut feedback = FeedbackDisplay::default();
        TeleportLocomotion::default()
            .teleport_move(&mut scene, &mut feedback, Vec2::new(0.0, 0.9), Duration::ZERO)
            .unwrap();
        let ring = scene
            .entities()
            .values()
            .find(|d| d.kind.is_marker())
            .unwrap();
        assert!(approx(ring.transform.position, Vec3::new(1.0, -1.25, -1.0)));

        feedback.advance(&mut scene, Duration::from_millis(499));
        assert_eq!(scene.marker_count(), 1);
        feedback.advance(&mut scene, Duration::from_millis(500));
        assert_eq!(scene.marker_count(), 0);
    }

    #[test]
    fn missing_head_leaves_rig_in_place() {
        let mut scene = Scene::new();
        scene.spawn(EntityKind::Rig, Transform::default()).unwrap();
        let mut feedback = FeedbackDisplay::default();
        let result = TeleportLocomotion::default().teleport_move(
            &mut scene,
            &mut feedback,
            Vec2::new(0.0, 1.0),
            Duration::ZERO,
        );
        assert_eq!(result, Err(SceneError::MissingAnchor(Anchor::Head)));
        assert_eq!(rig_position(&scene), Vec3::ZERO);
        assert_eq!(scene.marker_count(), 0);
    }

    #[test]
    fn missing_rig_is_reported() {
        let mut scene = Scene::new();
        scene.spawn(EntityKind::Head, Transform::default()).unwrap();
        let mut feedback = FeedbackDisplay::default();
        let result = TeleportLocomotion::default().teleport_move(
            &mut scene,
            &mut feedback,
            Vec2::new(0.0, -1.0),
            Duration::ZERO,
        );
        assert_eq!(result, Err(SceneError::MissingAnchor(Anchor::Rig)));
    }
}
