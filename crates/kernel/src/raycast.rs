use crate::scene::{Anchor, EntityKind, Scene, SceneError};
use blockspace_common::{EntityId, Ray};
use glam::Vec3;

/// Rays stop reporting hits beyond this distance.
pub const MAX_RAY_DISTANCE: f32 = 1000.0;

const PARALLEL_EPSILON: f32 = 1e-6;

/// A pointer hit on an interactive entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub entity: EntityId,
    pub point: Vec3,
    pub distance: f32,
}

impl Scene {
    /// Where `ray` meets the ground plane, if it does.
    ///
    /// Blocks standing on the ground do not occlude the hit.
    pub fn raycast_ground(&self, ray: &Ray) -> Result<Option<Vec3>, SceneError> {
        let ground = self.anchor(Anchor::Ground)?;
        let Some(data) = self.get(ground) else {
            return Err(SceneError::MissingAnchor(Anchor::Ground));
        };
        let EntityKind::Ground { half_extent } = data.kind else {
            return Err(SceneError::MissingAnchor(Anchor::Ground));
        };
        let center = self
            .world_transform(ground)
            .ok_or(SceneError::EntityNotFound(ground))?
            .position;
        Ok(ray_ground(ray, center, half_extent).map(|t| ray.at(t)))
    }

    /// Every interactive entity `ray` passes through, nearest first.
    ///
    /// Blocks are unit cubes centered on their position; the ground counts
    /// as a hit target so that pointing at open floor shadows blocks behind it.
    pub fn intersections(&self, ray: &Ray) -> Vec<Intersection> {
        let mut hits: Vec<Intersection> = self
            .entities()
            .iter()
            .filter_map(|(id, data)| {
                let world = self.world_transform(*id)?;
                let distance = match data.kind {
                    EntityKind::Block(_) => {
                        let half = world.scale * 0.5;
                        ray_aabb(ray, world.position - half, world.position + half)?
                    }
                    EntityKind::Ground { half_extent } => {
                        ray_ground(ray, world.position, half_extent)?
                    }
                    _ => return None,
                };
                Some(Intersection {
                    entity: *id,
                    point: ray.at(distance),
                    distance,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

/// Distance along `ray` to a square horizontal plane of the given half extent.
fn ray_ground(ray: &Ray, center: Vec3, half_extent: f32) -> Option<f32> {
    if ray.direction.y.abs() < PARALLEL_EPSILON {
        return None;
    }
    let t = (center.y - ray.origin.y) / ray.direction.y;
    if !(0.0..=MAX_RAY_DISTANCE).contains(&t) {
        return None;
    }
    let p = ray.at(t);
    if (p.x - center.x).abs() > half_extent || (p.z - center.z).abs() > half_extent {
        return None;
    }
    Some(t)
}

/// Slab test against an axis-aligned box. Returns the entry distance.
fn ray_aabb(ray: &Ray, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_near = 0.0f32;
    let mut t_far = MAX_RAY_DISTANCE;
    for axis in 0..3 {
        let origin = ray.origin[axis];
        let dir = ray.direction[axis];
        if dir.abs() < PARALLEL_EPSILON {
            if origin < min[axis] || origin > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir;
        let mut t0 = (min[axis] - origin) * inv;
        let mut t1 = (max[axis] - origin) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }
    Some(t_near)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockspace_common::{BlockType, Transform};

    fn scene_with_ground() -> Scene {
        let mut s = Scene::new();
        s.spawn(EntityKind::Ground { half_extent: 10.0 }, Transform::default())
            .unwrap();
        s
    }

    fn down_from(x: f32, z: f32) -> Ray {
        Ray::new(Vec3::new(x, 5.0, z), Vec3::NEG_Y)
    }

    #[test]
    fn ground_hit_straight_down() {
        let s = scene_with_ground();
        let hit = s.raycast_ground(&down_from(1.3, -2.7)).unwrap().unwrap();
        assert!((hit - Vec3::new(1.3, 0.0, -2.7)).length() < 1e-5);
    }

    #[test]
    fn ground_missed_when_pointing_up_or_outside() {
        let s = scene_with_ground();
        let up = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert_eq!(s.raycast_ground(&up).unwrap(), None);
        assert_eq!(s.raycast_ground(&down_from(11.0, 0.0)).unwrap(), None);
        let flat = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        assert_eq!(s.raycast_ground(&flat).unwrap(), None);
    }

    #[test]
    fn missing_ground_is_an_error() {
        let s = Scene::new();
        assert_eq!(
            s.raycast_ground(&down_from(0.0, 0.0)),
            Err(SceneError::MissingAnchor(Anchor::Ground))
        );
    }

    #[test]
    fn intersections_are_nearest_first() {
        let mut s = scene_with_ground();
        let low = s
            .spawn(EntityKind::Block(BlockType::Grass), Transform::at(Vec3::new(0.0, 0.5, 0.0)))
            .unwrap();
        let high = s
            .spawn(EntityKind::Block(BlockType::Stone), Transform::at(Vec3::new(0.0, 1.5, 0.0)))
            .unwrap();
        let hits = s.intersections(&down_from(0.2, 0.2));
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].entity, high);
        assert!((hits[0].distance - 3.0).abs() < 1e-5);
        assert_eq!(hits[1].entity, low);
    }

    #[test]
    fn markers_are_not_hit() {
        let mut s = Scene::new();
        s.spawn(
            EntityKind::Marker(blockspace_common::Marker::Sphere {
                radius: 0.2,
                color: blockspace_common::Color::GREEN,
                opacity: 0.5,
            }),
            Transform::at(Vec3::new(0.0, 0.5, 0.0)),
        )
        .unwrap();
        assert!(s.intersections(&down_from(0.0, 0.0)).is_empty());
    }

    #[test]
    fn block_missed_beside_ray() {
        let mut s = Scene::new();
        s.spawn(EntityKind::Block(BlockType::Wood), Transform::at(Vec3::new(3.0, 0.5, 0.0)))
            .unwrap();
        assert!(s.intersections(&down_from(0.0, 0.0)).is_empty());
    }
}
