//! Ray casting against world boxes and interactable selection.

use glam::Vec3;

use crate::scene::{ObjectId, Scene};

/// A ray in world space.
///
/// The direction is used as given, without normalization; reported hit
/// distances are multiples of its length. The game passes the camera view
/// vector straight through, so the pick range scales with it.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Slab test against an axis-aligned box.
    ///
    /// Zero direction components divide to IEEE infinities, which fall out
    /// of the min/max reductions on their own. The returned distance is the
    /// entry parameter, which is negative when the origin is inside the box.
    pub fn intersect_aabb(&self, min: Vec3, max: Vec3) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let inv = 1.0 / self.direction[axis];
            let mut t1 = (min[axis] - self.origin[axis]) * inv;
            let mut t2 = (max[axis] - self.origin[axis]) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
        }

        if t_max >= t_min && t_max >= 0.0 {
            Some(t_min)
        } else {
            None
        }
    }
}

/// How far away an object may be and still count as reachable, in multiples
/// of the view vector's length.
const PICK_RANGE: f32 = 1.0;

/// Scans the given objects with a ray from the camera and returns the one
/// the player can interact with, if any.
///
/// Only inspectable objects are considered. The running minimum tracks every
/// hit, but the selection is reassigned only while the minimum sits in the
/// open interval `(0, PICK_RANGE)`. A nearer hit outside that interval
/// lowers the minimum without clearing an earlier pick, and the first object
/// encountered wins exact ties.
pub fn pick_interactable(
    scene: &Scene,
    candidates: &[ObjectId],
    origin: Vec3,
    view: Vec3,
) -> Option<ObjectId> {
    let ray = Ray::new(origin, view);
    let mut picked = None;
    let mut min_distance = f32::INFINITY;

    for &id in candidates {
        let obj = scene.object(id);
        if !obj.inspectable {
            continue;
        }
        if let Some(d) = ray.intersect_aabb(obj.world_min(), obj.world_max()) {
            if d < min_distance {
                min_distance = d;
                if min_distance > 0.0 && min_distance < PICK_RANGE {
                    picked = Some(id);
                }
            }
        }
    }

    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collide::Aabb;
    use crate::scene::{MeshId, SceneObject};

    #[test]
    fn slab_test_reports_entry_distance() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let t = ray
            .intersect_aabb(Vec3::splat(-1.0), Vec3::splat(1.0))
            .unwrap();
        assert_eq!(t, 4.0);
        assert_eq!(ray.point_at(t), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn slab_test_handles_axis_parallel_rays() {
        // Direction has a zero Y component; the Y slab divides to infinity.
        let ray = Ray::new(Vec3::new(-5.0, 0.5, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(
            ray.intersect_aabb(Vec3::splat(-1.0), Vec3::splat(1.0))
                .is_some()
        );

        let miss = Ray::new(Vec3::new(-5.0, 2.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(
            miss.intersect_aabb(Vec3::splat(-1.0), Vec3::splat(1.0))
                .is_none()
        );
    }

    #[test]
    fn slab_test_misses_behind_the_origin() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(
            ray.intersect_aabb(Vec3::splat(-1.0), Vec3::splat(1.0))
                .is_none()
        );
    }

    fn scene_with(objects: Vec<SceneObject>) -> (Scene, Vec<ObjectId>) {
        let mut scene = Scene::new();
        let ids = objects.into_iter().map(|o| scene.add(o)).collect();
        (scene, ids)
    }

    fn box_at(name: &str, z: f32, half: f32) -> SceneObject {
        let mut obj = SceneObject::new(name, MeshId(0), Aabb::symmetric(half));
        obj.set_position(Vec3::new(0.0, 0.0, z));
        obj
    }

    #[test]
    fn pick_selects_within_range() {
        // Near face at distance 0.5 along the view vector.
        let (scene, ids) = scene_with(vec![box_at("near", -0.75, 0.25)]);
        let picked = pick_interactable(&scene, &ids, Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(picked, Some(ids[0]));
    }

    #[test]
    fn pick_rejects_out_of_range_and_zero_distance() {
        let (scene, ids) = scene_with(vec![box_at("far", -1.75, 0.25)]);
        assert_eq!(
            pick_interactable(&scene, &ids, Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)),
            None
        );

        // Origin inside the box: the entry distance is negative.
        let (scene, ids) = scene_with(vec![box_at("around", 0.0, 0.5)]);
        assert_eq!(
            pick_interactable(&scene, &ids, Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)),
            None
        );
    }

    #[test]
    fn nearer_out_of_range_hit_does_not_clear_a_pick() {
        let (scene, ids) = scene_with(vec![
            box_at("reachable", -0.75, 0.25),
            // Encloses the origin, so its entry distance is negative and it
            // drags the running minimum below zero.
            box_at("enclosing", 0.0, 2.0),
            box_at("also_reachable", -0.95, 0.1),
        ]);
        let picked = pick_interactable(&scene, &ids, Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(picked, Some(ids[0]));
    }

    #[test]
    fn pick_skips_non_inspectable_objects() {
        let (mut scene, ids) = scene_with(vec![box_at("hidden", -0.75, 0.25)]);
        scene.object_mut(ids[0]).inspectable = false;
        assert_eq!(
            pick_interactable(&scene, &ids, Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)),
            None
        );
    }
}
