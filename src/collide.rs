//! Box and sphere overlap tests used by movement and the drawers.

use glam::Vec3;

use crate::scene::SceneObject;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// A box spanning `-half..half` on every axis.
    pub const fn symmetric(half: f32) -> Self {
        Self {
            min: Vec3::new(-half, -half, -half),
            max: Vec3::new(half, half, half),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// World-space box overlap between two scene objects.
///
/// Returns `false` without testing when `b` is not collidable. The check is
/// one-sided on purpose: the first argument is always the moving volume, and
/// its own collidable flag never enters the test.
pub fn box_overlap(a: &SceneObject, b: &SceneObject) -> bool {
    if !b.collidable {
        return false;
    }

    let (min1, max1) = (a.world_min(), a.world_max());
    let (min2, max2) = (b.world_min(), b.world_max());

    min1.x <= max2.x
        && max1.x >= min2.x
        && min1.y <= max2.y
        && max1.y >= min2.y
        && min1.z <= max2.z
        && max1.z >= min2.z
}

/// Componentwise clamp of a point into a box.
pub fn clamp_to_box(p: Vec3, min: Vec3, max: Vec3) -> Vec3 {
    p.clamp(min, max)
}

/// Sphere versus box, tested through the closest point on the box to the
/// sphere center. Touching counts as overlapping.
pub fn sphere_box_overlap(box_min: Vec3, box_max: Vec3, center: Vec3, radius: f32) -> bool {
    let closest = clamp_to_box(center, box_min, box_max);
    closest.distance(center) <= radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MeshId, SceneObject};

    fn unit_object(name: &str, position: Vec3) -> SceneObject {
        let mut obj = SceneObject::new(name, MeshId(0), Aabb::symmetric(1.0));
        obj.set_position(position);
        obj
    }

    #[test]
    fn box_overlap_is_symmetric_when_both_collide() {
        let a = unit_object("a", Vec3::ZERO);
        let b = unit_object("b", Vec3::new(1.5, 0.0, 0.0));
        assert!(box_overlap(&a, &b));
        assert!(box_overlap(&b, &a));
    }

    #[test]
    fn box_overlap_short_circuits_on_second_argument() {
        let a = unit_object("a", Vec3::ZERO);
        let mut b = unit_object("b", Vec3::new(1.5, 0.0, 0.0));
        b.collidable = false;
        assert!(!box_overlap(&a, &b));
        // The first argument's flag is never consulted.
        assert!(box_overlap(&b, &a));
    }

    #[test]
    fn box_overlap_respects_separation() {
        let a = unit_object("a", Vec3::ZERO);
        let b = unit_object("b", Vec3::new(2.5, 0.0, 0.0));
        assert!(!box_overlap(&a, &b));
    }

    #[test]
    fn clamp_to_box_pins_outside_points() {
        let p = clamp_to_box(
            Vec3::new(5.0, -3.0, 0.5),
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        );
        assert_eq!(p, Vec3::new(1.0, -1.0, 0.5));
    }

    #[test]
    fn sphere_near_corner_overlaps() {
        let radius = 0.4;
        let corner = Vec3::splat(1.0);
        let center = corner + Vec3::splat(radius / 2.0 / 3.0f32.sqrt());
        assert!(sphere_box_overlap(
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
            center,
            radius
        ));
    }

    #[test]
    fn sphere_far_from_corner_misses() {
        let radius = 0.4;
        let corner = Vec3::splat(1.0);
        let center = corner + Vec3::splat(radius * 2.0);
        assert!(!sphere_box_overlap(
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
            center,
            radius
        ));
    }
}
