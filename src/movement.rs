//! Player movement with per-axis sliding collision.

use glam::Vec3;

use crate::collide::{box_overlap, sphere_box_overlap};
use crate::scene::{Collider, ObjectId, Scene, SceneObject};

/// Directions held this frame. The flags compose; each one is tested and
/// applied independently, axis by axis.
#[derive(Debug, Default, Clone, Copy)]
pub struct MoveIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MoveIntent {
    pub fn any_horizontal(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// Advances `position` by the held directions.
///
/// For every direction held, the X and Z components of the displacement are
/// tested separately against each collidable object in `colliders`, using
/// the object's collider shape. An intersection vetoes only that
/// (direction, axis) pair; every surviving component is applied afterwards,
/// which makes the player slide along obstacles instead of sticking to them.
///
/// `w` points away from the view (its negation moves forward) and `u`
/// points right; both are horizontal unit vectors. Vertical debug movement
/// skips collision entirely.
#[allow(clippy::too_many_arguments)]
pub fn slide_move(
    scene: &Scene,
    colliders: &[ObjectId],
    player: ObjectId,
    position: Vec3,
    intent: MoveIntent,
    w: Vec3,
    u: Vec3,
    dt: f32,
    speed: f32,
) -> Vec3 {
    let step = dt * speed;
    let dirs = [
        (intent.forward, -w),
        (intent.backward, w),
        (intent.right, u),
        (intent.left, -u),
    ];
    // [direction][axis], axis 0 = X, axis 1 = Z
    let mut vetoed = [[false; 2]; 4];
    let probe = scene.object(player);

    for &id in colliders {
        let obj = scene.object(id);
        if !obj.collidable {
            continue;
        }
        for (d, &(held, dir)) in dirs.iter().enumerate() {
            if !held {
                continue;
            }
            let mut probe_x = probe.clone();
            probe_x.set_position(Vec3::new(
                position.x + dir.x * step,
                position.y,
                position.z,
            ));
            let mut probe_z = probe.clone();
            probe_z.set_position(Vec3::new(
                position.x,
                position.y,
                position.z + dir.z * step,
            ));

            let hits = |p: &SceneObject| match obj.collider {
                Collider::Sphere { radius } => {
                    sphere_box_overlap(p.world_min(), p.world_max(), obj.world_center(), radius)
                }
                Collider::Box => box_overlap(p, obj),
            };
            if hits(&probe_x) {
                vetoed[d][0] = true;
            }
            if hits(&probe_z) {
                vetoed[d][1] = true;
            }
        }
    }

    let mut next = position;
    for (d, &(held, dir)) in dirs.iter().enumerate() {
        if !held {
            continue;
        }
        if !vetoed[d][0] {
            next.x += dir.x * step;
        }
        if !vetoed[d][1] {
            next.z += dir.z * step;
        }
    }

    if intent.up {
        next.y += (u.y + 1.0) * step;
    }
    if intent.down {
        next.y -= (u.y + 1.0) * step;
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collide::Aabb;
    use crate::scene::{MeshId, SceneObject};

    fn setup(wall_position: Vec3, wall_half: Vec3) -> (Scene, Vec<ObjectId>, ObjectId) {
        let mut scene = Scene::new();
        let mut player = SceneObject::new("player", MeshId(0), Aabb::symmetric(0.5));
        player.set_position(Vec3::ZERO);
        let player_id = scene.add(player);

        let mut wall = SceneObject::new(
            "wall",
            MeshId(0),
            Aabb::new(-wall_half, wall_half),
        );
        wall.set_position(wall_position);
        let wall_id = scene.add(wall);

        (scene, vec![wall_id], player_id)
    }

    #[test]
    fn blocked_axis_is_vetoed_while_the_other_slides() {
        // A wall just ahead on +X; moving diagonally into it should keep
        // the Z component of the motion.
        let (scene, group, player) = setup(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.2, 1.0, 5.0));
        let intent = MoveIntent {
            forward: true,
            ..Default::default()
        };
        // Forward applies -w, so -w = (1, 0, 1) normalized.
        let w = Vec3::new(-1.0, 0.0, -1.0).normalize();
        let next = slide_move(
            &scene,
            &group,
            player,
            Vec3::ZERO,
            intent,
            w,
            Vec3::ZERO,
            1.0,
            1.0,
        );
        assert_eq!(next.x, 0.0);
        assert!(next.z > 0.0);
    }

    #[test]
    fn open_space_applies_both_axes() {
        let (scene, group, player) = setup(Vec3::new(50.0, 0.0, 0.0), Vec3::splat(1.0));
        let intent = MoveIntent {
            forward: true,
            ..Default::default()
        };
        let w = Vec3::new(-1.0, 0.0, -1.0).normalize();
        let next = slide_move(
            &scene,
            &group,
            player,
            Vec3::ZERO,
            intent,
            w,
            Vec3::ZERO,
            1.0,
            1.0,
        );
        assert!(next.x > 0.0 && next.z > 0.0);
    }

    #[test]
    fn non_collidable_objects_never_veto() {
        let (mut scene, group, player) = setup(Vec3::new(1.0, 0.0, 0.0), Vec3::splat(1.0));
        scene.object_mut(group[0]).collidable = false;
        let intent = MoveIntent {
            forward: true,
            ..Default::default()
        };
        let next = slide_move(
            &scene,
            &group,
            player,
            Vec3::ZERO,
            intent,
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::ZERO,
            1.0,
            1.0,
        );
        assert_eq!(next.x, 1.0);
    }

    #[test]
    fn sphere_colliders_use_the_sphere_test() {
        let (mut scene, group, player) = setup(Vec3::new(1.2, 0.0, 0.0), Vec3::splat(0.01));
        scene.object_mut(group[0]).collider = Collider::Sphere { radius: 0.5 };
        let intent = MoveIntent {
            forward: true,
            ..Default::default()
        };
        let next = slide_move(
            &scene,
            &group,
            player,
            Vec3::ZERO,
            intent,
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::ZERO,
            1.0,
            0.5,
        );
        // The displaced player box reaches x = 1.0, inside the sphere.
        assert_eq!(next.x, 0.0);
    }

    #[test]
    fn vertical_debug_movement_ignores_collision() {
        let (scene, group, player) = setup(Vec3::ZERO, Vec3::splat(10.0));
        let intent = MoveIntent {
            up: true,
            ..Default::default()
        };
        let next = slide_move(
            &scene,
            &group,
            player,
            Vec3::ZERO,
            intent,
            Vec3::X,
            Vec3::new(0.0, 0.0, 1.0),
            0.5,
            2.0,
        );
        assert_eq!(next.y, 1.0);
    }

    #[test]
    fn opposed_directions_cancel_out() {
        let (scene, group, player) = setup(Vec3::new(50.0, 0.0, 0.0), Vec3::splat(1.0));
        let intent = MoveIntent {
            forward: true,
            backward: true,
            ..Default::default()
        };
        let next = slide_move(
            &scene,
            &group,
            player,
            Vec3::ZERO,
            intent,
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::ZERO,
            1.0,
            1.0,
        );
        assert_eq!(next, Vec3::ZERO);
    }
}
