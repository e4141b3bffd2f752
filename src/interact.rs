//! Drawers and the hiding-spot reveal checks.

use glam::{Mat4, Vec3};

use crate::collide::box_overlap;
use crate::scene::{ObjectId, PieceSet, Scene, SceneError};

const DRAWER_SPEED: f32 = 2.0;
/// Drawer travel limits along world Z.
const DRAWER_OPEN_Z: f32 = -5.6;
const DRAWER_CLOSED_Z: f32 = -6.0;

/// Open/closed targets for the two console-table drawers.
#[derive(Debug, Default, Clone, Copy)]
pub struct Drawers {
    pub left_open: bool,
    pub right_open: bool,
}

impl Drawers {
    /// Slides each drawer a step toward its target. A drawer stops at the
    /// end of its travel, or early when the player is standing in the way.
    /// The left drawer carries the black king along while the king is still
    /// hidden inside it.
    pub fn update(
        &self,
        dt: f32,
        scene: &mut Scene,
        pieces: &PieceSet,
        player: ObjectId,
    ) -> Result<(), SceneError> {
        let dz = dt * DRAWER_SPEED;
        self.slide(scene, pieces, player, "drawer_left", self.left_open, dz, true)?;
        self.slide(scene, pieces, player, "drawer_right", self.right_open, dz, false)?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn slide(
        &self,
        scene: &mut Scene,
        pieces: &PieceSet,
        player: ObjectId,
        name: &str,
        open: bool,
        dz: f32,
        carries_king: bool,
    ) -> Result<(), SceneError> {
        let drawer = scene.get(name)?;
        let step = if open {
            if drawer.position().z <= DRAWER_OPEN_Z {
                Some(dz)
            } else {
                None
            }
        } else if drawer.position().z >= DRAWER_CLOSED_Z {
            Some(-dz)
        } else {
            None
        };
        let Some(step) = step else {
            return Ok(());
        };

        let mut displaced = drawer.clone();
        displaced.translate(Vec3::new(0.0, 0.0, dz));
        if box_overlap(scene.object(player), &displaced) {
            return Ok(());
        }

        scene
            .get_mut(name)?
            .translate(Vec3::new(0.0, 0.0, step));

        if carries_king {
            let rest = pieces.rest_model("black_king")?.w_axis;
            let king = scene.get_mut("black_king")?;
            if king.model.w_axis != rest {
                king.translate(Vec3::new(0.0, 0.0, step));
            }
        }
        Ok(())
    }
}

/// One hiding spot: inspecting `container` reveals `piece` once the
/// container has been turned so its reveal axis faces the camera.
#[derive(Debug, Clone, Copy)]
pub struct HidingSpot {
    pub container: &'static str,
    pub piece: &'static str,
    pub axis: Vec3,
    pub threshold: f32,
}

/// The three containers a piece can be tucked into. The remaining missing
/// pieces lie in the open and are collected by inspecting them directly.
pub const HIDING_SPOTS: [HidingSpot; 3] = [
    HidingSpot {
        container: "bowl",
        piece: "white_king",
        axis: Vec3::Y,
        threshold: 1.0,
    },
    HidingSpot {
        container: "drawer_left",
        piece: "black_king",
        axis: Vec3::Y,
        threshold: 1.2,
    },
    HidingSpot {
        container: "chair",
        piece: "left_white_bishop",
        axis: Vec3::new(0.0, -1.0, 0.0),
        threshold: 0.0,
    },
];

pub fn spot_for(container: &str) -> Option<(usize, &'static HidingSpot)> {
    HIDING_SPOTS
        .iter()
        .enumerate()
        .find(|(_, s)| s.container == container)
}

/// Rotation applied to an inspected object from the accumulated drag
/// angles.
pub fn inspect_rotation(angles: Vec3) -> Mat4 {
    Mat4::from_rotation_z(angles.z)
        * Mat4::from_rotation_y(angles.y)
        * Mat4::from_rotation_x(angles.x)
}

/// True when the rotated reveal axis points back at the camera hard enough.
///
/// `view` is the unnormalized inspect view vector, so the thresholds are in
/// units of the camera-to-object distance.
pub fn reveal_visible(spot: &HidingSpot, angles: Vec3, view: Vec3) -> bool {
    let v = inspect_rotation(angles).transform_vector3(spot.axis);
    v.dot(-view) > spot.threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collide::Aabb;
    use crate::scene::{MeshId, SceneObject};
    use std::f32::consts::PI;

    fn drawer_scene(player_pos: Vec3) -> (Scene, PieceSet, ObjectId) {
        let mut scene = Scene::new();

        let mut player = SceneObject::new("player", MeshId(0), Aabb::symmetric(1.0));
        player.set_position(player_pos);
        let player_id = scene.add(player);

        for name in ["drawer_left", "drawer_right"] {
            let mut drawer = SceneObject::new(name, MeshId(0), Aabb::symmetric(1.0));
            drawer.set_position(Vec3::new(5.0, -1.0, -6.0));
            scene.add(drawer);
        }

        let mut king = SceneObject::new("black_king", MeshId(0), Aabb::symmetric(0.1));
        king.set_position(Vec3::new(-3.87, 0.23, -3.42));
        let king_id = scene.add(king);

        let mut pieces = PieceSet::new();
        pieces.record(&scene, king_id);

        (scene, pieces, player_id)
    }

    #[test]
    fn drawer_opens_until_its_stop() {
        let (mut scene, pieces, player) = drawer_scene(Vec3::new(0.0, 0.0, 0.0));
        let drawers = Drawers {
            left_open: true,
            right_open: false,
        };
        for _ in 0..120 {
            drawers.update(1.0 / 60.0, &mut scene, &pieces, player).unwrap();
        }
        let z = scene.get("drawer_left").unwrap().position().z;
        assert!(z > DRAWER_OPEN_Z, "drawer stuck at z = {z}");
        // The right drawer never left its closed position.
        let right = scene.get("drawer_right").unwrap().position().z;
        assert!(right <= DRAWER_CLOSED_Z);
    }

    #[test]
    fn drawer_stops_against_the_player() {
        let (mut scene, pieces, player) = drawer_scene(Vec3::new(5.0, -1.0, -5.0));
        let drawers = Drawers {
            left_open: true,
            right_open: false,
        };
        for _ in 0..60 {
            drawers.update(1.0 / 60.0, &mut scene, &pieces, player).unwrap();
        }
        assert_eq!(scene.get("drawer_left").unwrap().position().z, -6.0);
    }

    #[test]
    fn left_drawer_carries_the_hidden_king() {
        let (mut scene, pieces, player) = drawer_scene(Vec3::ZERO);
        // Hide the king away from its rest square, as the level does.
        scene
            .get_mut("black_king")
            .unwrap()
            .set_position(Vec3::new(4.5, 0.63, -6.0));
        let before = scene.get("black_king").unwrap().position();

        let drawers = Drawers {
            left_open: true,
            right_open: false,
        };
        drawers.update(0.1, &mut scene, &pieces, player).unwrap();
        let after = scene.get("black_king").unwrap().position();
        assert!(after.z > before.z);

        // Once back at rest the king stays put.
        let rest = pieces.rest_model("black_king").unwrap();
        scene.get_mut("black_king").unwrap().model = rest;
        drawers.update(0.1, &mut scene, &pieces, player).unwrap();
        assert_eq!(
            scene.get("black_king").unwrap().position(),
            rest.w_axis.truncate()
        );
    }

    #[test]
    fn reveal_requires_the_right_orientation() {
        let spot = &HIDING_SPOTS[0]; // bowl, +Y axis, threshold 1.0
        let view = Vec3::new(0.0, 2.0, 0.0); // looking straight up at it

        // Untouched bowl: +Y against -view = (0,-2,0) gives -2.
        assert!(!reveal_visible(spot, Vec3::ZERO, view));

        // Flipped upside down around X: +Y maps to -Y, dot = 2 > 1.
        assert!(reveal_visible(spot, Vec3::new(PI, 0.0, 0.0), view));
    }

    #[test]
    fn chair_reveal_uses_the_negative_axis() {
        let (_, spot) = spot_for("chair").unwrap();
        // Looking down at the chair from above.
        let view = Vec3::new(0.0, -1.5, 0.0);
        // Untouched: -Y against -view = (0,1.5,0) gives -1.5, below 0.
        assert!(!reveal_visible(spot, Vec3::ZERO, view));
        // Flipped: dot becomes +1.5.
        assert!(reveal_visible(spot, Vec3::new(PI, 0.0, 0.0), view));
    }

    #[test]
    fn spots_are_looked_up_by_container() {
        assert!(spot_for("bowl").is_some());
        assert!(spot_for("drawer_left").is_some());
        assert!(spot_for("sofa").is_none());
    }
}
