//! First-person camera with the projection used everywhere in the game.

use std::f32::consts::FRAC_PI_3;

use glam::{Mat4, Vec3};

/// A look-direction camera.
///
/// `forward` is stored unnormalized on purpose: gameplay code treats its
/// length as the camera distance (picking ranges and reveal thresholds are
/// expressed in multiples of it). It is normalized only when the view
/// matrix is built.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward,
            up: Vec3::Y,
            fov: FRAC_PI_3,
            near: 0.1,
            far: 50.0,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        let dir = self.forward.normalize_or(Vec3::NEG_Z);
        Mat4::look_to_rh(self.position, dir, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_matrix_moves_the_eye_to_the_origin() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -3.5));
        let eye = camera.view_matrix() * Vec3::new(0.0, 0.0, 5.0).extend(1.0);
        assert!(eye.truncate().length() < 1e-5);
        // A point one unit ahead lands on the -Z view axis.
        let ahead = camera.view_matrix() * Vec3::new(0.0, 0.0, 4.0).extend(1.0);
        assert!((ahead.truncate() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn forward_length_does_not_change_the_view() {
        let short = Camera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let long = Camera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -3.5));
        assert_eq!(short.view_matrix(), long.view_matrix());
    }

    #[test]
    fn projection_keeps_points_inside_the_clip_range() {
        let camera = Camera::new(Vec3::ZERO, Vec3::NEG_Z);
        let vp = camera.view_projection(16.0 / 9.0);
        let mid = vp * Vec3::new(0.0, 0.0, -10.0).extend(1.0);
        let ndc_z = mid.z / mid.w;
        assert!((0.0..=1.0).contains(&ndc_z));
    }
}
