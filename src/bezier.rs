//! De Casteljau evaluation over an arbitrary run of control points.

use glam::Vec3;

/// Evaluates the Bezier curve defined by `points` at parameter `t`.
///
/// `t` is clamped at zero but not at one; values past the end extrapolate,
/// which the camera animations rely on for their final frames.
pub fn bezier_point(points: &[Vec3], t: f32) -> Vec3 {
    let t = t.max(0.0);
    let mut tmp = points.to_vec();
    let mut n = tmp.len().saturating_sub(1);
    while n > 0 {
        for i in 0..n {
            tmp[i] = tmp[i] + t * (tmp[i + 1] - tmp[i]);
        }
        n -= 1;
    }
    tmp.first().copied().unwrap_or(Vec3::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_exact() {
        let points = [
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(4.0, 0.0, -1.0),
            Vec3::new(2.0, 5.0, 7.0),
        ];
        assert_eq!(bezier_point(&points, 0.0), points[0]);
        assert_eq!(bezier_point(&points, 1.0), points[2]);
    }

    #[test]
    fn two_points_interpolate_linearly() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(2.0, 4.0, -6.0);
        assert_eq!(bezier_point(&[a, b], 0.5), Vec3::new(1.0, 2.0, -3.0));
        // Past the end the segment extrapolates.
        assert_eq!(bezier_point(&[a, b], 1.5), Vec3::new(3.0, 6.0, -9.0));
    }

    #[test]
    fn negative_parameters_clamp_to_the_start() {
        let a = Vec3::new(1.0, 1.0, 1.0);
        let b = Vec3::new(5.0, 5.0, 5.0);
        assert_eq!(bezier_point(&[a, b], -2.0), a);
    }

    #[test]
    fn quadratic_midpoint_matches_the_closed_form() {
        let p0 = Vec3::ZERO;
        let p1 = Vec3::new(2.0, 2.0, 0.0);
        let p2 = Vec3::new(4.0, 0.0, 0.0);
        // B(0.5) = 0.25 p0 + 0.5 p1 + 0.25 p2
        assert_eq!(bezier_point(&[p0, p1, p2], 0.5), Vec3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn empty_input_is_harmless() {
        assert_eq!(bezier_point(&[], 0.3), Vec3::ZERO);
    }
}
