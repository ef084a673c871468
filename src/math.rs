//! Small 2D helpers on top of glam that the solver and narrow phase share.

use glam::{Mat2, Vec2};

/// Scalar 2D cross product: the z component of the 3D cross of `(a, 0)` and
/// `(b, 0)`.
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.perp_dot(b)
}

/// Cross of a scalar angular velocity with an offset vector: `w x r`.
///
/// Gives the velocity contribution of rotation at a point offset `r` from the
/// center of mass.
#[inline]
pub fn cross_scalar(w: f32, r: Vec2) -> Vec2 {
    Vec2::new(-w * r.y, w * r.x)
}

/// Tangent of a unit normal, `cross(n, 1)`. Friction impulses act along this.
#[inline]
pub fn tangent(n: Vec2) -> Vec2 {
    Vec2::new(n.y, -n.x)
}

/// Component-wise absolute value of a rotation matrix.
///
/// Used to project rotated half-extents onto the world axes when computing a
/// bounding box, and onto the other box's axes in the SAT.
#[inline]
pub fn mat2_abs(m: Mat2) -> Mat2 {
    Mat2::from_cols(m.x_axis.abs(), m.y_axis.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_is_antisymmetric() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, -4.0);
        assert_eq!(cross(a, b), -cross(b, a));
        assert_eq!(cross(Vec2::X, Vec2::Y), 1.0);
    }

    #[test]
    fn test_cross_scalar_is_perpendicular() {
        let r = Vec2::new(2.0, 1.0);
        let v = cross_scalar(3.0, r);
        assert!(v.dot(r).abs() < 1e-6);
        assert!((v.length() - 3.0 * r.length()).abs() < 1e-5);
    }

    #[test]
    fn test_tangent_is_perpendicular_to_normal() {
        let n = Vec2::new(0.6, 0.8);
        let t = tangent(n);
        assert!(n.dot(t).abs() < 1e-6);
        assert!((t.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_mat2_abs() {
        let m = Mat2::from_angle(std::f32::consts::FRAC_PI_2);
        let a = mat2_abs(m);
        assert!(a.x_axis.x >= 0.0 && a.x_axis.y >= 0.0);
        assert!(a.y_axis.x >= 0.0 && a.y_axis.y >= 0.0);
    }
}
