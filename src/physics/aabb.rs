//! Axis-aligned bounding boxes for the broad phase.

use glam::{Mat2, Vec2};

use crate::math::mat2_abs;

use super::{Collider, Shape};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// World-space bounding box of a collider.
///
/// Boxes project their rotated half-extents onto the world axes via the
/// absolute rotation matrix; circles ignore rotation entirely.
pub fn collider_aabb(collider: &Collider) -> Aabb {
    let extents = match collider.shape {
        Shape::Box { half_extents } => mat2_abs(Mat2::from_angle(collider.rotation)) * half_extents,
        Shape::Circle { radius } => Vec2::splat(radius),
    };
    Aabb::from_center_half_extents(collider.position, extents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn test_intersects() {
        let a = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0));
        let b = Aabb::new(Vec2::new(1.0, 1.0), Vec2::new(3.0, 3.0));
        let c = Aabb::new(Vec2::new(2.5, 2.5), Vec2::new(4.0, 4.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
        // touching edges count as intersecting
        let d = Aabb::new(Vec2::new(2.0, 0.0), Vec2::new(3.0, 1.0));
        assert!(a.intersects(&d));
    }

    #[test]
    fn test_contains_point() {
        let a = Aabb::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));
        assert!(a.contains_point(Vec2::ZERO));
        assert!(a.contains_point(Vec2::new(1.0, 1.0)));
        assert!(!a.contains_point(Vec2::new(1.1, 0.0)));
    }

    #[test]
    fn test_rotated_box_aabb_grows() {
        let mut collider = Collider::new(Shape::boxed(2.0, 2.0));
        collider.rotation = FRAC_PI_4;
        let aabb = collider_aabb(&collider);
        let expected = 2.0_f32.sqrt();
        assert!((aabb.half_extents().x - expected).abs() < 1e-5);
        assert!((aabb.half_extents().y - expected).abs() < 1e-5);
    }

    #[test]
    fn test_circle_aabb_ignores_rotation() {
        let mut collider = Collider::new(Shape::circle(0.5));
        collider.rotation = 1.3;
        collider.position = Vec2::new(2.0, 3.0);
        let aabb = collider_aabb(&collider);
        assert_eq!(aabb.min, Vec2::new(1.5, 2.5));
        assert_eq!(aabb.max, Vec2::new(2.5, 3.5));
    }
}
