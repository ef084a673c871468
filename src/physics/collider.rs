//! Collider component: shape, dimensions, and world pose.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Collision shape of an entity.
///
/// Only axis-pair boxes and circles are supported; arbitrary convex polygons
/// are out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Box { half_extents: Vec2 },
    Circle { radius: f32 },
}

impl Shape {
    /// Box shape from full width and height.
    ///
    /// Non-positive or non-finite dimensions degrade to a unit box with a
    /// warning; the narrow phase must never see a zero-area shape.
    pub fn boxed(width: f32, height: f32) -> Self {
        if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
            log::warn!(
                "invalid box dimensions {}x{}, degrading to unit box",
                width,
                height
            );
            return Shape::Box {
                half_extents: Vec2::splat(0.5),
            };
        }
        Shape::Box {
            half_extents: Vec2::new(width * 0.5, height * 0.5),
        }
    }

    /// Circle shape from its radius.
    pub fn circle(radius: f32) -> Self {
        if !(radius > 0.0) || !radius.is_finite() {
            log::warn!("invalid circle radius {}, degrading to radius 0.5", radius);
            return Shape::Circle { radius: 0.5 };
        }
        Shape::Circle { radius }
    }

    /// Circle shape from a persisted diameter. The external layer stores
    /// circle size in the same `dimension` field as box width, so the stored
    /// value is a diameter.
    pub fn circle_from_diameter(diameter: f32) -> Self {
        Shape::circle(diameter * 0.5)
    }
}

/// Collider component.
///
/// The pose here is the authoritative transform of the entity as far as
/// physics is concerned; the solver's integration step writes it back every
/// tick and external editing may overwrite it between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub shape: Shape,
    /// World position of the shape center.
    pub position: Vec2,
    /// Rotation in radians, counter-clockwise.
    pub rotation: f32,
}

impl Collider {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            position: Vec2::ZERO,
            rotation: 0.0,
        }
    }

    pub fn at(shape: Shape, position: Vec2) -> Self {
        Self {
            shape,
            position,
            rotation: 0.0,
        }
    }
}
