//! Narrow phase: exact shape-pair tests producing contact manifolds.
//!
//! `collide` never fails; degenerate or non-colliding input yields an empty
//! manifold. Every numeric degeneracy (coincident centers, zero-length
//! normals) has a deterministic fallback so no contact ever carries NaN.

mod box_box;
mod circle;

use glam::Vec2;

use super::{Collider, Shape};

pub use box_box::collide_box_box;
pub use circle::{collide_box_circle, collide_circle_box, collide_circle_circle};

/// A manifold holds at most two points.
pub const MAX_CONTACT_POINTS: usize = 2;

/// Edge tag on a box, counter-clockwise from the +x face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeId {
    #[default]
    None,
    Edge1,
    Edge2,
    Edge3,
    Edge4,
}

/// Identifies which edges of the two shapes generated a contact point.
///
/// Fields 1 refer to the first collider of the pair, fields 2 to the second.
/// Matching feature ids across solves is what lets the arbiter carry
/// accumulated impulses forward; the ids must therefore stay comparable
/// frame-to-frame, which [`FeatureId::flip`] guarantees when the reference
/// face switches between the two boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureId {
    pub in_edge_1: EdgeId,
    pub out_edge_1: EdgeId,
    pub in_edge_2: EdgeId,
    pub out_edge_2: EdgeId,
}

impl FeatureId {
    /// Swap the per-collider fields, for manifolds whose reference face
    /// belongs to the second collider.
    pub fn flip(&mut self) {
        std::mem::swap(&mut self.in_edge_1, &mut self.in_edge_2);
        std::mem::swap(&mut self.out_edge_1, &mut self.out_edge_2);
    }
}

/// A single contact point between two colliders.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Contact {
    /// Contact position in world space.
    pub position: Vec2,
    /// Unit normal, pointing from the first collider toward the second.
    pub normal: Vec2,
    /// Signed distance along the normal; negative means penetrating.
    pub separation: f32,
    /// Accumulated normal impulse (solver state, warm-started).
    pub normal_impulse: f32,
    /// Accumulated tangent (friction) impulse (solver state, warm-started).
    pub tangent_impulse: f32,
    /// Accumulated bias impulse, carried for the split-bias solver variant.
    pub bias_impulse: f32,
    /// Contact offset from the first body's center, computed in the pre-step.
    pub r1: Vec2,
    /// Contact offset from the second body's center, computed in the pre-step.
    pub r2: Vec2,
    /// Effective mass along the normal, computed in the pre-step.
    pub mass_normal: f32,
    /// Effective mass along the tangent, computed in the pre-step.
    pub mass_tangent: f32,
    /// Baumgarte bias velocity, computed in the pre-step.
    pub bias: f32,
    pub feature: FeatureId,
}

/// Shape-pair dispatch.
///
/// Writes up to [`MAX_CONTACT_POINTS`] contacts and returns how many were
/// produced. Contact normals always point from `a` toward `b`.
pub fn collide(contacts: &mut [Contact; MAX_CONTACT_POINTS], a: &Collider, b: &Collider) -> usize {
    match (a.shape, b.shape) {
        (Shape::Box { .. }, Shape::Box { .. }) => collide_box_box(contacts, a, b),
        (Shape::Circle { .. }, Shape::Circle { .. }) => collide_circle_circle(contacts, a, b),
        (Shape::Circle { .. }, Shape::Box { .. }) => collide_circle_box(contacts, a, b),
        (Shape::Box { .. }, Shape::Circle { .. }) => collide_box_circle(contacts, a, b),
    }
}
