//! Segment raycasts against box colliders.
//!
//! Rays are finite segments (`origin` plus `direction * max_distance`). Each
//! box is tested in its own local frame with a slab test, so rotation costs
//! one inverse transform per candidate. Circle colliders are not hit by rays;
//! neither are boxes the ray starts inside of.

use glam::{Mat2, Vec2};

use crate::ecs::{EcsWorld, Entity};

use super::{Collider, Shape};

/// A finite ray segment.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec2,
    /// Direction, not required to be normalized.
    pub direction: Vec2,
    /// Length of the segment in units of `direction`'s length.
    pub max_distance: f32,
}

impl Ray {
    pub fn new(origin: Vec2, direction: Vec2, max_distance: f32) -> Self {
        Self {
            origin,
            direction,
            max_distance,
        }
    }

    /// Point at parameter `t`, where `t = 1` is the segment end.
    pub fn point_at(&self, t: f32) -> Vec2 {
        self.origin + self.direction * self.max_distance * t
    }
}

/// A raycast hit.
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    pub entity: Entity,
    /// Hit point in world space.
    pub point: Vec2,
    /// Surface normal at the hit point, facing the ray origin.
    pub normal: Vec2,
    /// Hit parameter in `[0, 1]` along the segment.
    pub t: f32,
}

/// Cast a segment against every box collider in the world and return the
/// closest hit.
///
/// `ignore` excludes one entity, typically the caster's own collider. Ties at
/// identical `t` resolve to the lower entity id, which keeps results stable
/// across runs. A zero-length direction hits nothing.
pub fn raycast(world: &EcsWorld, ray: &Ray, ignore: Option<Entity>) -> Option<RaycastHit> {
    if ray.direction == Vec2::ZERO || ray.max_distance <= 0.0 {
        return None;
    }
    let segment = ray.direction * ray.max_distance;

    let mut best: Option<RaycastHit> = None;
    // collider_entities is sorted by id, so the strict `<` below makes the
    // lower id win exact ties
    for entity in world.collider_entities() {
        if ignore == Some(entity) {
            continue;
        }
        let Some(collider) = world.collider(entity) else {
            continue;
        };
        let Some((t, local_normal, rot)) = ray_vs_box(ray.origin, segment, collider) else {
            continue;
        };
        if best.map_or(true, |hit| t < hit.t) {
            best = Some(RaycastHit {
                entity,
                point: ray.point_at(t),
                normal: rot * local_normal,
                t,
            });
        }
    }
    best
}

/// Slab test of a segment against one box, in the box's local frame.
///
/// Returns the entry parameter, the local-space entry normal, and the box
/// rotation for mapping the normal back to world space. Segments that start
/// inside the box return `None`.
fn ray_vs_box(origin: Vec2, segment: Vec2, collider: &Collider) -> Option<(f32, Vec2, Mat2)> {
    let Shape::Box { half_extents: h } = collider.shape else {
        return None;
    };

    let rot = Mat2::from_angle(collider.rotation);
    let inv_rot = rot.transpose();
    let local_origin = inv_rot * (origin - collider.position);
    let local_dir = inv_rot * segment;

    let mut t_min = 0.0_f32;
    let mut t_max = 1.0_f32;
    let mut entry_normal = Vec2::ZERO;

    for axis in 0..2 {
        let o = local_origin[axis];
        let d = local_dir[axis];
        let extent = h[axis];

        if d.abs() < f32::EPSILON {
            // parallel to this slab: miss unless already between the faces
            if o.abs() > extent {
                return None;
            }
            continue;
        }

        let inv_d = 1.0 / d;
        let mut t1 = (-extent - o) * inv_d;
        let mut t2 = (extent - o) * inv_d;
        let mut face_normal = if d > 0.0 { -1.0 } else { 1.0 };
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
            face_normal = -face_normal;
        }

        if t1 > t_min {
            t_min = t1;
            entry_normal = Vec2::ZERO;
            entry_normal[axis] = face_normal;
        }
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }

    // entry_normal still zero means the segment started inside the box
    if entry_normal == Vec2::ZERO {
        return None;
    }
    Some((t_min, entry_normal, rot))
}
