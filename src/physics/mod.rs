//! Rigid-body physics: broad phase, narrow phase, contact caching, solver,
//! raycast.

pub mod aabb;
pub mod arbiter;
pub mod body;
pub mod collider;
pub mod narrow_phase;
pub mod quadtree;
pub mod raycast;
pub mod solver;
pub mod systems;

pub use aabb::Aabb;
pub use arbiter::{Arbiter, ArbiterKey, ArbiterTable, CachePolicy};
pub use body::{BodyDef, RigidBody};
pub use collider::{Collider, Shape};
pub use narrow_phase::{collide, Contact, FeatureId, MAX_CONTACT_POINTS};
pub use quadtree::Quadtree;
pub use raycast::{raycast, Ray, RaycastHit};
pub use systems::{
    CollisionConfig, CollisionEvent, CollisionSystem, DebugDraw, PhysicsConfig, PhysicsSystem,
};

use glam::Vec2;

/// Default gravity, in world units per second squared.
pub const GRAVITY: Vec2 = Vec2::new(0.0, -10.0);

/// Fixed timestep the external driver is expected to accumulate against.
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Impulse iterations per solve.
pub const SOLVER_ITERATIONS: usize = 10;

/// Fraction of remaining penetration corrected per step (Baumgarte).
pub const BIAS_FACTOR: f32 = 0.2;

/// Penetration depth tolerated before the bias kicks in.
pub const ALLOWED_PENETRATION: f32 = 0.0;

/// Mass at or above which a body is treated as static (infinite mass).
/// Invalid body configurations degrade to this sentinel instead of producing
/// NaN.
pub const STATIC_MASS: f32 = 1.0e12;
