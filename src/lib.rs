//! Rigid-body physics and collision for a 2D game engine.
//!
//! The subsystem is split into a broad phase (quadtree rebuilt every step),
//! a narrow phase (exact shape-pair tests producing contact manifolds), a
//! persistent per-pair contact cache (arbiters, enabling warm starting), and
//! a sequential-impulse constraint solver. A raycast query runs against the
//! same collider data.
//!
//! Collider and rigid-body components live in an [`ecs::EcsWorld`] that is
//! passed explicitly into the systems; there are no globals. One simulation
//! tick looks like:
//!
//! ```no_run
//! use flat_engine::ecs::EcsWorld;
//! use flat_engine::physics::{CollisionSystem, PhysicsSystem, FIXED_TIMESTEP};
//!
//! let mut world = EcsWorld::new();
//! let mut collision = CollisionSystem::new(Default::default());
//! let mut physics = PhysicsSystem::new(Default::default());
//!
//! physics.pre_collision_update(&mut world, FIXED_TIMESTEP);
//! let events = collision.run(&world);
//! physics.post_collision_update(&mut world, FIXED_TIMESTEP, &events);
//! ```

pub mod ecs;
pub mod math;
pub mod physics;

pub use ecs::{EcsWorld, Entity};
pub use physics::{
    Aabb, Arbiter, ArbiterKey, CollisionSystem, PhysicsSystem, Ray, RaycastHit, RigidBody,
};
