//! Minimal entity/component storage for the physics subsystem.
//!
//! The rest of the engine owns the real ECS; this module holds exactly what
//! the collision and physics systems consume: entity ids, the two component
//! tables (collider, rigid body), and signature filtering over them. The
//! world handle is passed into systems explicitly rather than reached through
//! a singleton.

pub mod entity;
pub mod world;

pub use entity::{Entity, EntityManager};
pub use world::EcsWorld;

use thiserror::Error;

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;

/// Errors from component table misuse.
///
/// Missing components during a physics step are prevented upstream by
/// signature filtering and never surface here; these errors cover direct API
/// misuse (attaching to a destroyed entity, querying a component that was
/// never inserted).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EcsError {
    #[error("entity {0:?} does not exist")]
    DeadEntity(Entity),
    #[error("entity {0:?} has no {1} component")]
    MissingComponent(Entity, &'static str),
}
