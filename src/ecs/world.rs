use rustc_hash::FxHashMap;

use super::{EcsError, EcsResult, Entity, EntityManager};
use crate::physics::{Collider, RigidBody};

/// Component tables for the physics subsystem.
///
/// Storage is restricted to the two component kinds this core needs; each is
/// a plain hash map keyed by entity. Hash maps have no inherent order, so the
/// filtered views ([`EcsWorld::collider_entities`],
/// [`EcsWorld::physics_entities`]) return sorted ids — solver output is
/// order-sensitive and every order-sensitive iteration goes through them.
pub struct EcsWorld {
    entities: EntityManager,
    colliders: FxHashMap<Entity, Collider>,
    bodies: FxHashMap<Entity, RigidBody>,
}

impl EcsWorld {
    pub fn new() -> Self {
        Self {
            entities: EntityManager::new(),
            colliders: FxHashMap::default(),
            bodies: FxHashMap::default(),
        }
    }

    pub fn spawn(&mut self) -> Entity {
        self.entities.create()
    }

    /// Destroy an entity and clear its components.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        self.colliders.remove(&entity);
        self.bodies.remove(&entity);
        self.entities.destroy(entity)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.exists(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.count()
    }

    pub fn insert_collider(&mut self, entity: Entity, collider: Collider) -> EcsResult<()> {
        if !self.entities.exists(entity) {
            return Err(EcsError::DeadEntity(entity));
        }
        self.colliders.insert(entity, collider);
        Ok(())
    }

    pub fn insert_body(&mut self, entity: Entity, body: RigidBody) -> EcsResult<()> {
        if !self.entities.exists(entity) {
            return Err(EcsError::DeadEntity(entity));
        }
        self.bodies.insert(entity, body);
        Ok(())
    }

    pub fn remove_collider(&mut self, entity: Entity) -> Option<Collider> {
        self.colliders.remove(&entity)
    }

    pub fn remove_body(&mut self, entity: Entity) -> Option<RigidBody> {
        self.bodies.remove(&entity)
    }

    pub fn collider(&self, entity: Entity) -> Option<&Collider> {
        self.colliders.get(&entity)
    }

    pub fn collider_mut(&mut self, entity: Entity) -> Option<&mut Collider> {
        self.colliders.get_mut(&entity)
    }

    pub fn body(&self, entity: Entity) -> Option<&RigidBody> {
        self.bodies.get(&entity)
    }

    pub fn body_mut(&mut self, entity: Entity) -> Option<&mut RigidBody> {
        self.bodies.get_mut(&entity)
    }

    /// Fallible collider accessor for callers that treat absence as an error.
    pub fn expect_collider(&self, entity: Entity) -> EcsResult<&Collider> {
        self.colliders
            .get(&entity)
            .ok_or(EcsError::MissingComponent(entity, "Collider"))
    }

    /// Fallible body accessor for callers that treat absence as an error.
    pub fn expect_body(&self, entity: Entity) -> EcsResult<&RigidBody> {
        self.bodies
            .get(&entity)
            .ok_or(EcsError::MissingComponent(entity, "RigidBody"))
    }

    /// Mutable access to two distinct bodies at once, for impulse
    /// application. Returns `None` if either body is missing or the entities
    /// are the same.
    pub fn body_pair_mut(
        &mut self,
        a: Entity,
        b: Entity,
    ) -> Option<(&mut RigidBody, &mut RigidBody)> {
        if a == b {
            return None;
        }
        match self.bodies.get_disjoint_mut([&a, &b]) {
            [Some(body_a), Some(body_b)] => Some((body_a, body_b)),
            _ => None,
        }
    }

    /// Entities carrying a collider, in ascending id order.
    pub fn collider_entities(&self) -> Vec<Entity> {
        let mut out: Vec<Entity> = self.colliders.keys().copied().collect();
        out.sort_unstable();
        out
    }

    /// Entities carrying both a collider and a rigid body, in ascending id
    /// order. This is the signature filter for the solver.
    pub fn physics_entities(&self) -> Vec<Entity> {
        let mut out: Vec<Entity> = self
            .bodies
            .keys()
            .filter(|e| self.colliders.contains_key(e))
            .copied()
            .collect();
        out.sort_unstable();
        out
    }
}

impl Default for EcsWorld {
    fn default() -> Self {
        Self::new()
    }
}
