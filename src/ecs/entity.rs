use rustc_hash::FxHashSet;

/// Unique identifier for an entity.
///
/// Ids are plain `u32`s and order deterministically; every order-sensitive
/// iteration in the physics step sorts by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity(pub u32);

impl Entity {
    pub const INVALID: Entity = Entity(u32::MAX);
}

/// Allocates and recycles entity ids.
///
/// Freed ids go back on a stack and are handed out again before fresh ones,
/// keeping the id space dense so sorted entity sets stay cheap.
pub struct EntityManager {
    next_id: u32,
    alive: FxHashSet<Entity>,
    free_ids: Vec<u32>,
}

impl EntityManager {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            alive: FxHashSet::default(),
            free_ids: Vec::new(),
        }
    }

    /// Allocate an entity, reusing a freed id when one is available.
    pub fn create(&mut self) -> Entity {
        let id = self.free_ids.pop().unwrap_or_else(|| {
            let id = self.next_id;
            self.next_id += 1;
            id
        });
        let entity = Entity(id);
        self.alive.insert(entity);
        entity
    }

    /// Release an entity id. Returns false if it was not alive.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if !self.alive.remove(&entity) {
            return false;
        }
        self.free_ids.push(entity.0);
        true
    }

    pub fn exists(&self, entity: Entity) -> bool {
        self.alive.contains(&entity)
    }

    pub fn count(&self) -> usize {
        self.alive.len()
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_creation() {
        let mut manager = EntityManager::new();
        let e1 = manager.create();
        let e2 = manager.create();

        assert_ne!(e1, e2);
        assert!(manager.exists(e1));
        assert!(manager.exists(e2));
        assert_eq!(manager.count(), 2);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut manager = EntityManager::new();
        let entity = manager.create();

        assert!(manager.destroy(entity));
        assert!(!manager.exists(entity));
        assert_eq!(manager.count(), 0);
        assert!(!manager.destroy(entity));
    }

    #[test]
    fn test_id_recycling() {
        let mut manager = EntityManager::new();
        let e1 = manager.create();
        let id1 = e1.0;

        manager.destroy(e1);
        let e2 = manager.create();
        assert_eq!(e2.0, id1);
    }

    #[test]
    fn test_entity_ordering_is_by_id() {
        assert!(Entity(1) < Entity(2));
        assert!(Entity(2) < Entity::INVALID);
    }
}
