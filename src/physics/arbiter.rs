//! Per-pair contact cache.
//!
//! An arbiter stores the live manifold for one collider pair plus the
//! accumulated impulses of each contact. Matching contacts by feature id when
//! a new manifold arrives is what makes warm starting work: the solver's
//! previous answer seeds the next solve instead of starting from zero.

use rustc_hash::FxHashMap;

use crate::ecs::Entity;

use super::narrow_phase::{Contact, MAX_CONTACT_POINTS};

/// Order-independent pair key: the pair is stored sorted, so
/// `ArbiterKey::new(a, b) == ArbiterKey::new(b, a)` and their hashes agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArbiterKey {
    first: Entity,
    second: Entity,
}

impl ArbiterKey {
    pub fn new(a: Entity, b: Entity) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// Lower entity id of the pair.
    pub fn first(&self) -> Entity {
        self.first
    }

    /// Higher entity id of the pair.
    pub fn second(&self) -> Entity {
        self.second
    }
}

/// Contact manifold and solver state for one collider pair.
///
/// Contact normals inside the arbiter always point from `first` toward
/// `second` in key order.
#[derive(Debug, Clone, Copy)]
pub struct Arbiter {
    pub first: Entity,
    pub second: Entity,
    /// Combined friction of the two bodies, `sqrt(f1 * f2)`.
    pub friction: f32,
    pub contacts: [Contact; MAX_CONTACT_POINTS],
    pub num_contacts: usize,
}

impl Arbiter {
    pub fn new(
        key: ArbiterKey,
        friction: f32,
        contacts: [Contact; MAX_CONTACT_POINTS],
        num_contacts: usize,
    ) -> Self {
        Self {
            first: key.first(),
            second: key.second(),
            friction,
            contacts,
            num_contacts,
        }
    }

    pub fn key(&self) -> ArbiterKey {
        ArbiterKey::new(self.first, self.second)
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts[..self.num_contacts]
    }

    /// Replace this arbiter's manifold with a fresh one, carrying accumulated
    /// impulses forward for contacts whose feature ids match.
    pub fn merge(&mut self, new_contacts: &[Contact; MAX_CONTACT_POINTS], num_new: usize) {
        let mut merged = *new_contacts;
        for contact in merged[..num_new].iter_mut() {
            if let Some(old) = self.contacts[..self.num_contacts]
                .iter()
                .find(|old| old.feature == contact.feature)
            {
                contact.normal_impulse = old.normal_impulse;
                contact.tangent_impulse = old.tangent_impulse;
                contact.bias_impulse = old.bias_impulse;
            }
        }
        self.contacts = merged;
        self.num_contacts = num_new;
    }
}

/// Cache lifetime policy for the arbiter table, a deliberate design choice
/// with observable consequences:
///
/// - [`ClearEachStep`](CachePolicy::ClearEachStep) drops every entry at the
///   start of a step. Warm-start data only survives duplicate-within-step
///   merges (the same pair arriving from two quadtree buckets), so stacks
///   jitter slightly more but no stale pair can ever linger.
/// - [`PersistAndEvict`](CachePolicy::PersistAndEvict) keeps entries alive
///   across steps and evicts a pair only when it stops overlapping. This is
///   true cross-frame warm starting and the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    ClearEachStep,
    #[default]
    PersistAndEvict,
}

/// The arbiter table, keyed by the order-independent pair key.
pub struct ArbiterTable {
    policy: CachePolicy,
    arbiters: FxHashMap<ArbiterKey, Arbiter>,
    touched: Vec<ArbiterKey>,
}

impl ArbiterTable {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            arbiters: FxHashMap::default(),
            touched: Vec::new(),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.arbiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arbiters.is_empty()
    }

    pub fn get(&self, key: &ArbiterKey) -> Option<&Arbiter> {
        self.arbiters.get(key)
    }

    pub fn get_mut(&mut self, key: &ArbiterKey) -> Option<&mut Arbiter> {
        self.arbiters.get_mut(key)
    }

    /// Start a collision step. Under `ClearEachStep` the whole table is
    /// dropped here.
    pub fn begin_step(&mut self) {
        self.touched.clear();
        if self.policy == CachePolicy::ClearEachStep {
            self.arbiters.clear();
        }
    }

    /// Merge one discovered collision into the table, warm-starting against
    /// whatever the matching entry already holds.
    pub fn insert(&mut self, arbiter: Arbiter) {
        let key = arbiter.key();
        self.touched.push(key);
        match self.arbiters.get_mut(&key) {
            Some(existing) => existing.merge(&arbiter.contacts, arbiter.num_contacts),
            None => {
                self.arbiters.insert(key, arbiter);
            }
        }
    }

    /// Finish a collision step. Under `PersistAndEvict`, pairs that were not
    /// refreshed this step have stopped overlapping and are evicted.
    pub fn end_step(&mut self) {
        if self.policy == CachePolicy::PersistAndEvict {
            self.touched.sort_unstable();
            let touched = std::mem::take(&mut self.touched);
            self.arbiters.retain(|key, _| {
                let keep = touched.binary_search(key).is_ok();
                if !keep {
                    log::trace!("evicting arbiter {:?}/{:?}", key.first(), key.second());
                }
                keep
            });
            self.touched = touched;
        }
        self.touched.clear();
    }

    /// Keys in canonical (sorted) order. The solver iterates in this order so
    /// impulse application is deterministic despite the hash-map storage.
    pub fn sorted_keys(&self) -> Vec<ArbiterKey> {
        let mut keys: Vec<ArbiterKey> = self.arbiters.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::narrow_phase::{EdgeId, FeatureId};
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(key: ArbiterKey) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    fn contact_with_feature(in_edge: EdgeId, normal_impulse: f32) -> Contact {
        Contact {
            feature: FeatureId {
                in_edge_1: in_edge,
                ..Default::default()
            },
            normal_impulse,
            tangent_impulse: normal_impulse * 0.5,
            bias_impulse: normal_impulse * 0.25,
            ..Default::default()
        }
    }

    fn arbiter_with(key: ArbiterKey, contacts: [Contact; 2], count: usize) -> Arbiter {
        Arbiter::new(key, 0.4, contacts, count)
    }

    #[test]
    fn test_key_is_order_independent() {
        for (a, b) in [(0u32, 1u32), (7, 3), (100, 100_000), (5, 5)] {
            let ab = ArbiterKey::new(Entity(a), Entity(b));
            let ba = ArbiterKey::new(Entity(b), Entity(a));
            assert_eq!(ab, ba);
            assert_eq!(hash_of(ab), hash_of(ba));
            assert!(ab.first() <= ab.second());
        }
    }

    #[test]
    fn test_merge_carries_impulses_for_matching_features() {
        let key = ArbiterKey::new(Entity(0), Entity(1));
        let old = [
            contact_with_feature(EdgeId::Edge1, 10.0),
            contact_with_feature(EdgeId::Edge2, 20.0),
        ];
        let mut arbiter = arbiter_with(key, old, 2);

        // new manifold: Edge2 persists, Edge3 is new
        let fresh = [
            contact_with_feature(EdgeId::Edge2, 0.0),
            contact_with_feature(EdgeId::Edge3, 0.0),
        ];
        arbiter.merge(&fresh, 2);

        assert_eq!(arbiter.num_contacts, 2);
        assert_eq!(arbiter.contacts[0].normal_impulse, 20.0);
        assert_eq!(arbiter.contacts[0].tangent_impulse, 10.0);
        assert_eq!(arbiter.contacts[0].bias_impulse, 5.0);
        assert_eq!(arbiter.contacts[1].normal_impulse, 0.0);
    }

    #[test]
    fn test_clear_each_step_policy_forgets() {
        let mut table = ArbiterTable::new(CachePolicy::ClearEachStep);
        let key = ArbiterKey::new(Entity(0), Entity(1));
        table.begin_step();
        table.insert(arbiter_with(
            key,
            [contact_with_feature(EdgeId::Edge1, 5.0), Contact::default()],
            1,
        ));
        table.end_step();
        assert_eq!(table.len(), 1);

        table.begin_step();
        assert!(table.is_empty());
        table.insert(arbiter_with(
            key,
            [contact_with_feature(EdgeId::Edge1, 0.0), Contact::default()],
            1,
        ));
        table.end_step();
        // impulse was not carried across steps
        assert_eq!(table.get(&key).unwrap().contacts[0].normal_impulse, 0.0);
    }

    #[test]
    fn test_persist_and_evict_policy_warm_starts() {
        let mut table = ArbiterTable::new(CachePolicy::PersistAndEvict);
        let key = ArbiterKey::new(Entity(0), Entity(1));
        table.begin_step();
        table.insert(arbiter_with(
            key,
            [contact_with_feature(EdgeId::Edge1, 5.0), Contact::default()],
            1,
        ));
        table.end_step();

        table.begin_step();
        table.insert(arbiter_with(
            key,
            [contact_with_feature(EdgeId::Edge1, 0.0), Contact::default()],
            1,
        ));
        table.end_step();
        // impulse carried across steps for the matching feature
        assert_eq!(table.get(&key).unwrap().contacts[0].normal_impulse, 5.0);
    }

    #[test]
    fn test_persist_and_evict_drops_stale_pairs() {
        let mut table = ArbiterTable::new(CachePolicy::PersistAndEvict);
        let stale = ArbiterKey::new(Entity(0), Entity(1));
        let live = ArbiterKey::new(Entity(2), Entity(3));
        table.begin_step();
        table.insert(arbiter_with(stale, [Contact::default(); 2], 1));
        table.insert(arbiter_with(live, [Contact::default(); 2], 1));
        table.end_step();

        table.begin_step();
        table.insert(arbiter_with(live, [Contact::default(); 2], 1));
        table.end_step();

        assert!(table.get(&stale).is_none());
        assert!(table.get(&live).is_some());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_duplicate_within_step_merges_under_both_policies() {
        for policy in [CachePolicy::ClearEachStep, CachePolicy::PersistAndEvict] {
            let mut table = ArbiterTable::new(policy);
            let key = ArbiterKey::new(Entity(0), Entity(1));
            table.begin_step();
            table.insert(arbiter_with(
                key,
                [contact_with_feature(EdgeId::Edge1, 7.0), Contact::default()],
                1,
            ));
            // same pair reported again from another quadtree bucket
            table.insert(arbiter_with(
                key,
                [contact_with_feature(EdgeId::Edge1, 0.0), Contact::default()],
                1,
            ));
            table.end_step();
            assert_eq!(table.len(), 1);
            assert_eq!(table.get(&key).unwrap().contacts[0].normal_impulse, 7.0);
        }
    }

    #[test]
    fn test_sorted_keys_are_canonical() {
        let mut table = ArbiterTable::new(CachePolicy::PersistAndEvict);
        table.begin_step();
        for (a, b) in [(9, 4), (1, 2), (7, 0)] {
            table.insert(arbiter_with(
                ArbiterKey::new(Entity(a), Entity(b)),
                [Contact::default(); 2],
                1,
            ));
        }
        table.end_step();
        let keys = table.sorted_keys();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
        assert_eq!(keys[0], ArbiterKey::new(Entity(0), Entity(7)));
    }
}
