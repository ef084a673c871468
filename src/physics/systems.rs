//! Collision and physics systems.
//!
//! Each system owns a plain set of entity ids refreshed from the world's
//! signature filter every step; the world handle is injected per call. One
//! tick is the two-phase update with the collision step in between:
//!
//! ```text
//! physics.pre_collision_update(&mut world, dt);   // integrate forces
//! let events = collision.run(&world);             // broad + narrow phase
//! physics.post_collision_update(&mut world, dt, &events);
//! ```

use glam::Vec2;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::ecs::{EcsWorld, Entity};

use super::aabb::{collider_aabb, Aabb};
use super::arbiter::{Arbiter, ArbiterKey, ArbiterTable, CachePolicy};
use super::body::RigidBody;
use super::narrow_phase::{collide, Contact, MAX_CONTACT_POINTS};
use super::quadtree::Quadtree;
use super::solver;
use super::{GRAVITY, SOLVER_ITERATIONS};

/// One overlapping pair discovered by the collision step: the pair key plus
/// a snapshot of the freshly built arbiter.
#[derive(Debug, Clone)]
pub struct CollisionEvent {
    pub key: ArbiterKey,
    pub arbiter: Arbiter,
}

/// Hook for an external renderer to visualize the collision step. All
/// methods have empty defaults so implementors draw only what they care
/// about.
pub trait DebugDraw {
    fn aabb(&mut self, _entity: Entity, _aabb: &Aabb) {}
    fn contact(&mut self, _position: Vec2, _normal: Vec2) {}
}

/// Collision-system configuration.
#[derive(Debug, Clone, Copy)]
pub struct CollisionConfig {
    /// Fixed world bounds for the broad-phase quadtree.
    pub world_bounds: Aabb,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            world_bounds: Aabb::new(Vec2::new(-1000.0, -1000.0), Vec2::new(1000.0, 1000.0)),
        }
    }
}

/// Broad + narrow phase over the live collider set.
pub struct CollisionSystem {
    entities: Vec<Entity>,
    quadtree: Quadtree,
    debug_draw: Option<Box<dyn DebugDraw>>,
}

impl CollisionSystem {
    pub fn new(config: CollisionConfig) -> Self {
        Self {
            entities: Vec::new(),
            quadtree: Quadtree::new(config.world_bounds),
            debug_draw: Some(Box::new(NoopDebugDraw)),
        }
    }

    /// Attach a renderer hook. Pass [`NoopDebugDraw`] to detach.
    pub fn set_debug_draw(&mut self, hook: Box<dyn DebugDraw>) {
        self.debug_draw = Some(hook);
    }

    /// Run one collision step: rebuild the quadtree, test candidate pairs,
    /// and return one event per colliding pair, sorted by pair key.
    ///
    /// Pairs are deduplicated (an entity straddling quadtree leaves shows up
    /// in several buckets), static-static pairs are skipped, and pairs where
    /// either entity lacks a rigid body are skipped since the solver could do
    /// nothing with them.
    pub fn run(&mut self, world: &EcsWorld) -> Vec<CollisionEvent> {
        self.entities = world.collider_entities();

        let mut aabbs: FxHashMap<Entity, Aabb> = FxHashMap::default();
        for &entity in &self.entities {
            if let Some(collider) = world.collider(entity) {
                aabbs.insert(entity, collider_aabb(collider));
            }
        }

        self.quadtree
            .update(&self.entities, |entity, rect| match aabbs.get(&entity) {
                Some(aabb) => aabb.intersects(rect),
                None => false,
            });

        let mut buckets = Vec::new();
        self.quadtree.buckets(&mut buckets);

        let mut seen: FxHashSet<ArbiterKey> = FxHashSet::default();
        let mut events = Vec::new();

        for bucket in &buckets {
            for (i, &a) in bucket.iter().enumerate() {
                for &b in &bucket[i + 1..] {
                    let key = ArbiterKey::new(a, b);
                    if !seen.insert(key) {
                        continue;
                    }
                    let (Some(aabb_a), Some(aabb_b)) =
                        (aabbs.get(&key.first()), aabbs.get(&key.second()))
                    else {
                        continue;
                    };
                    if !aabb_a.intersects(aabb_b) {
                        continue;
                    }
                    let (Some(body_1), Some(body_2)) =
                        (world.body(key.first()), world.body(key.second()))
                    else {
                        continue;
                    };
                    if body_1.is_static() && body_2.is_static() {
                        continue;
                    }
                    let (Some(collider_1), Some(collider_2)) =
                        (world.collider(key.first()), world.collider(key.second()))
                    else {
                        continue;
                    };

                    let mut contacts = [Contact::default(); MAX_CONTACT_POINTS];
                    let count = collide(&mut contacts, collider_1, collider_2);
                    if count == 0 {
                        continue;
                    }

                    let friction = (body_1.friction * body_2.friction).sqrt();
                    events.push(CollisionEvent {
                        key,
                        arbiter: Arbiter::new(key, friction, contacts, count),
                    });
                }
            }
        }

        events.sort_by_key(|event| event.key);

        if let Some(hook) = self.debug_draw.as_deref_mut() {
            for &entity in &self.entities {
                if let Some(aabb) = aabbs.get(&entity) {
                    hook.aabb(entity, aabb);
                }
            }
            for event in &events {
                for contact in event.arbiter.contacts() {
                    hook.contact(contact.position, contact.normal);
                }
            }
        }

        events
    }
}

/// Default no-op debug hook.
pub struct NoopDebugDraw;

impl DebugDraw for NoopDebugDraw {}

/// Physics-system configuration.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsConfig {
    pub gravity: Vec2,
    pub iterations: usize,
    pub cache_policy: CachePolicy,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            iterations: SOLVER_ITERATIONS,
            cache_policy: CachePolicy::default(),
        }
    }
}

/// Force integration, arbiter bookkeeping, impulse solving, and motion
/// integration.
pub struct PhysicsSystem {
    gravity: Vec2,
    iterations: usize,
    arbiters: ArbiterTable,
    entities: Vec<Entity>,
}

impl PhysicsSystem {
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            gravity: config.gravity,
            iterations: config.iterations,
            arbiters: ArbiterTable::new(config.cache_policy),
            entities: Vec::new(),
        }
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    pub fn arbiters(&self) -> &ArbiterTable {
        &self.arbiters
    }

    /// Phase one: integrate forces into velocities. A zero `dt` changes
    /// nothing.
    pub fn pre_collision_update(&mut self, world: &mut EcsWorld, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.entities = world.physics_entities();
        for &entity in &self.entities {
            let Some(body) = world.body_mut(entity) else {
                continue;
            };
            if body.is_static() {
                continue;
            }
            body.velocity += (self.gravity + body.force * body.inv_mass) * dt;
            if !body.lock_rotation {
                body.angular_velocity += body.torque * body.inv_inertia * dt;
            }
        }
    }

    /// Phase two: merge the step's collision events into the arbiter table,
    /// prime and iterate the contact constraints, then integrate motion and
    /// zero the force accumulators. A zero `dt` only does the arbiter
    /// bookkeeping; no body state changes.
    pub fn post_collision_update(
        &mut self,
        world: &mut EcsWorld,
        dt: f32,
        events: &[CollisionEvent],
    ) {
        self.arbiters.begin_step();
        for event in events {
            self.arbiters.insert(event.arbiter);
        }
        self.arbiters.end_step();

        if dt <= 0.0 {
            return;
        }
        let inv_dt = 1.0 / dt;

        // canonical order: sorted pair keys, regardless of hash-map layout
        let keys = self.arbiters.sorted_keys();

        for key in &keys {
            self.solve_arbiter(world, key, |arbiter, body_1, body_2, pos_1, pos_2| {
                solver::pre_step(arbiter, pos_1, pos_2, body_1, body_2, inv_dt);
            });
        }

        for _ in 0..self.iterations {
            for key in &keys {
                self.solve_arbiter(world, key, |arbiter, body_1, body_2, _, _| {
                    solver::apply_impulse(arbiter, body_1, body_2);
                });
            }
        }

        self.integrate(world, dt);
        self.update_grounded(world, &keys);
    }

    /// Fetch the poses and bodies behind one arbiter and run `f` on them.
    /// A dangling entity id in an arbiter is a caller bug; the pair is
    /// skipped rather than handled.
    fn solve_arbiter<F>(&mut self, world: &mut EcsWorld, key: &ArbiterKey, f: F)
    where
        F: FnOnce(&mut Arbiter, &mut RigidBody, &mut RigidBody, Vec2, Vec2),
    {
        let Some(arbiter) = self.arbiters.get_mut(key) else {
            return;
        };
        let (Some(pos_1), Some(pos_2)) = (
            world.collider(key.first()).map(|c| c.position),
            world.collider(key.second()).map(|c| c.position),
        ) else {
            log::debug!("arbiter {:?} references a missing collider", key);
            return;
        };
        let Some((body_1, body_2)) = world.body_pair_mut(key.first(), key.second()) else {
            log::debug!("arbiter {:?} references a missing body", key);
            return;
        };
        f(arbiter, body_1, body_2, pos_1, pos_2);
    }

    /// Integrate velocities into poses and zero the accumulators.
    fn integrate(&mut self, world: &mut EcsWorld, dt: f32) {
        self.entities = world.physics_entities();
        for &entity in &self.entities {
            let Some(body) = world.body_mut(entity) else {
                continue;
            };
            if body.is_static() {
                body.clear_forces();
                continue;
            }
            let velocity = body.velocity;
            let angular_velocity = body.angular_velocity;
            let lock_rotation = body.lock_rotation;
            body.clear_forces();

            if let Some(collider) = world.collider_mut(entity) {
                collider.position += velocity * dt;
                if !lock_rotation {
                    collider.rotation += angular_velocity * dt;
                }
            }
        }
    }

    /// Mark dynamic bodies resting on a contact whose normal opposes
    /// gravity.
    fn update_grounded(&mut self, world: &mut EcsWorld, keys: &[ArbiterKey]) {
        for &entity in &self.entities {
            if let Some(body) = world.body_mut(entity) {
                body.is_grounded = false;
            }
        }

        let up = -self.gravity.normalize_or_zero();
        if up == Vec2::ZERO {
            return;
        }
        for key in keys {
            let Some(arbiter) = self.arbiters.get(key) else {
                continue;
            };
            for contact in arbiter.contacts() {
                let support = contact.normal.dot(up);
                if support < -0.7 {
                    if let Some(body) = world.body_mut(key.first()) {
                        body.is_grounded = true;
                    }
                } else if support > 0.7 {
                    if let Some(body) = world.body_mut(key.second()) {
                        body.is_grounded = true;
                    }
                }
            }
        }
    }
}
