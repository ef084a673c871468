//! Broad-phase quadtree.
//!
//! The tree is rebuilt from the live collider set every step, so there is no
//! removal or incremental-update API. Geometry stays outside the tree: the
//! caller supplies a containment predicate mapping an entity onto a rect,
//! which keeps the tree oblivious to shapes and transforms.

use glam::Vec2;

use crate::ecs::Entity;

use super::Aabb;

/// Maximum subdivision depth.
pub const MAX_DEPTH: usize = 5;

/// Bucket size above which a leaf splits (until `MAX_DEPTH`).
pub const SPLIT_THRESHOLD: usize = 8;

struct Node {
    bounds: Aabb,
    entities: Vec<Entity>,
    children: Option<Box<[Node; 4]>>,
}

impl Node {
    fn new(bounds: Aabb) -> Self {
        Self {
            bounds,
            entities: Vec::new(),
            children: None,
        }
    }

    fn insert<F>(&mut self, entity: Entity, depth: usize, contains: &F)
    where
        F: Fn(Entity, &Aabb) -> bool,
    {
        if let Some(children) = self.children.as_deref_mut() {
            let mut routed = false;
            for child in children.iter_mut() {
                if contains(entity, &child.bounds) {
                    child.insert(entity, depth + 1, contains);
                    routed = true;
                }
            }
            // Entities the predicate rejects for every child (outside the
            // world bounds at the root) stay in this node's bucket so they
            // still receive pair tests.
            if !routed {
                self.entities.push(entity);
            }
            return;
        }

        self.entities.push(entity);
        if self.entities.len() > SPLIT_THRESHOLD && depth < MAX_DEPTH {
            self.split(depth, contains);
        }
    }

    fn split<F>(&mut self, depth: usize, contains: &F)
    where
        F: Fn(Entity, &Aabb) -> bool,
    {
        let center = self.bounds.center();
        let Aabb { min, max } = self.bounds;
        self.children = Some(Box::new([
            Node::new(Aabb::new(min, center)),
            Node::new(Aabb::new(Vec2::new(center.x, min.y), Vec2::new(max.x, center.y))),
            Node::new(Aabb::new(Vec2::new(min.x, center.y), Vec2::new(center.x, max.y))),
            Node::new(Aabb::new(center, max)),
        ]));

        let entities = std::mem::take(&mut self.entities);
        for entity in entities {
            self.insert(entity, depth, contains);
        }
    }

    fn collect(&self, ancestors: &mut Vec<Entity>, out: &mut Vec<Vec<Entity>>) {
        match self.children.as_deref() {
            Some(children) => {
                let parked = self.entities.len();
                ancestors.extend_from_slice(&self.entities);
                for child in children {
                    child.collect(ancestors, out);
                }
                ancestors.truncate(ancestors.len() - parked);
            }
            None => {
                if ancestors.is_empty() && self.entities.is_empty() {
                    return;
                }
                let mut bucket = ancestors.clone();
                bucket.extend_from_slice(&self.entities);
                out.push(bucket);
            }
        }
    }
}

/// Quadtree over fixed world bounds.
pub struct Quadtree {
    bounds: Aabb,
    root: Node,
}

impl Quadtree {
    /// World bounds are fixed at construction; every rebuild reuses them.
    pub fn new(bounds: Aabb) -> Self {
        Self {
            bounds,
            root: Node::new(bounds),
        }
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Rebuild the tree for this frame from the live entity set.
    ///
    /// `contains(entity, rect)` decides whether an entity's bounds overlap a
    /// node rect. An entity straddling a boundary lands in every leaf it
    /// touches, so downstream pair generation must tolerate duplicates.
    pub fn update<F>(&mut self, entities: &[Entity], contains: F)
    where
        F: Fn(Entity, &Aabb) -> bool,
    {
        self.root = Node::new(self.bounds);
        for &entity in entities {
            self.root.insert(entity, 0, &contains);
        }
    }

    /// Collect the per-leaf entity buckets of the current tree.
    ///
    /// Each bucket is a leaf's entities prefixed by every entity parked on
    /// the leaf's ancestors, so entities held in internal nodes (those the
    /// predicate rejects for every child, out-of-bounds entities at the root
    /// included) are still paired against the whole subtree beneath them.
    /// Buckets are appended in a fixed depth-first child order, so the output
    /// is deterministic for a given input sequence.
    pub fn buckets(&self, out: &mut Vec<Vec<Entity>>) {
        out.clear();
        let mut ancestors = Vec::new();
        self.root.collect(&mut ancestors, out);
    }
}
