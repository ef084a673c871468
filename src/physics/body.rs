//! Rigid-body component: mass properties, velocities, and force accumulators.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::STATIC_MASS;

/// Persisted rigid-body definition. Arrives already deserialized from the
/// external persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyDef {
    pub mass: f32,
    /// Full box width/height used for the inertia derivation. Circles reuse
    /// their bounding box dimensions.
    pub width: f32,
    pub height: f32,
    #[serde(default = "BodyDef::default_friction")]
    pub friction: f32,
    #[serde(default)]
    pub lock_rotation: bool,
}

impl BodyDef {
    fn default_friction() -> f32 {
        0.2
    }
}

/// Rigid-body component.
///
/// A body is static iff `mass >= STATIC_MASS`; static bodies carry zero
/// inverse mass and inertia and are never integrated. Constructors guard
/// every division so no configuration, however broken, yields NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBody {
    pub mass: f32,
    pub inv_mass: f32,
    pub inertia: f32,
    pub inv_inertia: f32,
    pub velocity: Vec2,
    pub angular_velocity: f32,
    pub force: Vec2,
    pub torque: f32,
    pub friction: f32,
    pub lock_rotation: bool,
    pub is_grounded: bool,
}

impl RigidBody {
    /// Dynamic body with box inertia `mass * (w^2 + h^2) / 12`.
    ///
    /// Invalid mass or dimensions degrade to a static body with a warning
    /// rather than producing NaN.
    pub fn new(mass: f32, width: f32, height: f32) -> Self {
        let (mass, width, height) = if mass.is_finite()
            && mass > 0.0
            && width.is_finite()
            && width > 0.0
            && height.is_finite()
            && height > 0.0
        {
            (mass, width, height)
        } else {
            log::warn!(
                "invalid body configuration (mass {}, {}x{}), degrading to static",
                mass,
                width,
                height
            );
            (STATIC_MASS, width.max(1.0), height.max(1.0))
        };

        let (inv_mass, inertia, inv_inertia) = if mass >= STATIC_MASS {
            (0.0, f32::MAX, 0.0)
        } else {
            let inertia = mass * (width * width + height * height) / 12.0;
            (1.0 / mass, inertia, 1.0 / inertia)
        };

        Self {
            mass,
            inv_mass,
            inertia,
            inv_inertia,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
            friction: BodyDef::default_friction(),
            lock_rotation: false,
            is_grounded: false,
        }
    }

    /// Static (infinite-mass) body.
    pub fn new_static() -> Self {
        Self::new(STATIC_MASS, 1.0, 1.0)
    }

    pub fn from_def(def: &BodyDef) -> Self {
        let mut body = Self::new(def.mass, def.width, def.height);
        body.friction = if def.friction.is_finite() && def.friction >= 0.0 {
            def.friction
        } else {
            log::warn!("invalid friction {}, using default", def.friction);
            BodyDef::default_friction()
        };
        body.lock_rotation = def.lock_rotation;
        body
    }

    pub fn is_static(&self) -> bool {
        self.mass >= STATIC_MASS
    }

    /// Inverse inertia as seen by the solver: locked-rotation bodies take no
    /// angular impulses.
    #[inline]
    pub fn effective_inv_inertia(&self) -> f32 {
        if self.lock_rotation {
            0.0
        } else {
            self.inv_inertia
        }
    }

    /// Accumulate a force applied at the center of mass for this step.
    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Accumulate a torque for this step.
    pub fn add_torque(&mut self, torque: f32) {
        self.torque += torque;
    }

    /// Zero force/torque accumulators, at the end of every step.
    pub fn clear_forces(&mut self) {
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }
}
