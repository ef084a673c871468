//! Sequential-impulse contact solver.
//!
//! Each arbiter is primed once per step (`pre_step`) and then iterated a
//! fixed number of times (`apply_impulse`). Accumulated impulses are clamped
//! as totals, not per iteration, which is what lets warm starting and the
//! Coulomb friction box work.

use glam::Vec2;

use crate::math::{cross, cross_scalar, tangent};

use super::arbiter::Arbiter;
use super::body::RigidBody;
use super::{ALLOWED_PENETRATION, BIAS_FACTOR};

/// Prime an arbiter's contacts for this step.
///
/// Computes contact offsets, effective normal/tangent masses, and the
/// Baumgarte bias, then immediately re-applies the warm-started accumulated
/// impulses so the iteration starts from last step's solution.
pub fn pre_step(
    arbiter: &mut Arbiter,
    pos1: Vec2,
    pos2: Vec2,
    body1: &mut RigidBody,
    body2: &mut RigidBody,
    inv_dt: f32,
) {
    let inv_mass_sum = body1.inv_mass + body2.inv_mass;
    let inv_i1 = body1.effective_inv_inertia();
    let inv_i2 = body2.effective_inv_inertia();

    for contact in arbiter.contacts[..arbiter.num_contacts].iter_mut() {
        let r1 = contact.position - pos1;
        let r2 = contact.position - pos2;
        contact.r1 = r1;
        contact.r2 = r2;
        let normal = contact.normal;

        // effective mass along the normal:
        // 1 / (m1^-1 + m2^-1 + I1^-1 (r1 x n)^2 + I2^-1 (r2 x n)^2)
        let rn1 = cross(r1, normal);
        let rn2 = cross(r2, normal);
        let k_normal = inv_mass_sum + inv_i1 * rn1 * rn1 + inv_i2 * rn2 * rn2;
        contact.mass_normal = 1.0 / k_normal;

        let t = tangent(normal);
        let rt1 = cross(r1, t);
        let rt2 = cross(r2, t);
        let k_tangent = inv_mass_sum + inv_i1 * rt1 * rt1 + inv_i2 * rt2 * rt2;
        contact.mass_tangent = 1.0 / k_tangent;

        // Baumgarte: bleed off existing penetration over several steps
        // instead of correcting it instantaneously
        contact.bias = -BIAS_FACTOR * inv_dt * (contact.separation + ALLOWED_PENETRATION).min(0.0);

        // warm start: re-apply the accumulated impulses
        let p = contact.normal_impulse * normal + contact.tangent_impulse * t;
        body1.velocity -= body1.inv_mass * p;
        body1.angular_velocity -= inv_i1 * cross(r1, p);
        body2.velocity += body2.inv_mass * p;
        body2.angular_velocity += inv_i2 * cross(r2, p);
    }
}

/// One impulse iteration over an arbiter's contacts.
pub fn apply_impulse(arbiter: &mut Arbiter, body1: &mut RigidBody, body2: &mut RigidBody) {
    let friction = arbiter.friction;
    let inv_i1 = body1.effective_inv_inertia();
    let inv_i2 = body2.effective_inv_inertia();

    for contact in arbiter.contacts[..arbiter.num_contacts].iter_mut() {
        let r1 = contact.r1;
        let r2 = contact.r2;
        let normal = contact.normal;

        // relative velocity at the contact
        let dv = body2.velocity + cross_scalar(body2.angular_velocity, r2)
            - body1.velocity
            - cross_scalar(body1.angular_velocity, r1);

        // normal impulse, accumulated and clamped so contacts never pull
        let vn = dv.dot(normal);
        let d_pn = contact.mass_normal * (-vn + contact.bias);
        let pn_old = contact.normal_impulse;
        contact.normal_impulse = (pn_old + d_pn).max(0.0);
        let d_pn = contact.normal_impulse - pn_old;

        let pn = d_pn * normal;
        body1.velocity -= body1.inv_mass * pn;
        body1.angular_velocity -= inv_i1 * cross(r1, pn);
        body2.velocity += body2.inv_mass * pn;
        body2.angular_velocity += inv_i2 * cross(r2, pn);

        // friction impulse, clamped to the Coulomb box
        let dv = body2.velocity + cross_scalar(body2.angular_velocity, r2)
            - body1.velocity
            - cross_scalar(body1.angular_velocity, r1);

        let t = tangent(normal);
        let vt = dv.dot(t);
        let d_pt = contact.mass_tangent * (-vt);
        let max_pt = friction * contact.normal_impulse;
        let pt_old = contact.tangent_impulse;
        contact.tangent_impulse = (pt_old + d_pt).clamp(-max_pt, max_pt);
        let d_pt = contact.tangent_impulse - pt_old;

        let pt = d_pt * t;
        body1.velocity -= body1.inv_mass * pt;
        body1.angular_velocity -= inv_i1 * cross(r1, pt);
        body2.velocity += body2.inv_mass * pt;
        body2.angular_velocity += inv_i2 * cross(r2, pt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Entity;
    use crate::physics::arbiter::ArbiterKey;
    use crate::physics::narrow_phase::Contact;
    use crate::physics::SOLVER_ITERATIONS;

    // single contact straight under a falling body resting on a static one
    fn resting_arbiter() -> (Arbiter, RigidBody, RigidBody, Vec2, Vec2) {
        let contact = Contact {
            position: Vec2::new(0.0, -1.0),
            normal: Vec2::new(0.0, -1.0), // from falling body toward ground
            separation: -0.01,
            ..Default::default()
        };
        let arbiter = Arbiter::new(
            ArbiterKey::new(Entity(0), Entity(1)),
            0.2,
            [contact, Contact::default()],
            1,
        );
        let falling = RigidBody::new(1.0, 2.0, 2.0);
        let ground = RigidBody::new_static();
        (arbiter, falling, ground, Vec2::new(0.0, 0.0), Vec2::new(0.0, -2.0))
    }

    #[test]
    fn test_normal_impulse_stops_approach() {
        let (mut arbiter, mut body1, mut body2, p1, p2) = resting_arbiter();
        body1.velocity = Vec2::new(0.0, -5.0);

        pre_step(&mut arbiter, p1, p2, &mut body1, &mut body2, 60.0);
        for _ in 0..SOLVER_ITERATIONS {
            apply_impulse(&mut arbiter, &mut body1, &mut body2);
        }

        assert!(body1.velocity.y.abs() < 0.2, "vy = {}", body1.velocity.y);
        assert!(arbiter.contacts[0].normal_impulse > 0.0);
        // static body never moves
        assert_eq!(body2.velocity, Vec2::ZERO);
        assert_eq!(body2.angular_velocity, 0.0);
    }

    #[test]
    fn test_separating_contact_accumulates_no_impulse() {
        let (mut arbiter, mut body1, mut body2, p1, p2) = resting_arbiter();
        arbiter.contacts[0].separation = 0.0;
        body1.velocity = Vec2::new(0.0, 5.0); // moving apart

        pre_step(&mut arbiter, p1, p2, &mut body1, &mut body2, 60.0);
        for _ in 0..SOLVER_ITERATIONS {
            apply_impulse(&mut arbiter, &mut body1, &mut body2);
        }

        // no pulling: accumulated impulse stays clamped at zero
        assert_eq!(arbiter.contacts[0].normal_impulse, 0.0);
        assert_eq!(body1.velocity, Vec2::new(0.0, 5.0));
    }

    #[test]
    fn test_friction_clamped_to_coulomb_box() {
        let (mut arbiter, mut body1, mut body2, p1, p2) = resting_arbiter();
        body1.velocity = Vec2::new(10.0, -1.0); // sliding fast

        pre_step(&mut arbiter, p1, p2, &mut body1, &mut body2, 60.0);
        for _ in 0..SOLVER_ITERATIONS {
            apply_impulse(&mut arbiter, &mut body1, &mut body2);
        }

        let contact = arbiter.contacts[0];
        let max = arbiter.friction * contact.normal_impulse;
        assert!(contact.tangent_impulse.abs() <= max + 1e-6);
        // sliding slowed but not reversed by friction
        assert!(body1.velocity.x > 0.0 && body1.velocity.x < 10.0);
    }

    #[test]
    fn test_warm_start_reapplies_accumulated_impulse() {
        let (mut arbiter, mut body1, mut body2, p1, p2) = resting_arbiter();
        arbiter.contacts[0].normal_impulse = 2.0;

        pre_step(&mut arbiter, p1, p2, &mut body1, &mut body2, 60.0);
        // impulse of 2 along (0,-1) applied as -P to body1
        assert!((body1.velocity.y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_locked_rotation_takes_no_angular_impulse() {
        let (mut arbiter, mut body1, mut body2, p1, p2) = resting_arbiter();
        // offset contact would torque an unlocked body
        arbiter.contacts[0].position = Vec2::new(0.7, -1.0);
        body1.lock_rotation = true;
        body1.velocity = Vec2::new(0.0, -5.0);

        pre_step(&mut arbiter, p1, p2, &mut body1, &mut body2, 60.0);
        for _ in 0..SOLVER_ITERATIONS {
            apply_impulse(&mut arbiter, &mut body1, &mut body2);
        }

        assert_eq!(body1.angular_velocity, 0.0);
    }
}
