//! Circle-circle and circle-box collision.

use glam::{Mat2, Vec2};

use crate::math::tangent;
use crate::physics::{Collider, Shape};

use super::{Contact, MAX_CONTACT_POINTS};

// Below this distance two points are treated as coincident and the normal
// falls back to a fixed axis instead of dividing by (nearly) zero.
const COINCIDENT_EPSILON: f32 = 1e-6;

/// Circle-Circle manifold: a single contact at the midpoint of the overlap.
pub fn collide_circle_circle(
    contacts: &mut [Contact; MAX_CONTACT_POINTS],
    a: &Collider,
    b: &Collider,
) -> usize {
    let (Shape::Circle { radius: radius_a }, Shape::Circle { radius: radius_b }) =
        (a.shape, b.shape)
    else {
        return 0;
    };
    if radius_a <= 0.0 || radius_b <= 0.0 {
        return 0;
    }

    let delta = b.position - a.position;
    let radius_sum = radius_a + radius_b;
    let dist_sq = delta.length_squared();
    if dist_sq > radius_sum * radius_sum {
        return 0;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > COINCIDENT_EPSILON {
        delta / dist
    } else {
        Vec2::X // coincident centers: deterministic fallback
    };
    let separation = dist - radius_sum;

    contacts[0] = Contact {
        position: a.position + normal * (radius_a + separation * 0.5),
        normal,
        separation,
        ..Default::default()
    };
    1
}

/// Circle-Box manifold, circle first. The circle center is projected onto the
/// box's four rotated face normals; the best face either resolves directly
/// (center inside, or facing the face interior) or hands off to a Voronoi
/// vertex-region test against the face's two corners.
pub fn collide_circle_box(
    contacts: &mut [Contact; MAX_CONTACT_POINTS],
    a: &Collider,
    b: &Collider,
) -> usize {
    let Shape::Circle { radius } = a.shape else {
        return 0;
    };
    let Shape::Box { half_extents: h } = b.shape else {
        return 0;
    };
    if radius <= 0.0 || h.min_element() <= 0.0 {
        return 0;
    }

    let rot = Mat2::from_angle(b.rotation);
    let local = rot.transpose() * (a.position - b.position);

    // signed distance of the center past each face: +x, -x, +y, -y
    let face_separations = [
        local.x - h.x,
        -local.x - h.x,
        local.y - h.y,
        -local.y - h.y,
    ];
    let face_normals = [Vec2::X, -Vec2::X, Vec2::Y, -Vec2::Y];

    let mut best = 0;
    for i in 1..4 {
        if face_separations[i] > face_separations[best] {
            best = i;
        }
    }
    let face_separation = face_separations[best];
    if face_separation > radius {
        return 0;
    }

    let local_normal = face_normals[best];
    let outward = rot * local_normal;

    if face_separation <= 0.0 {
        // center inside the box: push out through the nearest face
        contacts[0] = Contact {
            position: a.position - outward * face_separation,
            normal: -outward,
            separation: face_separation - radius,
            ..Default::default()
        };
        return 1;
    }

    // outside: classify against the candidate face's two vertices
    let face_tangent = tangent(local_normal);
    let face_half_width = if best < 2 { h.y } else { h.x };
    let face_distance = if best < 2 { h.x } else { h.y };
    let along = local.dot(face_tangent);

    if along.abs() > face_half_width {
        // vertex region: nearest feature is a corner of the face
        let corner_local =
            local_normal * face_distance + face_tangent * along.clamp(-face_half_width, face_half_width);
        let corner = b.position + rot * corner_local;
        let delta = corner - a.position;
        let dist = delta.length();
        if dist > radius {
            return 0;
        }
        let normal = if dist > COINCIDENT_EPSILON {
            delta / dist
        } else {
            -outward // center exactly on the corner
        };
        contacts[0] = Contact {
            position: corner,
            normal,
            separation: dist - radius,
            ..Default::default()
        };
        return 1;
    }

    // face region
    contacts[0] = Contact {
        position: a.position - outward * face_separation,
        normal: -outward,
        separation: face_separation - radius,
        ..Default::default()
    };
    1
}

/// Box-Circle is Circle-Box with swapped arguments and the normal negated so
/// it still points from the first collider toward the second.
pub fn collide_box_circle(
    contacts: &mut [Contact; MAX_CONTACT_POINTS],
    a: &Collider,
    b: &Collider,
) -> usize {
    let count = collide_circle_box(contacts, b, a);
    for contact in &mut contacts[..count] {
        contact.normal = -contact.normal;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    fn circle_at(radius: f32, x: f32, y: f32) -> Collider {
        Collider::at(Shape::circle(radius), Vec2::new(x, y))
    }

    fn box_at(w: f32, h: f32, x: f32, y: f32, rotation: f32) -> Collider {
        let mut c = Collider::at(Shape::boxed(w, h), Vec2::new(x, y));
        c.rotation = rotation;
        c
    }

    #[test]
    fn test_circle_circle_overlap() {
        let mut contacts = [Contact::default(); MAX_CONTACT_POINTS];
        let a = circle_at(1.0, 0.0, 0.0);
        let b = circle_at(1.0, 1.5, 0.0);

        let count = collide_circle_circle(&mut contacts, &a, &b);
        assert_eq!(count, 1);
        let contact = contacts[0];
        assert!((contact.separation + 0.5).abs() < 1e-6);
        assert!((contact.normal - Vec2::X).length() < 1e-6);
        assert!((contact.position - Vec2::new(0.75, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_circle_circle_separated() {
        let mut contacts = [Contact::default(); MAX_CONTACT_POINTS];
        let a = circle_at(1.0, 0.0, 0.0);
        let b = circle_at(1.0, 2.5, 0.0);
        assert_eq!(collide_circle_circle(&mut contacts, &a, &b), 0);
    }

    #[test]
    fn test_coincident_circles_fall_back_to_fixed_normal() {
        let mut contacts = [Contact::default(); MAX_CONTACT_POINTS];
        let a = circle_at(1.0, 2.0, 3.0);
        let b = circle_at(0.5, 2.0, 3.0);

        let count = collide_circle_circle(&mut contacts, &a, &b);
        assert_eq!(count, 1);
        assert_eq!(contacts[0].normal, Vec2::X);
        assert!((contacts[0].separation + 1.5).abs() < 1e-6);
        assert!(contacts[0].position.is_finite());
    }

    #[test]
    fn test_circle_box_face_region() {
        // circle above an axis-aligned box, overlapping the top face
        let mut contacts = [Contact::default(); MAX_CONTACT_POINTS];
        let circle = circle_at(0.5, 0.0, 1.3);
        let boxc = box_at(2.0, 2.0, 0.0, 0.0, 0.0);

        let count = collide_circle_box(&mut contacts, &circle, &boxc);
        assert_eq!(count, 1);
        let contact = contacts[0];
        assert!((contact.normal - Vec2::new(0.0, -1.0)).length() < 1e-5);
        assert!((contact.separation + 0.2).abs() < 1e-5);
        assert!((contact.position - Vec2::new(0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_circle_box_vertex_region() {
        // circle diagonally off the box corner (1,1)
        let mut contacts = [Contact::default(); MAX_CONTACT_POINTS];
        let offset = Vec2::new(1.2, 1.2);
        let circle = Collider::at(Shape::circle(0.5), offset);
        let boxc = box_at(2.0, 2.0, 0.0, 0.0, 0.0);

        let count = collide_circle_box(&mut contacts, &circle, &boxc);
        assert_eq!(count, 1);
        let contact = contacts[0];
        let corner = Vec2::new(1.0, 1.0);
        let expected_normal = (corner - offset).normalize();
        assert!((contact.normal - expected_normal).length() < 1e-5);
        assert!((contact.position - corner).length() < 1e-5);
        let expected_sep = (corner - offset).length() - 0.5;
        assert!((contact.separation - expected_sep).abs() < 1e-5);
    }

    #[test]
    fn test_circle_beyond_vertex_misses() {
        // face distance is under the radius but the corner is not
        let mut contacts = [Contact::default(); MAX_CONTACT_POINTS];
        let circle = circle_at(0.5, 1.4, 1.4);
        let boxc = box_at(2.0, 2.0, 0.0, 0.0, 0.0);
        assert_eq!(collide_circle_box(&mut contacts, &circle, &boxc), 0);
    }

    #[test]
    fn test_circle_center_inside_box() {
        let mut contacts = [Contact::default(); MAX_CONTACT_POINTS];
        let circle = circle_at(0.5, 0.0, 0.8);
        let boxc = box_at(2.0, 2.0, 0.0, 0.0, 0.0);

        let count = collide_circle_box(&mut contacts, &circle, &boxc);
        assert_eq!(count, 1);
        let contact = contacts[0];
        // nearest face is +y; normal points from circle into the box
        assert!((contact.normal - Vec2::new(0.0, -1.0)).length() < 1e-5);
        assert!((contact.separation + 0.7).abs() < 1e-5);
        assert!((contact.position - Vec2::new(0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_circle_rotated_box() {
        // box rotated 45 degrees; circle pressing on the rotated +x face
        let mut contacts = [Contact::default(); MAX_CONTACT_POINTS];
        let face_dir = Vec2::new(1.0, 1.0).normalize();
        let circle = Collider::at(Shape::circle(0.5), face_dir * 1.3);
        let boxc = box_at(2.0, 2.0, 0.0, 0.0, FRAC_PI_4);

        let count = collide_circle_box(&mut contacts, &circle, &boxc);
        assert_eq!(count, 1);
        let contact = contacts[0];
        assert!((contact.normal + face_dir).length() < 1e-4);
        assert!((contact.separation + 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_box_circle_negates_normal() {
        let mut cb = [Contact::default(); MAX_CONTACT_POINTS];
        let mut bc = [Contact::default(); MAX_CONTACT_POINTS];
        let circle = circle_at(0.5, 0.0, 1.3);
        let boxc = box_at(2.0, 2.0, 0.0, 0.0, 0.0);

        assert_eq!(collide_circle_box(&mut cb, &circle, &boxc), 1);
        assert_eq!(collide_box_circle(&mut bc, &boxc, &circle), 1);
        assert!((cb[0].normal + bc[0].normal).length() < 1e-6);
        assert_eq!(cb[0].separation, bc[0].separation);
        assert_eq!(cb[0].position, bc[0].position);
    }
}
