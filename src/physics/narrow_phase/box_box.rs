//! Box-Box collision: separating axis test over the four face normals, then
//! Sutherland-Hodgman clipping of the incident edge against the reference
//! face's side planes.

use glam::{Mat2, Vec2};

use crate::math::mat2_abs;
use crate::physics::{Collider, Shape};

use super::{Contact, EdgeId, FeatureId, MAX_CONTACT_POINTS};

// Face-preference bias: a competing axis only replaces the current reference
// face when its penetration is clearly smaller, which stops the normal from
// flickering between near-tied axes across frames.
const RELATIVE_TOL: f32 = 0.95;
const ABSOLUTE_TOL: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Axis {
    FaceAX,
    FaceAY,
    FaceBX,
    FaceBY,
}

#[derive(Debug, Clone, Copy, Default)]
struct ClipVertex {
    v: Vec2,
    feature: FeatureId,
}

/// Clip a two-point segment against the plane `normal . x <= offset`.
///
/// Interpolated vertices record the clipping edge in their feature id so the
/// resulting contact stays identifiable across frames.
fn clip_segment_to_line(
    v_out: &mut [ClipVertex; 2],
    v_in: &[ClipVertex; 2],
    normal: Vec2,
    offset: f32,
    clip_edge: EdgeId,
) -> usize {
    let mut num_out = 0;

    let distance0 = normal.dot(v_in[0].v) - offset;
    let distance1 = normal.dot(v_in[1].v) - offset;

    if distance0 <= 0.0 {
        v_out[num_out] = v_in[0];
        num_out += 1;
    }
    if distance1 <= 0.0 {
        v_out[num_out] = v_in[1];
        num_out += 1;
    }

    if distance0 * distance1 < 0.0 {
        let interp = distance0 / (distance0 - distance1);
        v_out[num_out].v = v_in[0].v + interp * (v_in[1].v - v_in[0].v);
        if distance0 > 0.0 {
            v_out[num_out].feature = v_in[0].feature;
            v_out[num_out].feature.in_edge_1 = clip_edge;
            v_out[num_out].feature.in_edge_2 = EdgeId::None;
        } else {
            v_out[num_out].feature = v_in[1].feature;
            v_out[num_out].feature.out_edge_1 = clip_edge;
            v_out[num_out].feature.out_edge_2 = EdgeId::None;
        }
        num_out += 1;
    }

    num_out
}

/// The edge of the incident box most anti-parallel to the reference normal,
/// as two world-space vertices tagged with the incident edge ids.
fn incident_edge(h: Vec2, pos: Vec2, rot: Mat2, normal: Vec2) -> [ClipVertex; 2] {
    let n = -(rot.transpose() * normal);
    let n_abs = n.abs();
    let mut c = [ClipVertex::default(); 2];

    if n_abs.x > n_abs.y {
        if n.x >= 0.0 {
            c[0].v = Vec2::new(h.x, -h.y);
            c[0].feature.in_edge_2 = EdgeId::Edge3;
            c[0].feature.out_edge_2 = EdgeId::Edge4;
            c[1].v = Vec2::new(h.x, h.y);
            c[1].feature.in_edge_2 = EdgeId::Edge4;
            c[1].feature.out_edge_2 = EdgeId::Edge1;
        } else {
            c[0].v = Vec2::new(-h.x, h.y);
            c[0].feature.in_edge_2 = EdgeId::Edge1;
            c[0].feature.out_edge_2 = EdgeId::Edge2;
            c[1].v = Vec2::new(-h.x, -h.y);
            c[1].feature.in_edge_2 = EdgeId::Edge2;
            c[1].feature.out_edge_2 = EdgeId::Edge3;
        }
    } else if n.y >= 0.0 {
        c[0].v = Vec2::new(h.x, h.y);
        c[0].feature.in_edge_2 = EdgeId::Edge4;
        c[0].feature.out_edge_2 = EdgeId::Edge1;
        c[1].v = Vec2::new(-h.x, h.y);
        c[1].feature.in_edge_2 = EdgeId::Edge1;
        c[1].feature.out_edge_2 = EdgeId::Edge2;
    } else {
        c[0].v = Vec2::new(-h.x, -h.y);
        c[0].feature.in_edge_2 = EdgeId::Edge2;
        c[0].feature.out_edge_2 = EdgeId::Edge3;
        c[1].v = Vec2::new(h.x, -h.y);
        c[1].feature.in_edge_2 = EdgeId::Edge3;
        c[1].feature.out_edge_2 = EdgeId::Edge4;
    }

    c[0].v = pos + rot * c[0].v;
    c[1].v = pos + rot * c[1].v;
    c
}

/// Box-Box manifold. Up to two points; returns 0 when a separating axis
/// exists or a shape is degenerate.
pub fn collide_box_box(
    contacts: &mut [Contact; MAX_CONTACT_POINTS],
    a: &Collider,
    b: &Collider,
) -> usize {
    let (Shape::Box { half_extents: h_a }, Shape::Box { half_extents: h_b }) = (a.shape, b.shape)
    else {
        return 0;
    };
    if h_a.min_element() <= 0.0 || h_b.min_element() <= 0.0 {
        return 0;
    }

    let pos_a = a.position;
    let pos_b = b.position;
    let rot_a = Mat2::from_angle(a.rotation);
    let rot_b = Mat2::from_angle(b.rotation);
    let rot_a_t = rot_a.transpose();
    let rot_b_t = rot_b.transpose();

    let dp = pos_b - pos_a;
    let d_a = rot_a_t * dp;
    let d_b = rot_b_t * dp;

    let c = rot_a_t * rot_b;
    let abs_c = mat2_abs(c);
    let abs_c_t = abs_c.transpose();

    // SAT: project B onto A's face normals, then A onto B's
    let face_a = d_a.abs() - h_a - abs_c * h_b;
    if face_a.x > 0.0 || face_a.y > 0.0 {
        return 0;
    }
    let face_b = d_b.abs() - abs_c_t * h_a - h_b;
    if face_b.x > 0.0 || face_b.y > 0.0 {
        return 0;
    }

    // axis of least penetration, biased toward keeping the current face
    let mut axis = Axis::FaceAX;
    let mut separation = face_a.x;
    let mut normal = if d_a.x > 0.0 { rot_a.x_axis } else { -rot_a.x_axis };

    if face_a.y > RELATIVE_TOL * separation + ABSOLUTE_TOL * h_a.y {
        axis = Axis::FaceAY;
        separation = face_a.y;
        normal = if d_a.y > 0.0 { rot_a.y_axis } else { -rot_a.y_axis };
    }
    if face_b.x > RELATIVE_TOL * separation + ABSOLUTE_TOL * h_b.x {
        axis = Axis::FaceBX;
        separation = face_b.x;
        normal = if d_b.x > 0.0 { rot_b.x_axis } else { -rot_b.x_axis };
    }
    if face_b.y > RELATIVE_TOL * separation + ABSOLUTE_TOL * h_b.y {
        axis = Axis::FaceBY;
        normal = if d_b.y > 0.0 { rot_b.y_axis } else { -rot_b.y_axis };
    }

    // set up the reference face and clip the incident edge against its two
    // side planes
    let front_normal;
    let front;
    let side_normal;
    let neg_side;
    let pos_side;
    let neg_edge;
    let pos_edge;
    let incident;

    match axis {
        Axis::FaceAX => {
            front_normal = normal;
            front = pos_a.dot(front_normal) + h_a.x;
            side_normal = rot_a.y_axis;
            let side = pos_a.dot(side_normal);
            neg_side = -side + h_a.y;
            pos_side = side + h_a.y;
            neg_edge = EdgeId::Edge3;
            pos_edge = EdgeId::Edge1;
            incident = incident_edge(h_b, pos_b, rot_b, front_normal);
        }
        Axis::FaceAY => {
            front_normal = normal;
            front = pos_a.dot(front_normal) + h_a.y;
            side_normal = rot_a.x_axis;
            let side = pos_a.dot(side_normal);
            neg_side = -side + h_a.x;
            pos_side = side + h_a.x;
            neg_edge = EdgeId::Edge2;
            pos_edge = EdgeId::Edge4;
            incident = incident_edge(h_b, pos_b, rot_b, front_normal);
        }
        Axis::FaceBX => {
            front_normal = -normal;
            front = pos_b.dot(front_normal) + h_b.x;
            side_normal = rot_b.y_axis;
            let side = pos_b.dot(side_normal);
            neg_side = -side + h_b.y;
            pos_side = side + h_b.y;
            neg_edge = EdgeId::Edge3;
            pos_edge = EdgeId::Edge1;
            incident = incident_edge(h_a, pos_a, rot_a, front_normal);
        }
        Axis::FaceBY => {
            front_normal = -normal;
            front = pos_b.dot(front_normal) + h_b.y;
            side_normal = rot_b.x_axis;
            let side = pos_b.dot(side_normal);
            neg_side = -side + h_b.x;
            pos_side = side + h_b.x;
            neg_edge = EdgeId::Edge2;
            pos_edge = EdgeId::Edge4;
            incident = incident_edge(h_a, pos_a, rot_a, front_normal);
        }
    }

    let mut clip1 = [ClipVertex::default(); 2];
    if clip_segment_to_line(&mut clip1, &incident, -side_normal, neg_side, neg_edge) < 2 {
        return 0;
    }
    let mut clip2 = [ClipVertex::default(); 2];
    if clip_segment_to_line(&mut clip2, &clip1, side_normal, pos_side, pos_edge) < 2 {
        return 0;
    }

    // keep the clipped points still behind the reference face
    let mut num_contacts = 0;
    for cv in &clip2 {
        let separation = front_normal.dot(cv.v) - front;
        if separation <= 0.0 {
            let contact = &mut contacts[num_contacts];
            *contact = Contact::default();
            contact.separation = separation;
            contact.normal = normal;
            contact.position = cv.v - separation * front_normal;
            contact.feature = cv.feature;
            // keep feature ids comparable when the reference face is on B
            if matches!(axis, Axis::FaceBX | Axis::FaceBY) {
                contact.feature.flip();
            }
            num_contacts += 1;
        }
    }

    num_contacts
}
