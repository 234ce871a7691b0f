//! Placement rotation of compiled geometry.
//!
//! Blockstate placements rotate a model in 90 degree steps, first about X
//! then about Y, around the block centre. With `uvlock` the faces spinning in
//! place keep their texture fixed in world space.

use crate::mesher::element::axis_rotation;
use crate::mesher::geometry::VertexBuffer;
use crate::types::{quarter_turns, Axis, PlacementTransform};
use glam::{Mat3, Vec3};

/// Block centre in model-local space.
pub const BLOCK_CENTRE: [f32; 3] = [0.0, 0.5, 0.0];

const PLANE_EPSILON: f32 = 1e-5;

/// Apply a placement rotation to `buffer` in place.
pub fn orient(buffer: &mut VertexBuffer, transform: PlacementTransform) {
    rotate_quarter_turns(buffer, Axis::X, transform.x, transform.uvlock);
    rotate_quarter_turns(buffer, Axis::Y, transform.y, transform.uvlock);
}

fn rotate_quarter_turns(buffer: &mut VertexBuffer, axis: Axis, degrees: i32, uvlock: bool) {
    let steps = quarter_turns(degrees);
    if steps == 0 {
        return;
    }

    let matrix = axis_rotation(axis, (steps as f32 * 90.0).to_radians());
    // Quarter turns are exact; drop the sin/cos noise.
    let matrix = Mat3::from_cols_array(&matrix.to_cols_array().map(f32::round));

    let locked = if uvlock {
        locked_faces(buffer, axis)
    } else {
        Vec::new()
    };

    let pivot = Vec3::from(BLOCK_CENTRE);
    let face_count = buffer.face_count();
    buffer.map_vertices(0..face_count, |mut vertex| {
        vertex.position = (matrix * (Vec3::from(vertex.position) - pivot) + pivot).to_array();
        vertex.normal = (matrix * Vec3::from(vertex.normal)).to_array();
        vertex
    });

    // Seen from outside a face, its ring runs counter-clockwise. A turn that
    // is counter-clockwise from that side moves each corner one step forward
    // along the ring; taking the UV of the next corner keeps every world
    // position on the UV it had.
    let counter_clockwise_from_positive = axis != Axis::Y;
    for (face, positive) in locked {
        let old = buffer.face_corners(face).map(|v| v.uv);
        let uvs = [0, 1, 2, 3].map(|i| {
            if positive == counter_clockwise_from_positive {
                old[(i + steps) % 4]
            } else {
                old[(i + 4 - steps) % 4]
            }
        });
        buffer.set_face_uvs(face, uvs);
    }
}

/// Faces lying in a plane perpendicular to `axis`, with whether they face
/// the positive direction.
fn locked_faces(buffer: &VertexBuffer, axis: Axis) -> Vec<(usize, bool)> {
    let a = axis.index();
    (0..buffer.face_count())
        .filter_map(|face| {
            let corners = buffer.face_corners(face);
            let plane = corners[0].position[a];
            let planar = corners
                .iter()
                .all(|v| (v.position[a] - plane).abs() < PLANE_EPSILON);
            let normal = corners[0].normal[a];
            (planar && normal.abs() > 0.5).then_some((face, normal > 0.0))
        })
        .collect()
}
