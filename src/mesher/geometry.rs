//! Interleaved vertex buffer types.
//!
//! A [`VertexBuffer`] stores every rendered face as six vertices (two
//! triangles, no index buffer), each vertex being eleven floats:
//! position xyz, uv, normal xyz, color rgb.

use crate::types::BoundingBox;

/// Floats per vertex.
pub const STRIDE: usize = 11;
/// Vertices emitted per face.
pub const VERTICES_PER_FACE: usize = 6;
/// Floats per face.
pub const FACE_FLOATS: usize = STRIDE * VERTICES_PER_FACE;

/// Vertex slots holding the four quad corners, in ring order
/// (top-left, bottom-left, bottom-right, top-right as seen from outside).
/// Slots 3 and 4 repeat corners 3 and 1.
pub const CORNER_SLOTS: [usize; 4] = [0, 1, 5, 2];

/// Ring corner written to each of the six vertex slots.
const SLOT_CORNERS: [usize; VERTICES_PER_FACE] = [0, 1, 3, 3, 1, 2];

/// A vertex in the output buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in model-local space.
    pub position: [f32; 3],
    /// Texture coordinates in atlas space.
    pub uv: [f32; 2],
    /// Normal vector.
    pub normal: [f32; 3],
    /// Vertex color (RGB).
    pub color: [f32; 3],
}

impl Vertex {
    pub fn new(position: [f32; 3], uv: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            uv,
            normal,
            color: [1.0, 1.0, 1.0], // White by default
        }
    }

    fn read(floats: &[f32]) -> Self {
        Self {
            position: [floats[0], floats[1], floats[2]],
            uv: [floats[3], floats[4]],
            normal: [floats[5], floats[6], floats[7]],
            color: [floats[8], floats[9], floats[10]],
        }
    }

    fn write(&self, floats: &mut [f32]) {
        floats[0..3].copy_from_slice(&self.position);
        floats[3..5].copy_from_slice(&self.uv);
        floats[5..8].copy_from_slice(&self.normal);
        floats[8..11].copy_from_slice(&self.color);
    }
}

/// Flat triangle geometry with per-face tint metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexBuffer {
    data: Vec<f32>,
    /// Tint index of each face, -1 meaning no tint.
    face_tints: Vec<i32>,
}

impl VertexBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a quad given its corners in ring order.
    pub fn push_face(&mut self, corners: [Vertex; 4], tint_index: i32) {
        let start = self.data.len();
        self.data.resize(start + FACE_FLOATS, 0.0);
        for (slot, &corner) in SLOT_CORNERS.iter().enumerate() {
            let offset = start + slot * STRIDE;
            corners[corner].write(&mut self.data[offset..offset + STRIDE]);
        }
        self.face_tints.push(tint_index);
    }

    /// The interleaved float data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn face_tints(&self) -> &[i32] {
        &self.face_tints
    }

    pub fn face_count(&self) -> usize {
        self.face_tints.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.data.len() / STRIDE
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get vertex `index`.
    pub fn vertex(&self, index: usize) -> Vertex {
        let offset = index * STRIDE;
        Vertex::read(&self.data[offset..offset + STRIDE])
    }

    pub fn set_vertex(&mut self, index: usize, vertex: Vertex) {
        let offset = index * STRIDE;
        vertex.write(&mut self.data[offset..offset + STRIDE]);
    }

    /// Iterate over all vertices.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.data.chunks_exact(STRIDE).map(Vertex::read)
    }

    /// The four corners of a face in ring order.
    pub fn face_corners(&self, face: usize) -> [Vertex; 4] {
        let first = face * VERTICES_PER_FACE;
        CORNER_SLOTS.map(|slot| self.vertex(first + slot))
    }

    /// Replace the corner UVs of a face, keeping the duplicated slots in step.
    pub fn set_face_uvs(&mut self, face: usize, uvs: [[f32; 2]; 4]) {
        let start = face * FACE_FLOATS;
        for (slot, &corner) in SLOT_CORNERS.iter().enumerate() {
            let offset = start + slot * STRIDE + 3;
            self.data[offset..offset + 2].copy_from_slice(&uvs[corner]);
        }
    }

    /// Apply `f` to every vertex of the faces in `faces`.
    pub fn map_vertices<F>(&mut self, faces: std::ops::Range<usize>, mut f: F)
    where
        F: FnMut(Vertex) -> Vertex,
    {
        let start = faces.start * FACE_FLOATS;
        let end = (faces.end * FACE_FLOATS).min(self.data.len());
        for chunk in self.data[start..end].chunks_exact_mut(STRIDE) {
            f(Vertex::read(chunk)).write(chunk);
        }
    }

    /// Drop every face from `face_count` on.
    pub fn truncate_faces(&mut self, face_count: usize) {
        self.data.truncate(face_count * FACE_FLOATS);
        self.face_tints.truncate(face_count);
    }

    /// Whether any face carries a tint index.
    pub fn has_tint(&self) -> bool {
        self.face_tints.iter().any(|&tint| tint != -1)
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.vertices().map(|v| v.position))
    }
}
