//! Element geometry generation.
//!
//! Turns the effective elements of a resolved model into a [`VertexBuffer`]:
//! one quad per present face, textured through the atlas, with element-level
//! rotation applied. Placement rotation is a separate pass (see `orient`).

use crate::atlas::{AtlasRegion, TextureAtlas};
use crate::assets::{Element, Face};
use crate::error::{CompileError, Diagnostic, Result};
use crate::mesher::geometry::{Vertex, VertexBuffer};
use crate::resolver::{ModelId, ModelResolver};
use crate::types::{quarter_turns, to_local, Axis, Direction, ElementRotation};
use glam::{Mat3, Vec3};

/// Base geometry of one model, before placement rotation.
#[derive(Debug, Default)]
pub struct CompiledModel {
    pub buffer: VertexBuffer,
    /// Elements skipped while compiling.
    pub diagnostics: Vec<Diagnostic>,
}

/// Compiles resolved models against a packed atlas.
pub struct GeometryCompiler<'a> {
    resolver: &'a ModelResolver<'a>,
    atlas: &'a TextureAtlas,
}

impl<'a> GeometryCompiler<'a> {
    pub fn new(resolver: &'a ModelResolver<'a>, atlas: &'a TextureAtlas) -> Self {
        Self { resolver, atlas }
    }

    /// Compile the effective elements of `id`.
    ///
    /// An element whose textures cannot be resolved or are missing from the
    /// atlas is dropped as a whole and reported; the others are kept.
    pub fn compile(&self, id: ModelId) -> CompiledModel {
        let mut output = CompiledModel::default();
        let name = &self.resolver.get(id).name;

        for (index, element) in self.resolver.effective_elements(id).iter().enumerate() {
            let start = output.buffer.face_count();
            if let Err(e) = self.add_element(&mut output.buffer, id, element) {
                output.buffer.truncate_faces(start);
                output
                    .diagnostics
                    .push(Diagnostic::warn(format!("{} element {}", name, index), e));
            }
        }

        log::debug!(
            "Compiled {} into {} faces",
            name,
            output.buffer.face_count()
        );
        output
    }

    fn add_element(&self, buffer: &mut VertexBuffer, id: ModelId, element: &Element) -> Result<()> {
        let start = buffer.face_count();

        for (&direction, face) in &element.faces {
            let region = self.face_region(id, face)?;
            add_face(buffer, element, direction, face, region);
        }

        if let Some(rotation) = element.rotation.as_ref().filter(|r| r.angle != 0.0) {
            let end = buffer.face_count();
            apply_element_rotation(buffer, start..end, rotation);
        }

        Ok(())
    }

    fn face_region(&self, id: ModelId, face: &Face) -> Result<&'a AtlasRegion> {
        let key = self.resolver.resolve_texture_id(id, &face.texture)?;
        self.atlas
            .region_by_name(&key)
            .ok_or(CompileError::MissingAtlasTexture(key))
    }
}

/// Emit one face quad of `element`.
fn add_face(
    buffer: &mut VertexBuffer,
    element: &Element,
    direction: Direction,
    face: &Face,
    region: &AtlasRegion,
) {
    let normal = direction.normal();
    let positions = direction.corners(element.from, element.to).ring().map(to_local);

    let [u0, v0, u1, v1] = face.normalized_uv();
    // Same winding as the position ring: top-left, bottom-left, bottom-right, top-right
    let base_uvs = [[u0, v0], [u0, v1], [u1, v1], [u1, v0]];
    let uvs = rotate_uvs(base_uvs, face.rotation).map(|[u, v]| region.transform_uv(u, v));

    let corners = [0, 1, 2, 3].map(|i| Vertex::new(positions[i], uvs[i], normal));
    buffer.push_face(corners, face.tint_index);
}

/// Rotate corner UVs clockwise by `rotation` degrees, one corner per 90.
pub fn rotate_uvs(uvs: [[f32; 2]; 4], rotation: i32) -> [[f32; 2]; 4] {
    let steps = quarter_turns(rotation);
    [0, 1, 2, 3].map(|i| uvs[(i + steps) % 4])
}

/// Rotation by `angle` radians about `axis`.
///
/// A positive angle turns +y towards +z about X, +x towards +z about Y and
/// +x towards +y about Z. Element and placement rotations both use this.
pub(crate) fn axis_rotation(axis: Axis, angle: f32) -> Mat3 {
    match axis {
        Axis::X => Mat3::from_rotation_x(angle),
        Axis::Y => Mat3::from_rotation_y(-angle),
        Axis::Z => Mat3::from_rotation_z(angle),
    }
}

/// Rotate (and optionally rescale) the faces in `faces` about the element's
/// pivot.
fn apply_element_rotation(
    buffer: &mut VertexBuffer,
    faces: std::ops::Range<usize>,
    rotation: &ElementRotation,
) {
    let origin = Vec3::from(rotation.local_origin());
    let angle = rotation.angle_radians();
    let rescale = rotation.rescale_factor();

    let rotation_matrix = axis_rotation(rotation.axis, angle);
    let scale = match rotation.axis {
        Axis::X => Vec3::new(1.0, rescale, rescale),
        Axis::Y => Vec3::new(rescale, 1.0, rescale),
        Axis::Z => Vec3::new(rescale, rescale, 1.0),
    };

    buffer.map_vertices(faces, |mut vertex| {
        let p = rotation_matrix * (Vec3::from(vertex.position) - origin);
        vertex.position = (p * scale + origin).to_array();
        vertex.normal = (rotation_matrix * Vec3::from(vertex.normal)).to_array();
        vertex
    });
}
