//! Block model parsing.
//!
//! Block models define the 3D geometry of blocks using cuboid elements.
//! [`ModelDefinition`] mirrors a `models/block/*.json` file as written;
//! [`Element`] and [`Face`] are the validated forms the compiler works on.

use crate::error::{CompileError, Result};
use crate::types::{Direction, ElementRotation};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Lowest coordinate an element corner may use.
pub const MIN_COORD: f32 = -16.0;
/// Highest coordinate an element corner may use.
pub const MAX_COORD: f32 = 32.0;

/// A parsed block model from models/block/*.json.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Parent model to inherit from.
    #[serde(default)]
    pub parent: Option<String>,

    /// Whether to use ambient occlusion.
    #[serde(default = "default_ao", rename = "ambientocclusion")]
    pub ambient_occlusion: bool,

    /// Texture variable definitions.
    #[serde(default)]
    pub textures: HashMap<String, String>,

    /// Model elements (cuboids).
    #[serde(default)]
    pub elements: Vec<ElementDefinition>,
}

fn default_ao() -> bool {
    true
}

/// A cuboid element as written in a model file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementDefinition {
    /// Minimum corner (0-16 range).
    pub from: [f32; 3],
    /// Maximum corner (0-16 range).
    pub to: [f32; 3],
    /// Optional rotation.
    #[serde(default)]
    pub rotation: Option<ElementRotation>,
    /// Whether this element receives shade.
    #[serde(default = "default_shade")]
    pub shade: bool,
    /// Face definitions, keyed by direction name.
    #[serde(default)]
    pub faces: HashMap<String, FaceDefinition>,
}

fn default_shade() -> bool {
    true
}

/// A face of a model element as written in a model file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceDefinition {
    /// UV coordinates [u1, v1, u2, v2] in 0-16 range.
    #[serde(default)]
    pub uv: Option<[f32; 4]>,
    /// Texture reference (e.g., "#side" or "block/stone").
    pub texture: String,
    /// Face direction for culling.
    #[serde(default)]
    pub cullface: Option<String>,
    /// UV rotation in degrees (0, 90, 180, 270).
    #[serde(default)]
    pub rotation: i32,
    /// Tint index for biome coloring (-1 = no tint).
    #[serde(default = "default_tint_index")]
    pub tintindex: i32,
}

fn default_tint_index() -> i32 {
    -1
}

/// A validated model element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub from: [f32; 3],
    pub to: [f32; 3],
    pub rotation: Option<ElementRotation>,
    pub shade: bool,
    /// Present faces; an absent face is not rendered.
    pub faces: BTreeMap<Direction, Face>,
}

/// A validated element face.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// UV rectangle in 0-16, defaulted from the element bounds if omitted.
    pub uv: [f32; 4],
    /// Whether `uv` came from the model file.
    pub uv_explicit: bool,
    /// Texture reference (`#alias` or a concrete path).
    pub texture: String,
    pub cullface: Option<Direction>,
    /// UV rotation in degrees (0, 90, 180, 270).
    pub rotation: i32,
    /// Tint index, -1 meaning no tint.
    pub tint_index: i32,
}

impl Face {
    /// Get normalized UV coordinates (0-1 range).
    pub fn normalized_uv(&self) -> [f32; 4] {
        let uv = self.uv;
        [uv[0] / 16.0, uv[1] / 16.0, uv[2] / 16.0, uv[3] / 16.0]
    }
}

impl ElementDefinition {
    /// Validate this element and fill in default face UVs.
    pub fn to_element(&self) -> Result<Element> {
        for coord in self.from.iter().chain(self.to.iter()) {
            if !(MIN_COORD..=MAX_COORD).contains(coord) {
                return Err(CompileError::InvalidElement(format!(
                    "corner {:?} -> {:?} outside [{}, {}]",
                    self.from, self.to, MIN_COORD, MAX_COORD
                )));
            }
        }

        if let Some(rotation) = &self.rotation {
            rotation.validate()?;
        }

        let mut faces = BTreeMap::new();
        for (name, definition) in &self.faces {
            let direction = Direction::from_str(name).ok_or_else(|| {
                CompileError::InvalidElement(format!("unknown face direction '{}'", name))
            })?;
            faces.insert(direction, definition.to_face(direction, self.from, self.to)?);
        }

        Ok(Element {
            from: self.from,
            to: self.to,
            rotation: self.rotation.clone(),
            shade: self.shade,
            faces,
        })
    }
}

impl FaceDefinition {
    fn to_face(&self, direction: Direction, from: [f32; 3], to: [f32; 3]) -> Result<Face> {
        if self.rotation % 90 != 0 || !(0..360).contains(&self.rotation) {
            return Err(CompileError::InvalidElement(format!(
                "{} face rotation {} is not 0, 90, 180 or 270",
                direction, self.rotation
            )));
        }

        // Older packs spell the down face "bottom".
        let cullface = self.cullface.as_deref().and_then(|name| match name {
            "bottom" => Some(Direction::Down),
            other => Direction::from_str(other),
        });

        Ok(Face {
            uv: self.uv.unwrap_or_else(|| direction.default_uv(from, to)),
            uv_explicit: self.uv.is_some(),
            texture: self.texture.clone(),
            cullface,
            rotation: self.rotation,
            tint_index: self.tintindex,
        })
    }
}
