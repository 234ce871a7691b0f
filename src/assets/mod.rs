//! Asset bundle loading and parsing.
//!
//! This module reads an extracted Minecraft-style asset directory and parses
//! its block states, block models and textures.

pub mod blockstate;
pub mod loader;
pub mod model;
pub mod texture;

pub use blockstate::{
    BlockstateDefinition, MultipartCase, MultipartCondition, Placement, StateList,
};
pub use model::{Element, ElementDefinition, Face, FaceDefinition, ModelDefinition};
pub use texture::TextureData;

use crate::error::Diagnostic;
use std::collections::{BTreeMap, HashMap};

/// A loaded asset bundle.
///
/// Models are keyed by their path under `models/block`, textures by their
/// path under `textures/block`, block states by file name.
#[derive(Debug, Default)]
pub struct AssetBundle {
    pub blockstates: BTreeMap<String, BlockstateDefinition>,
    pub models: HashMap<String, ModelDefinition>,
    pub textures: BTreeMap<String, TextureData>,
    /// Files skipped while loading.
    pub diagnostics: Vec<Diagnostic>,
}

impl AssetBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a blockstate definition by block name (e.g., "stone").
    pub fn get_blockstate(&self, name: &str) -> Option<&BlockstateDefinition> {
        self.blockstates.get(name)
    }

    /// Get a model by name (e.g., "minecraft:block/stone" or "stone").
    pub fn get_model(&self, name: &str) -> Option<&ModelDefinition> {
        self.models.get(normalize_model_name(name))
    }

    /// Get a texture by reference (e.g., "minecraft:block/stone").
    pub fn get_texture(&self, name: &str) -> Option<&TextureData> {
        self.textures.get(texture_key(name))
    }

    pub fn add_blockstate(&mut self, name: &str, definition: BlockstateDefinition) {
        self.blockstates.insert(name.to_string(), definition);
    }

    pub fn add_model(&mut self, name: &str, model: ModelDefinition) {
        self.models
            .insert(normalize_model_name(name).to_string(), model);
    }

    pub fn add_texture(&mut self, name: &str, texture: TextureData) {
        self.textures.insert(texture_key(name).to_string(), texture);
    }

    pub fn blockstate_count(&self) -> usize {
        self.blockstates.len()
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

fn strip_namespace(name: &str) -> &str {
    name.strip_prefix("minecraft:").unwrap_or(name)
}

/// Normalize a model reference to its bundle key.
/// "minecraft:block/stone" -> "stone"
pub fn normalize_model_name(name: &str) -> &str {
    let name = strip_namespace(name);
    name.strip_prefix("block/").unwrap_or(name)
}

/// Normalize a concrete texture reference to its atlas key.
/// "minecraft:block/stone" -> "stone", "blocks/dirt" -> "dirt"
pub fn texture_key(name: &str) -> &str {
    let name = strip_namespace(name);
    name.strip_prefix("block/")
        .or_else(|| name.strip_prefix("blocks/"))
        .unwrap_or(name)
}
