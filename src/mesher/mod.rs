//! Geometry compilation from block models.
//!
//! This module turns an asset bundle into a packed atlas plus one oriented
//! vertex buffer per blockstate placement.

pub mod element;
pub mod geometry;
pub mod orient;

pub use element::{CompiledModel, GeometryCompiler};
pub use geometry::{Vertex, VertexBuffer};
pub use orient::orient;

use crate::assets::{
    blockstate::variant_matches, AssetBundle, BlockstateDefinition, MultipartCondition, Placement,
};
use crate::atlas::{AtlasPacker, PackMiss, TextureAtlas};
use crate::error::{CompileError, Diagnostic, Result};
use crate::resolver::{ModelId, ModelResolver};
use crate::types::{BlockProperties, PlacementTransform};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

/// Main compiler configuration.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Maximum texture atlas dimension.
    pub max_atlas_size: u32,
    /// Compile each model once and share it between its placements.
    pub cache_base_geometry: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_atlas_size: 32768,
            cache_base_geometry: true,
        }
    }
}

impl CompilerConfig {
    pub fn with_max_atlas_size(mut self, max_atlas_size: u32) -> Self {
        self.max_atlas_size = max_atlas_size;
        self
    }

    pub fn with_geometry_cache(mut self, enabled: bool) -> Self {
        self.cache_base_geometry = enabled;
        self
    }
}

/// A placement's geometry after orientation.
#[derive(Debug, Clone)]
pub struct RenderableModel {
    /// Model name as written in the blockstate.
    pub model: String,
    pub model_id: ModelId,
    pub transform: PlacementTransform,
    pub weight: u32,
    pub buffer: VertexBuffer,
}

/// When a compiled entry applies.
#[derive(Debug, Clone, PartialEq)]
pub enum StateCondition {
    /// A variant key such as "facing=north,lit=true".
    Variant(String),
    /// A multipart `when`; `None` always applies.
    Multipart(Option<MultipartCondition>),
}

impl StateCondition {
    pub fn matches(&self, properties: &BlockProperties) -> bool {
        match self {
            StateCondition::Variant(key) => variant_matches(key, properties),
            StateCondition::Multipart(when) => {
                when.as_ref().map(|c| c.matches(properties)).unwrap_or(true)
            }
        }
    }
}

/// One variant or multipart case with its compiled placements.
#[derive(Debug, Clone)]
pub struct CompiledEntry {
    pub condition: StateCondition,
    /// Placements that compiled, in document order.
    pub models: Vec<RenderableModel>,
}

/// A compiled blockstate.
#[derive(Debug, Clone)]
pub struct CompiledBlockState {
    /// Blockstate file name (e.g., "oak_stairs").
    pub name: String,
    pub entries: Vec<CompiledEntry>,
}

impl CompiledBlockState {
    pub fn is_multipart(&self) -> bool {
        self.entries
            .first()
            .map(|e| matches!(e.condition, StateCondition::Multipart(_)))
            .unwrap_or(false)
    }

    /// Models displayed for a set of block properties.
    ///
    /// Variants pick the first matching key; multipart collects every
    /// matching case. Weighted alternatives resolve to their first entry.
    pub fn models_for(&self, properties: &BlockProperties) -> Vec<&RenderableModel> {
        let mut matching = self
            .entries
            .iter()
            .filter(|entry| entry.condition.matches(properties))
            .filter_map(|entry| entry.models.first());

        if self.is_multipart() {
            matching.collect()
        } else {
            matching.next().into_iter().collect()
        }
    }

    /// Every compiled model across all entries.
    pub fn models(&self) -> impl Iterator<Item = &RenderableModel> {
        self.entries.iter().flat_map(|e| e.models.iter())
    }
}

/// Output of a compile run.
#[derive(Debug)]
pub struct CompileOutput {
    pub atlas: TextureAtlas,
    /// Blockstates sorted by name.
    pub block_states: Vec<CompiledBlockState>,
    /// Everything skipped along the way.
    pub diagnostics: Vec<Diagnostic>,
    /// Textures left out of the atlas.
    pub misses: Vec<PackMiss>,
}

impl CompileOutput {
    pub fn block_state(&self, name: &str) -> Option<&CompiledBlockState> {
        self.block_states.iter().find(|state| state.name == name)
    }

    /// Total number of compiled placements.
    pub fn model_count(&self) -> usize {
        self.block_states.iter().map(|s| s.models().count()).sum()
    }

    /// Write blockstate JSON files and the atlas PNG under `dir`.
    pub fn write_web_export<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        crate::export::write_web_export(self, dir)
    }
}

/// The main compiler struct.
pub struct Compiler {
    bundle: AssetBundle,
    config: CompilerConfig,
}

impl Compiler {
    /// Create a new compiler with default configuration.
    pub fn new(bundle: AssetBundle) -> Self {
        Self::with_config(bundle, CompilerConfig::default())
    }

    /// Create a new compiler with custom configuration.
    pub fn with_config(bundle: AssetBundle, config: CompilerConfig) -> Self {
        Self { bundle, config }
    }

    pub fn bundle(&self) -> &AssetBundle {
        &self.bundle
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Pack the atlas and compile every blockstate.
    pub fn compile(mut self) -> CompileOutput {
        let mut diagnostics = std::mem::take(&mut self.bundle.diagnostics);

        let mut packer = AtlasPacker::new(self.config.max_atlas_size);
        for (name, texture) in &self.bundle.textures {
            packer.add_texture(name.as_str(), texture);
        }
        let packed = packer.pack();
        // Already logged by the packer
        diagnostics.extend(packed.misses.iter().map(|miss| Diagnostic {
            subject: miss.name.clone(),
            error: CompileError::AtlasPacking(miss.to_string()),
        }));
        log::info!(
            "Packed {} textures into a {}x{} atlas",
            packed.atlas.len(),
            packed.atlas.side(),
            packed.atlas.side()
        );

        let mut state = CompileState {
            resolver: ModelResolver::new(&self.bundle),
            atlas: &packed.atlas,
            cache: HashMap::new(),
            use_cache: self.config.cache_base_geometry,
            diagnostics: &mut diagnostics,
        };

        let block_states: Vec<_> = self
            .bundle
            .blockstates
            .iter()
            .map(|(name, definition)| state.compile_block_state(name, definition))
            .collect();

        let resolved_models = state.resolver.len();
        let cached_models = state.cache.len();
        let element_diagnostics = state.resolver.take_diagnostics();
        diagnostics.extend(element_diagnostics);

        let output = CompileOutput {
            atlas: packed.atlas,
            block_states,
            diagnostics,
            misses: packed.misses,
        };
        log::info!(
            "Compiled {} blockstates ({} placements, {} models, {} cached) with {} diagnostics",
            output.block_states.len(),
            output.model_count(),
            resolved_models,
            cached_models,
            output.diagnostics.len()
        );
        output
    }
}

/// Per-run state shared by all blockstates.
struct CompileState<'a> {
    resolver: ModelResolver<'a>,
    atlas: &'a TextureAtlas,
    cache: HashMap<ModelId, Rc<VertexBuffer>>,
    use_cache: bool,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl CompileState<'_> {
    fn compile_block_state(&mut self, name: &str, definition: &BlockstateDefinition) -> CompiledBlockState {
        let entries = match definition {
            BlockstateDefinition::Variants(variants) => variants
                .iter()
                .map(|(key, placements)| CompiledEntry {
                    condition: StateCondition::Variant(key.clone()),
                    models: self.compile_placements(name, placements),
                })
                .collect(),
            BlockstateDefinition::Multipart(cases) => cases
                .iter()
                .map(|case| CompiledEntry {
                    condition: StateCondition::Multipart(case.when.clone()),
                    models: self.compile_placements(name, &case.apply),
                })
                .collect(),
        };

        log::debug!("Compiled blockstate {}", name);
        CompiledBlockState {
            name: name.to_string(),
            entries,
        }
    }

    fn compile_placements(&mut self, block: &str, placements: &[Placement]) -> Vec<RenderableModel> {
        placements
            .iter()
            .filter_map(|placement| match self.compile_placement(placement) {
                Ok(model) => Some(model),
                Err(e) => {
                    let subject = format!("{} placement {}", block, placement.model);
                    self.diagnostics.push(Diagnostic::warn(subject, e));
                    None
                }
            })
            .collect()
    }

    fn compile_placement(&mut self, placement: &Placement) -> Result<RenderableModel> {
        placement.validate()?;
        let transform = placement.transform();

        let model_id = self.resolver.resolve_model(&placement.model)?;
        let base = self.base_geometry(model_id);

        let mut buffer = (*base).clone();
        orient(&mut buffer, transform);

        Ok(RenderableModel {
            model: placement.model.clone(),
            model_id,
            transform,
            weight: placement.weight,
            buffer,
        })
    }

    /// Unoriented geometry of a model, compiled at most once when caching.
    fn base_geometry(&mut self, id: ModelId) -> Rc<VertexBuffer> {
        if let Some(buffer) = self.cache.get(&id) {
            return Rc::clone(buffer);
        }

        let compiled = GeometryCompiler::new(&self.resolver, self.atlas).compile(id);
        self.diagnostics.extend(compiled.diagnostics);
        let buffer = Rc::new(compiled.buffer);

        if self.use_cache {
            self.cache.insert(id, Rc::clone(&buffer));
        }
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{ModelDefinition, TextureData};

    fn model(json: &str) -> ModelDefinition {
        serde_json::from_str(json).unwrap()
    }

    fn blockstate(json: &str) -> BlockstateDefinition {
        serde_json::from_str(json).unwrap()
    }

    fn props(pairs: &[(&str, &str)]) -> BlockProperties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn create_test_bundle() -> AssetBundle {
        let mut bundle = AssetBundle::new();
        bundle.add_model(
            "cube_all",
            model(
                r##"{
                "elements": [{
                    "from": [0, 0, 0], "to": [16, 16, 16],
                    "faces": {
                        "down":  { "texture": "#all" },
                        "up":    { "texture": "#all" },
                        "north": { "texture": "#all" },
                        "south": { "texture": "#all" },
                        "west":  { "texture": "#all" },
                        "east":  { "texture": "#all" }
                    }
                }]
            }"##,
            ),
        );
        bundle.add_model(
            "stone",
            model(r#"{ "parent": "block/cube_all", "textures": { "all": "block/stone" } }"#),
        );
        bundle.add_model(
            "fence_post",
            model(
                r##"{
                "textures": { "texture": "block/planks" },
                "elements": [{
                    "from": [6, 0, 6], "to": [10, 16, 10],
                    "faces": { "up": { "texture": "#texture", "tintindex": 0 } }
                }]
            }"##,
            ),
        );
        bundle.add_model(
            "fence_side",
            model(
                r##"{
                "textures": { "texture": "block/planks" },
                "elements": [{
                    "from": [7, 12, 0], "to": [9, 15, 9],
                    "faces": { "north": { "texture": "#texture" } }
                }]
            }"##,
            ),
        );
        bundle.add_texture("stone", TextureData::solid(16, 16, [128, 128, 128, 255]));
        bundle.add_texture("planks", TextureData::solid(16, 16, [160, 120, 80, 255]));

        bundle.add_blockstate(
            "stone",
            blockstate(
                r#"{ "variants": { "": [
                    { "model": "block/stone" },
                    { "model": "block/stone", "y": 90 },
                    { "model": "block/stone", "y": 45 },
                    { "model": "block/missing" }
                ] } }"#,
            ),
        );
        bundle.add_blockstate(
            "oak_fence",
            blockstate(
                r#"{ "multipart": [
                    { "apply": { "model": "block/fence_post" } },
                    { "when": { "north": "true" }, "apply": { "model": "block/fence_side", "uvlock": true } },
                    { "when": { "east": "true" }, "apply": { "model": "block/fence_side", "y": 90, "uvlock": true } }
                ] }"#,
            ),
        );
        bundle
    }

    #[test]
    fn test_config_builders() {
        let config = CompilerConfig::default()
            .with_max_atlas_size(64)
            .with_geometry_cache(false);
        assert_eq!(config.max_atlas_size, 64);
        assert!(!config.cache_base_geometry);
        assert!(CompilerConfig::default().cache_base_geometry);
    }

    #[test]
    fn test_compile_bundle() {
        let output = Compiler::new(create_test_bundle()).compile();

        assert_eq!(output.atlas.len(), 2);
        assert!(output.misses.is_empty());

        // Sorted by name
        let names: Vec<_> = output.block_states.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["oak_fence", "stone"]);

        // y=45 and the missing model are skipped, the rest kept in order
        let stone = output.block_state("stone").unwrap();
        assert!(!stone.is_multipart());
        let models = &stone.entries[0].models;
        assert_eq!(models.len(), 2);
        assert_eq!(models[1].transform.y, 90);
        assert_eq!(models[0].buffer.vertex_count(), 36);
        assert_eq!(models[0].model_id, models[1].model_id);
        assert_eq!(output.diagnostics.len(), 2);

        let fence = output.block_state("oak_fence").unwrap();
        assert!(fence.is_multipart());
        assert_eq!(fence.entries.len(), 3);
        assert_eq!(output.model_count(), 5);
    }

    #[test]
    fn test_placements_are_oriented_copies() {
        let output = Compiler::new(create_test_bundle()).compile();
        let fence = output.block_state("oak_fence").unwrap();

        let north = &fence.entries[1].models[0];
        let east = &fence.entries[2].models[0];
        assert_eq!(north.model_id, east.model_id);

        // fence_side north face turned to face east
        assert_eq!(north.buffer.vertex(0).normal, [0.0, 0.0, -1.0]);
        assert_eq!(east.buffer.vertex(0).normal, [1.0, 0.0, 0.0]);
        assert!(fence.entries[0].models[0].buffer.has_tint());
    }

    #[test]
    fn test_cache_does_not_change_output() {
        let cached = Compiler::new(create_test_bundle()).compile();
        let uncached = Compiler::with_config(
            create_test_bundle(),
            CompilerConfig::default().with_geometry_cache(false),
        )
        .compile();

        let buffers = |output: &CompileOutput| -> Vec<VertexBuffer> {
            output
                .block_states
                .iter()
                .flat_map(|s| s.models().map(|m| m.buffer.clone()))
                .collect()
        };
        assert_eq!(buffers(&cached), buffers(&uncached));
    }

    #[test]
    fn test_models_for() {
        let output = Compiler::new(create_test_bundle()).compile();
        let fence = output.block_state("oak_fence").unwrap();

        assert_eq!(fence.models_for(&props(&[])).len(), 1);
        assert_eq!(fence.models_for(&props(&[("north", "true")])).len(), 2);
        assert_eq!(
            fence
                .models_for(&props(&[("north", "true"), ("east", "true")]))
                .len(),
            3
        );

        // The empty variant key matches everything, first placement wins
        let stone = output.block_state("stone").unwrap();
        let models = stone.models_for(&props(&[("anything", "1")]));
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].transform.y, 0);
    }

    #[test]
    fn test_atlas_cap_reports_misses() {
        let output = Compiler::with_config(
            create_test_bundle(),
            CompilerConfig::default().with_max_atlas_size(16),
        )
        .compile();

        assert_eq!(output.atlas.side(), 16);
        assert_eq!(output.misses.len(), 1);
        // One of the two models lost its texture, the other still compiles
        assert!(output
            .diagnostics
            .iter()
            .any(|d| matches!(d.error, CompileError::AtlasPacking(_))));
        assert!(output
            .diagnostics
            .iter()
            .any(|d| matches!(d.error, CompileError::MissingAtlasTexture(_))));
    }

    #[test]
    fn test_zero_weight_placement_is_skipped() {
        let mut bundle = create_test_bundle();
        bundle.blockstates.clear();
        bundle.add_blockstate(
            "stone",
            blockstate(
                r#"{ "variants": { "": [
                    { "model": "block/stone", "weight": 0 },
                    { "model": "block/stone", "weight": 2 }
                ] } }"#,
            ),
        );

        let output = Compiler::new(bundle).compile();
        let models = &output.block_state("stone").unwrap().entries[0].models;
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].weight, 2);
        assert_eq!(output.diagnostics.len(), 1);
        assert!(matches!(
            output.diagnostics[0].error,
            CompileError::InvalidPlacement(_)
        ));
    }
}
