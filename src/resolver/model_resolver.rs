//! Model inheritance resolution.
//!
//! Models are resolved into an arena: each distinct model name becomes one
//! [`BlockModel`] record, and parent links are [`ModelId`] indices into the
//! same arena. Resolution is memoized by name, and a model that is reached
//! again while its own parent chain is still being resolved is reported as a
//! cycle.

use crate::assets::{normalize_model_name, texture_key, AssetBundle, Element};
use crate::error::{CompileError, Diagnostic, Result};
use std::collections::{HashMap, HashSet};

/// Index of a resolved model in a [`ModelResolver`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub usize);

/// A resolved block model record.
#[derive(Debug, Clone)]
pub struct BlockModel {
    /// Normalized model name (e.g., "stone").
    pub name: String,
    pub parent: Option<ModelId>,
    pub ambient_occlusion: bool,
    /// Texture variables declared by this model alone.
    pub textures: HashMap<String, String>,
    /// Valid elements declared by this model alone.
    pub elements: Vec<Element>,
    /// Whether the model file lists any elements, valid or not.
    pub declares_elements: bool,
}

/// Resolves model names against an asset bundle into an arena.
pub struct ModelResolver<'a> {
    bundle: &'a AssetBundle,
    models: Vec<BlockModel>,
    by_name: HashMap<String, ModelId>,
    resolving: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ModelResolver<'a> {
    pub fn new(bundle: &'a AssetBundle) -> Self {
        Self {
            bundle,
            models: Vec::new(),
            by_name: HashMap::new(),
            resolving: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Resolve a model and its parent chain, memoized by name.
    pub fn resolve_model(&mut self, name: &str) -> Result<ModelId> {
        let key = normalize_model_name(name);
        if let Some(&id) = self.by_name.get(key) {
            return Ok(id);
        }

        if self.resolving.iter().any(|n| n == key) {
            let mut chain = self.resolving.join(" -> ");
            chain.push_str(" -> ");
            chain.push_str(key);
            return Err(CompileError::CircularParent(chain));
        }

        let bundle = self.bundle;
        let definition = bundle
            .get_model(key)
            .ok_or_else(|| CompileError::ModelNotFound(key.to_string()))?;

        let parent = match definition.parent.as_deref().map(normalize_model_name) {
            // builtin/* parents have no file; they end the chain
            Some(parent) if !parent.starts_with("builtin/") => {
                self.resolving.push(key.to_string());
                let resolved = self.resolve_model(parent);
                self.resolving.pop();
                Some(resolved?)
            }
            _ => None,
        };

        let mut elements = Vec::with_capacity(definition.elements.len());
        for (index, element) in definition.elements.iter().enumerate() {
            match element.to_element() {
                Ok(element) => elements.push(element),
                Err(e) => self
                    .diagnostics
                    .push(Diagnostic::warn(format!("{} element {}", key, index), e)),
            }
        }

        let id = ModelId(self.models.len());
        self.models.push(BlockModel {
            name: key.to_string(),
            parent,
            ambient_occlusion: definition.ambient_occlusion,
            textures: definition.textures.clone(),
            elements,
            declares_elements: !definition.elements.is_empty(),
        });
        self.by_name.insert(key.to_string(), id);
        log::debug!("Resolved model {} as {:?}", key, id);

        Ok(id)
    }

    /// Get a resolved model by id.
    pub fn get(&self, id: ModelId) -> &BlockModel {
        &self.models[id.0]
    }

    /// Look up an already resolved model by name.
    pub fn id_of(&self, name: &str) -> Option<ModelId> {
        self.by_name.get(normalize_model_name(name)).copied()
    }

    /// The model itself followed by its ancestors.
    pub fn ancestors(&self, id: ModelId) -> impl Iterator<Item = &BlockModel> {
        std::iter::successors(Some(self.get(id)), move |model| {
            model.parent.map(|parent| self.get(parent))
        })
    }

    /// Elements of the nearest model in the chain (self first) declaring any.
    ///
    /// A model whose declared elements were all rejected still ends the
    /// search and contributes nothing.
    pub fn effective_elements(&self, id: ModelId) -> &[Element] {
        self.ancestors(id)
            .find(|model| model.declares_elements)
            .map(|model| model.elements.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve a face texture reference to an atlas key.
    ///
    /// A reference without `#` is already concrete. Otherwise the alias is
    /// looked up from `id` upwards; a value that is itself an alias restarts
    /// the lookup from `id`, so children can override what a parent's alias
    /// points to. Running out of ancestors or revisiting an alias fails.
    pub fn resolve_texture_id(&self, id: ModelId, reference: &str) -> Result<String> {
        let Some(mut alias) = reference.strip_prefix('#') else {
            return Ok(texture_key(reference).to_string());
        };

        let mut seen = HashSet::new();
        loop {
            if !seen.insert(alias) {
                return Err(CompileError::UnresolvedTexture(format!(
                    "{} in {}: alias cycle through #{}",
                    reference,
                    self.get(id).name,
                    alias
                )));
            }

            let value = self
                .ancestors(id)
                .find_map(|model| model.textures.get(alias))
                .ok_or_else(|| {
                    CompileError::UnresolvedTexture(format!(
                        "{} in {}: #{} is never defined",
                        reference,
                        self.get(id).name,
                        alias
                    ))
                })?;

            match value.strip_prefix('#') {
                Some(next) => alias = next,
                None => return Ok(texture_key(value).to_string()),
            }
        }
    }

    /// Number of models in the arena.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Take the element-level diagnostics collected so far.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}
