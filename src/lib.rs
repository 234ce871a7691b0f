//! # Block Asset Compiler
//!
//! A Rust library for baking Minecraft-style block assets into GPU-ready data.
//!
//! ## Overview
//!
//! This library takes an extracted asset directory (blockstates, block models
//! and block textures) and produces a packed texture atlas plus, for every
//! blockstate placement, an interleaved vertex buffer already textured
//! through the atlas and rotated into place.
//!
//! ## Quick Start
//!
//! ```ignore
//! use block_asset_compiler::{load_asset_bundle, Compiler, CompilerConfig};
//!
//! // Load an asset directory containing assets/minecraft
//! let bundle = load_asset_bundle("path/to/assets")?;
//!
//! // Pack the atlas and compile every blockstate
//! let output = Compiler::with_config(bundle, CompilerConfig::default()).compile();
//! for diagnostic in &output.diagnostics {
//!     eprintln!("skipped {}", diagnostic);
//! }
//!
//! // Write blockstates/*.json and textures/atlas.png
//! output.write_web_export("web")?;
//! ```

pub mod error;
pub mod types;
pub mod assets;
pub mod atlas;
pub mod resolver;
pub mod mesher;
pub mod export;

// Re-export main types for convenience
pub use error::{CompileError, Diagnostic, Result};
pub use types::{Axis, BlockProperties, BoundingBox, Direction, PlacementTransform};
pub use assets::{AssetBundle, BlockstateDefinition, ModelDefinition, TextureData};
pub use atlas::{AtlasRegion, PackMiss, TextureAtlas, TextureHandle};
pub use resolver::{BlockModel, ModelId, ModelResolver};
pub use mesher::{
    CompileOutput, CompiledBlockState, Compiler, CompilerConfig, RenderableModel, Vertex,
    VertexBuffer,
};
pub use export::{block_state_json, write_web_export};

/// Load an asset bundle from a directory containing `assets/minecraft`.
pub fn load_asset_bundle<P: AsRef<std::path::Path>>(path: P) -> Result<AssetBundle> {
    assets::loader::load_from_path(path)
}
