//! Asset bundle loading from an extracted directory.
//!
//! Loading is best-effort: a file that cannot be read, parsed or decoded is
//! recorded as a diagnostic and skipped. Only a missing bundle root aborts.

use super::{AssetBundle, BlockstateDefinition, ModelDefinition};
use crate::assets::texture::load_texture_from_bytes;
use crate::error::{CompileError, Diagnostic, Result};
use std::path::Path;

/// Texture folders under `textures/`, current name first.
const TEXTURE_FOLDERS: [&str; 2] = ["block", "blocks"];

/// Load an asset bundle from a directory containing `assets/minecraft`.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<AssetBundle> {
    let namespace_path = path.as_ref().join("assets").join("minecraft");
    if !namespace_path.is_dir() {
        return Err(CompileError::InvalidAssetBundle(format!(
            "{} has no assets/minecraft directory",
            path.as_ref().display()
        )));
    }

    let mut bundle = AssetBundle::new();
    let mut diagnostics = Vec::new();

    // Load blockstates
    let blockstates_path = namespace_path.join("blockstates");
    if blockstates_path.is_dir() {
        load_files_recursive(
            &blockstates_path,
            &blockstates_path,
            "json",
            &mut diagnostics,
            &mut |name, data| {
                let definition = serde_json::from_slice::<BlockstateDefinition>(data)?;
                bundle.add_blockstate(name, definition);
                Ok(())
            },
        );
    }

    // Load models
    let models_path = namespace_path.join("models").join("block");
    if models_path.is_dir() {
        load_files_recursive(
            &models_path,
            &models_path,
            "json",
            &mut diagnostics,
            &mut |name, data| {
                let model = serde_json::from_slice::<ModelDefinition>(data)?;
                bundle.add_model(name, model);
                Ok(())
            },
        );
    }

    // Load textures; the first folder wins when both spell the same name
    for folder in TEXTURE_FOLDERS {
        let textures_path = namespace_path.join("textures").join(folder);
        if !textures_path.is_dir() {
            continue;
        }
        load_files_recursive(
            &textures_path,
            &textures_path,
            "png",
            &mut diagnostics,
            &mut |name, data| {
                if bundle.get_texture(name).is_none() {
                    bundle.add_texture(name, load_texture_from_bytes(data)?);
                }
                Ok(())
            },
        );
    }

    bundle.diagnostics = diagnostics;
    log::info!(
        "Loaded {} blockstates, {} models, {} textures ({} skipped)",
        bundle.blockstate_count(),
        bundle.model_count(),
        bundle.texture_count(),
        bundle.diagnostics.len()
    );

    Ok(bundle)
}

/// Walk `dir` and hand every file with `extension` to `handler`, keyed by its
/// path relative to `base` without the extension.
fn load_files_recursive<F>(
    base: &Path,
    dir: &Path,
    extension: &str,
    diagnostics: &mut Vec<Diagnostic>,
    handler: &mut F,
) where
    F: FnMut(&str, &[u8]) -> Result<()>,
{
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            diagnostics.push(Diagnostic::warn(dir.display().to_string(), e.into()));
            return;
        }
    };

    // Directory order is platform dependent
    let mut paths: Vec<_> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            load_files_recursive(base, &path, extension, diagnostics, handler);
            continue;
        }
        if path.extension().map(|e| e != extension).unwrap_or(true) {
            continue;
        }

        let relative = path
            .strip_prefix(base)
            .unwrap_or(&path)
            .with_extension("")
            .to_string_lossy()
            .replace('\\', "/");

        let result = std::fs::read(&path)
            .map_err(CompileError::from)
            .and_then(|data| handler(&relative, &data));
        if let Err(e) = result {
            diagnostics.push(Diagnostic::warn(path.display().to_string(), e));
        }
    }
}
