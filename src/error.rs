//! Error types for the block asset compiler.

use thiserror::Error;

/// Result type alias using CompileError.
pub type Result<T> = std::result::Result<T, CompileError>;

/// Main error type for asset compilation.
#[derive(Error, Debug)]
pub enum CompileError {
    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read or process an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The asset directory does not have the expected layout.
    #[error("Invalid asset bundle: {0}")]
    InvalidAssetBundle(String),

    /// A model (or one of its parents) is not part of the bundle.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// A model is its own ancestor.
    #[error("Circular parent reference: {0}")]
    CircularParent(String),

    /// Texture reference could not be resolved.
    #[error("Unresolved texture reference: {0}")]
    UnresolvedTexture(String),

    /// Texture resolved to a name the atlas does not contain.
    #[error("Texture not in atlas: {0}")]
    MissingAtlasTexture(String),

    /// A model element violates the model format.
    #[error("Invalid element: {0}")]
    InvalidElement(String),

    /// A blockstate placement violates the blockstate format.
    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),

    /// A texture could not be placed in the atlas.
    #[error("Atlas packing error: {0}")]
    AtlasPacking(String),

    /// Failed to export compiled data.
    #[error("Export error: {0}")]
    Export(String),
}

/// A non-fatal failure recorded while the run continues.
#[derive(Debug)]
pub struct Diagnostic {
    /// What failed: a file, model, element or texture name.
    pub subject: String,
    /// Why it failed.
    pub error: CompileError,
}

impl Diagnostic {
    /// Record a failure and log it as a warning.
    pub fn warn(subject: impl Into<String>, error: CompileError) -> Self {
        let subject = subject.into();
        log::warn!("Skipping {}: {}", subject, error);
        Self { subject, error }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.subject, self.error)
    }
}
