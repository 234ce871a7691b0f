//! Block model resolution.
//!
//! This module links block models into an inheritance arena and resolves
//! texture aliases through the parent chain.

pub mod model_resolver;

pub use model_resolver::{BlockModel, ModelId, ModelResolver};
