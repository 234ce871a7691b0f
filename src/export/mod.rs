//! Compiled output export.
//!
//! This module writes compiled blockstates and the atlas in the layout the
//! web viewer loads.

pub mod web;

pub use web::{block_state_json, write_web_export};
