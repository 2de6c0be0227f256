//! CLI command implementations.
//!
//! - [`icon`] - Dynamic cluster icon output
//! - [`render`] - Scene rendering against the in-memory adapter
//! - [`scene`] - JSON scene loading

pub mod icon;
pub mod render;
pub mod scene;
