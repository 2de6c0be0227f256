//! MapOverlay - provider-agnostic marker, cluster and label overlays
//!
//! This library keeps declarative layer descriptions in sync with a map SDK:
//! layers are registered once, filled with markers and polygons, clustered,
//! labelled on a canvas overlay, and updated live as inputs change.
//!
//! # High-Level API
//!
//! An [`service::OverlayContext`] bundles the provider, the map and the
//! layer, cluster and entity services. Directives are created against it:
//!
//! ```ignore
//! use mapoverlay::directive::{MarkerLayerChange, MarkerLayerConfig, MarkerLayerDirective};
//! use mapoverlay::service::OverlayContext;
//!
//! let ctx = OverlayContext::new(provider, map);
//! let layer = MarkerLayerDirective::new(&ctx, MarkerLayerConfig::default());
//! layer.attach().await?;
//! layer.on_changes(vec![MarkerLayerChange::MarkerOptions(pins)])?.await?;
//! ```

pub mod cluster;
pub mod config;
pub mod coord;
pub mod directive;
pub mod entity;
pub mod error;
pub mod layer;
pub mod logging;
pub mod map;
pub mod overlay;
pub mod provider;
pub mod service;

/// Version of the MapOverlay library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
