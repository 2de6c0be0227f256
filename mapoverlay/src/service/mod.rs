//! Composition root.
//!
//! [`OverlayContext`] bundles the active provider, the map and the services
//! built on them. Directives hold an `Arc` to the context.

mod context;

pub use context::OverlayContext;
