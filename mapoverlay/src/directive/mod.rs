//! Directives: the declarative front end of the overlay.
//!
//! Each directive owns one layer (or one marker), turns declarative input
//! changes into service calls, and re-exposes provider events as typed
//! broadcast outputs.
//!
//! Structural input errors are reported synchronously by `on_changes`, before
//! any asynchronous work is scheduled:
//!
//! ```ignore
//! directive.on_changes(changes)?.await?;
//! ```

mod cluster_layer;
mod collection;
mod events;
mod host;
mod labels;
mod layer;
mod marker;
mod marker_layer;
mod polygon_layer;
mod stream;

pub use cluster_layer::ClusterLayerDirective;
pub use collection::{Collection, Markers, Polygons};
pub use events::{
    forward_events, EntityEvent, EventOutputs, MARKER_EVENTS, OUTPUT_CHANNEL_CAPACITY,
    POLYGON_EVENTS,
};
pub use host::LayerRef;
pub use labels::LabelChange;
pub use layer::{LayerChange, LayerDirective};
pub use marker::{marker_patch, MarkerChange, MarkerDirective};
pub use marker_layer::{MarkerLayerChange, MarkerLayerConfig, MarkerLayerDirective};
pub use polygon_layer::{PolygonLayerChange, PolygonLayerConfig, PolygonLayerDirective};
pub use stream::{Update, UpdateBuffer};
