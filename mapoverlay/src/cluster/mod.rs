//! Marker clustering: cluster layer service, grid clusterer and dynamic
//! cluster icons.

mod changes;
mod grid;
mod icon;
mod options;
mod service;

pub use changes::{cluster_patch, ClusterChange};
pub use grid::{Bucket, Clustering, GridClusterer};
pub use icon::{
    create_dynamic_size_marker, DynamicMarkerRange, DEFAULT_BASE_SIZE, FALLBACK_COLOR,
    MAX_SAFE_COUNT, MIN_BASE_SIZE,
};
pub use options::{
    ClusterClickAction, ClusterOptions, ClusterPatch, ClusterPlacementMode, IconCreationCallback,
};
pub use service::ClusterService;
