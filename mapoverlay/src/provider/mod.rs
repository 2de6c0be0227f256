//! Map provider abstraction
//!
//! This module defines the contract the overlay core requires from a map SDK
//! adapter, the event plumbing those adapters use, and an in-memory reference
//! adapter.

mod events;
pub mod memory;
mod types;

pub use events::{
    EventKind, EventSource, EventStream, EventTarget, Listener, ListenerHandle, ListenerRegistry,
    MapEvent,
};
pub use types::{
    Cluster, ClusterLayerHandle, EntityHandle, EntityId, EntityOf, LayerEntity, LayerHandle,
    MapProvider, MarkerHandle, PolygonHandle, PolylineHandle, ProviderError,
};
