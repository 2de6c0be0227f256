//! In-memory layers.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cluster::{ClusterOptions, ClusterPatch, GridClusterer};
use crate::entity::MarkerOptions;
use crate::layer::{LayerId, LayerOptions, LayerPatch};
use crate::provider::{
    Cluster, ClusterLayerHandle, EntityHandle, EventKind, EventSource, LayerEntity, LayerHandle,
    Listener, ListenerHandle, ListenerRegistry, MarkerHandle,
};

use super::entity::{MemoryMarker, MemoryPolygon, MemoryPolyline};

pub type MemoryLayerEntity = LayerEntity<MemoryMarker, MemoryPolygon, MemoryPolyline>;

fn attach(entity: &MemoryLayerEntity, listeners: &ListenerRegistry) {
    match entity {
        LayerEntity::Marker(m) => m.attach(listeners),
        LayerEntity::Polygon(p) => p.attach(listeners),
        LayerEntity::Polyline(l) => l.attach(listeners),
    }
}

struct LayerInner {
    options: Mutex<LayerOptions>,
    entities: Mutex<Vec<MemoryLayerEntity>>,
    deleted: AtomicBool,
    listeners: ListenerRegistry,
}

/// Layer materialised by [`MemoryProvider`](super::MemoryProvider).
#[derive(Clone)]
pub struct MemoryLayer {
    inner: Arc<LayerInner>,
}

impl MemoryLayer {
    pub(crate) fn new(options: LayerOptions) -> Self {
        Self {
            inner: Arc::new(LayerInner {
                options: Mutex::new(options),
                entities: Mutex::new(Vec::new()),
                deleted: AtomicBool::new(false),
                listeners: ListenerRegistry::new(),
            }),
        }
    }

    pub fn entity_count(&self) -> usize {
        self.inner.entities.lock().len()
    }

    /// Listeners attached to the layer itself.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.listener_count()
    }

    pub fn listener_count_for(&self, kind: EventKind) -> usize {
        self.inner.listeners.listener_count_for(kind)
    }

    /// Markers currently in the layer, in insertion order.
    pub fn markers(&self) -> Vec<MemoryMarker> {
        self.inner
            .entities
            .lock()
            .iter()
            .filter_map(|e| e.as_marker().cloned())
            .collect()
    }

    pub fn polygons(&self) -> Vec<MemoryPolygon> {
        self.inner
            .entities
            .lock()
            .iter()
            .filter_map(|e| match e {
                LayerEntity::Polygon(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }
}

impl MemoryLayer {
    /// Entities handed to a deleted layer are deleted instead of attached.
    fn reject_if_deleted(&self, entities: &[MemoryLayerEntity]) -> bool {
        if !self.is_deleted() {
            return false;
        }
        warn!(
            layer_id = %self.layer_id(),
            count = entities.len(),
            "Entities added to deleted layer, deleting them"
        );
        for entity in entities {
            entity.delete();
        }
        true
    }
}

impl fmt::Debug for MemoryLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryLayer")
            .field("options", &*self.inner.options.lock())
            .field("entities", &self.entity_count())
            .field("deleted", &self.is_deleted())
            .finish()
    }
}

impl EventSource for MemoryLayer {
    fn add_listener(&self, kind: EventKind, listener: Listener) -> ListenerHandle {
        self.inner.listeners.add(kind, listener)
    }
}

impl LayerHandle for MemoryLayer {
    type Marker = MemoryMarker;
    type Polygon = MemoryPolygon;
    type Polyline = MemoryPolyline;

    fn layer_id(&self) -> LayerId {
        self.inner.options.lock().id
    }

    fn options(&self) -> LayerOptions {
        self.inner.options.lock().clone()
    }

    fn set_options(&self, patch: &LayerPatch) {
        self.inner.options.lock().apply(patch);
    }

    fn set_entities(&self, entities: Vec<MemoryLayerEntity>) {
        if self.reject_if_deleted(&entities) {
            return;
        }
        let keep: HashSet<_> = entities.iter().map(|e| e.entity_id()).collect();
        for entity in &entities {
            attach(entity, &self.inner.listeners);
        }
        let previous = std::mem::replace(&mut *self.inner.entities.lock(), entities);
        for entity in previous.iter().filter(|e| !keep.contains(&e.entity_id())) {
            entity.delete();
        }
        debug!(layer_id = %self.layer_id(), count = keep.len(), "Layer entities replaced");
    }

    fn add_entities(&self, entities: Vec<MemoryLayerEntity>) {
        if self.reject_if_deleted(&entities) {
            return;
        }
        for entity in &entities {
            attach(entity, &self.inner.listeners);
        }
        self.inner.entities.lock().extend(entities);
    }

    fn entities(&self) -> Vec<MemoryLayerEntity> {
        self.inner.entities.lock().clone()
    }

    fn delete(&self) {
        if self.inner.deleted.swap(true, Ordering::AcqRel) {
            return;
        }
        let entities = std::mem::take(&mut *self.inner.entities.lock());
        for entity in &entities {
            entity.delete();
        }
        self.inner.listeners.clear();
    }

    fn is_deleted(&self) -> bool {
        self.inner.deleted.load(Ordering::Acquire)
    }
}

/// Clustering layer materialised by [`MemoryProvider`](super::MemoryProvider).
#[derive(Clone)]
pub struct MemoryClusterLayer {
    layer: MemoryLayer,
    cluster: Arc<Mutex<ClusterOptions>>,
    clustering: Arc<AtomicBool>,
}

impl MemoryClusterLayer {
    pub(crate) fn new(options: ClusterOptions) -> Self {
        let clustering = options.clustering_enabled;
        Self {
            layer: MemoryLayer::new(options.layer_options()),
            cluster: Arc::new(Mutex::new(options)),
            clustering: Arc::new(AtomicBool::new(clustering)),
        }
    }

    /// The plain layer holding the markers.
    pub fn layer(&self) -> &MemoryLayer {
        &self.layer
    }
}

impl fmt::Debug for MemoryClusterLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryClusterLayer")
            .field("layer", &self.layer)
            .field("cluster", &*self.cluster.lock())
            .field("clustering", &self.is_clustering())
            .finish()
    }
}

impl EventSource for MemoryClusterLayer {
    fn add_listener(&self, kind: EventKind, listener: Listener) -> ListenerHandle {
        self.layer.add_listener(kind, listener)
    }
}

impl LayerHandle for MemoryClusterLayer {
    type Marker = MemoryMarker;
    type Polygon = MemoryPolygon;
    type Polyline = MemoryPolyline;

    fn layer_id(&self) -> LayerId {
        self.layer.layer_id()
    }

    fn options(&self) -> LayerOptions {
        self.layer.options()
    }

    fn set_options(&self, patch: &LayerPatch) {
        self.layer.set_options(patch);
        if let Some(visible) = patch.visible {
            self.cluster.lock().visible = visible;
        }
    }

    fn set_entities(&self, entities: Vec<MemoryLayerEntity>) {
        self.layer.set_entities(entities);
    }

    fn add_entities(&self, entities: Vec<MemoryLayerEntity>) {
        self.layer.add_entities(entities);
    }

    fn entities(&self) -> Vec<MemoryLayerEntity> {
        self.layer.entities()
    }

    fn delete(&self) {
        self.layer.delete();
    }

    fn is_deleted(&self) -> bool {
        self.layer.is_deleted()
    }
}

impl ClusterLayerHandle for MemoryClusterLayer {
    fn cluster_options(&self) -> ClusterOptions {
        self.cluster.lock().clone()
    }

    fn clusters(&self, zoom: f64) -> Vec<Cluster<MemoryMarker>> {
        if !self.is_clustering() {
            return Vec::new();
        }
        let options = self.cluster_options();
        let markers: Vec<MemoryMarker> = self
            .layer
            .markers()
            .into_iter()
            .filter(|m| m.is_visible())
            .collect();
        let member_options: Vec<MarkerOptions> = markers.iter().map(|m| m.options()).collect();
        let locations: Vec<_> = member_options.iter().map(|o| o.position).collect();

        let clusterer = GridClusterer::new(
            options.grid_size,
            options.minimum_cluster_size,
            options.placement_mode,
        );
        clusterer
            .cluster(&locations, zoom)
            .clusters
            .into_iter()
            .map(|bucket| {
                let members_options: Vec<MarkerOptions> = bucket
                    .members
                    .iter()
                    .map(|&i| member_options[i].clone())
                    .collect();
                let mut icon_info = options.icon_info.clone().unwrap_or_default();
                let icon = options
                    .icon_callback
                    .as_ref()
                    .map(|callback| callback(&members_options, &mut icon_info));
                Cluster {
                    location: bucket.location,
                    members: bucket.members.iter().map(|&i| markers[i].clone()).collect(),
                    icon,
                    icon_info,
                }
            })
            .collect()
    }

    fn is_clustering(&self) -> bool {
        self.clustering.load(Ordering::Acquire)
    }

    fn set_cluster_options(&self, patch: &ClusterPatch) {
        self.cluster.lock().apply(patch);
        if let Some(enabled) = patch.clustering_enabled {
            self.clustering.store(enabled, Ordering::Release);
        }
        if let Some(visible) = patch.visible {
            self.layer.set_visible(visible);
        }
    }

    fn start_clustering(&self) {
        self.clustering.store(true, Ordering::Release);
        self.cluster.lock().clustering_enabled = true;
    }

    fn stop_clustering(&self) {
        self.clustering.store(false, Ordering::Release);
        self.cluster.lock().clustering_enabled = false;
    }
}
