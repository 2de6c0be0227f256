//! In-memory reference adapter.
//!
//! Materialises layers and entities in process. It behaves like a real SDK
//! adapter in the ways the overlay core depends on: creation waits until the
//! provider reports it has loaded, batches preserve input order, and entity
//! events bubble to the layer holding the entity. Used by the CLI and by
//! tests.

mod entity;
mod layer;

pub use entity::{EntityOptions, MemoryEntity, MemoryMarker, MemoryPolygon, MemoryPolyline};
pub use layer::{MemoryClusterLayer, MemoryLayer, MemoryLayerEntity};

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::cluster::ClusterOptions;
use crate::entity::{IconInfo, MarkerOptions, PolygonOptions, PolylineOptions};
use crate::layer::LayerOptions;

use super::types::{EntityId, MapProvider, ProviderError};

const PROVIDER_NAME: &str = "memory";

pub struct MemoryProvider {
    reconfigurable_clusters: bool,
    loaded: watch::Sender<bool>,
    /// While true, entity creation waits even after load
    creation_held: watch::Sender<bool>,
    markers: Mutex<Vec<MemoryMarker>>,
    next_entity: AtomicU64,
    layers_created: AtomicUsize,
}

impl MemoryProvider {
    /// A provider that has not finished loading. Creation calls wait until
    /// [`mark_loaded`](Self::mark_loaded) is called. Live cluster
    /// reconfiguration is off until enabled with
    /// [`with_reconfigurable_clusters`](Self::with_reconfigurable_clusters).
    pub fn new() -> Self {
        let (loaded, _) = watch::channel(false);
        let (creation_held, _) = watch::channel(false);
        Self {
            reconfigurable_clusters: false,
            loaded,
            creation_held,
            markers: Mutex::new(Vec::new()),
            next_entity: AtomicU64::new(1),
            layers_created: AtomicUsize::new(0),
        }
    }

    /// A provider that is ready immediately.
    pub fn loaded() -> Self {
        let provider = Self::new();
        provider.mark_loaded();
        provider
    }

    /// Select whether cluster layers accept live reconfiguration.
    pub fn with_reconfigurable_clusters(mut self, reconfigurable: bool) -> Self {
        self.reconfigurable_clusters = reconfigurable;
        self
    }

    pub fn mark_loaded(&self) {
        if !self.loaded.send_replace(true) {
            info!(provider = PROVIDER_NAME, "Provider loaded");
        }
    }

    pub fn is_loaded(&self) -> bool {
        *self.loaded.borrow()
    }

    /// Park entity creation until [`release_creation`](Self::release_creation).
    /// Layer creation is not affected.
    pub fn hold_creation(&self) {
        self.creation_held.send_replace(true);
    }

    pub fn release_creation(&self) {
        self.creation_held.send_replace(false);
    }

    /// Number of entity creation calls currently parked by
    /// [`hold_creation`](Self::hold_creation).
    pub fn held_creations(&self) -> usize {
        self.creation_held.receiver_count()
    }

    /// Every marker materialised so far, in creation order.
    pub fn created_markers(&self) -> Vec<MemoryMarker> {
        self.markers.lock().clone()
    }

    /// Number of layers (plain and clustering) materialised so far.
    pub fn layer_count(&self) -> usize {
        self.layers_created.load(Ordering::Relaxed)
    }

    async fn ready(&self) -> Result<(), ProviderError> {
        let mut rx = self.loaded.subscribe();
        rx.wait_for(|loaded| *loaded)
            .await
            .map(|_| ())
            .map_err(|_| ProviderError::ProviderSpecific("provider shut down while loading".into()))
    }

    async fn entities_ready(&self) -> Result<(), ProviderError> {
        self.ready().await?;
        let mut rx = self.creation_held.subscribe();
        rx.wait_for(|held| !*held)
            .await
            .map(|_| ())
            .map_err(|_| ProviderError::ProviderSpecific("provider shut down while creating".into()))
    }

    fn next_id(&self) -> EntityId {
        EntityId(self.next_entity.fetch_add(1, Ordering::Relaxed))
    }

    fn materialise<O: EntityOptions>(
        &self,
        options: Vec<O>,
        icon: Option<IconInfo>,
    ) -> Vec<MemoryEntity<O>> {
        options
            .into_iter()
            .map(|o| MemoryEntity::new(self.next_id(), o, icon.clone()))
            .collect()
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MapProvider for MemoryProvider {
    type Marker = MemoryMarker;
    type Polygon = MemoryPolygon;
    type Polyline = MemoryPolyline;
    type Layer = MemoryLayer;
    type ClusterLayer = MemoryClusterLayer;

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn reconfigurable_clusters(&self) -> bool {
        self.reconfigurable_clusters
    }

    fn create_layer(
        &self,
        options: LayerOptions,
    ) -> impl Future<Output = Result<MemoryLayer, ProviderError>> + Send {
        async move {
            self.ready().await?;
            self.layers_created.fetch_add(1, Ordering::Relaxed);
            Ok(MemoryLayer::new(options))
        }
    }

    fn create_cluster_layer(
        &self,
        options: ClusterOptions,
    ) -> impl Future<Output = Result<MemoryClusterLayer, ProviderError>> + Send {
        async move {
            if options.grid_size.is_nan() || options.grid_size <= 0.0 {
                return Err(ProviderError::InvalidOptions(format!(
                    "grid size must be positive, got {}",
                    options.grid_size
                )));
            }
            self.ready().await?;
            self.layers_created.fetch_add(1, Ordering::Relaxed);
            Ok(MemoryClusterLayer::new(options))
        }
    }

    fn create_markers(
        &self,
        options: Vec<MarkerOptions>,
        icon: Option<IconInfo>,
    ) -> impl Future<Output = Result<Vec<MemoryMarker>, ProviderError>> + Send {
        async move {
            self.entities_ready().await?;
            debug!(count = options.len(), "Materialising markers");
            let markers = self.materialise(options, icon);
            self.markers.lock().extend(markers.iter().cloned());
            Ok(markers)
        }
    }

    fn create_polygons(
        &self,
        options: Vec<PolygonOptions>,
    ) -> impl Future<Output = Result<Vec<MemoryPolygon>, ProviderError>> + Send {
        async move {
            self.entities_ready().await?;
            Ok(self.materialise(options, None))
        }
    }

    fn create_polylines(
        &self,
        options: Vec<PolylineOptions>,
    ) -> impl Future<Output = Result<Vec<MemoryPolyline>, ProviderError>> + Send {
        async move {
            self.entities_ready().await?;
            Ok(self.materialise(options, None))
        }
    }
}
