//! Cluster layer service.
//!
//! Same registration and resolution semantics as
//! [`LayerService`](crate::layer::LayerService), plus clustering. Whether a
//! cluster layer can be retargeted after creation depends on the provider;
//! the service checks [`MapProvider::reconfigurable_clusters`] before any
//! asynchronous work starts, so unsupported changes fail at the call site.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{OverlayError, Result};
use crate::layer::{LayerId, LayerRegistry, SharedLayer};
use crate::provider::{
    Cluster, ClusterLayerHandle, EntityOf, EventKind, EventSource, EventStream, LayerHandle,
    MapProvider,
};

use super::options::{ClusterOptions, ClusterPatch};

pub struct ClusterService<P: MapProvider> {
    provider: Arc<P>,
    registry: LayerRegistry<P::ClusterLayer>,
}

impl<P: MapProvider> ClusterService<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            registry: LayerRegistry::new(),
        }
    }

    /// Whether the active provider accepts clustering changes after creation.
    pub fn supports_reconfiguration(&self) -> bool {
        self.provider.reconfigurable_clusters()
    }

    /// Register a cluster layer. Idempotent per id.
    pub fn add_layer(&self, options: ClusterOptions) -> bool {
        let id = options.id;
        self.registry.register(id, || {
            let provider = Arc::clone(&self.provider);
            async move {
                let grid_size = options.grid_size;
                let layer = provider.create_cluster_layer(options).await?;
                info!(
                    layer_id = %id,
                    provider = provider.name(),
                    grid_size,
                    "Cluster layer materialised"
                );
                Ok(layer)
            }
        })
    }

    pub fn has_layer(&self, id: LayerId) -> bool {
        self.registry.contains(id)
    }

    pub fn layer_count(&self) -> usize {
        self.registry.len()
    }

    pub fn layer_future(&self, id: LayerId) -> Result<SharedLayer<P::ClusterLayer>> {
        self.registry.future(id)
    }

    pub fn get_native_layer(
        &self,
        id: LayerId,
    ) -> impl Future<Output = Result<P::ClusterLayer>> + Send {
        self.registry.resolve(id)
    }

    pub async fn set_entities(&self, id: LayerId, entities: Vec<EntityOf<P>>) -> Result<()> {
        let layer = self.get_native_layer(id).await?;
        debug!(layer_id = %id, count = entities.len(), "Replacing cluster layer entities");
        layer.set_entities(entities);
        Ok(())
    }

    pub async fn add_entities(&self, id: LayerId, entities: Vec<EntityOf<P>>) -> Result<()> {
        let layer = self.get_native_layer(id).await?;
        debug!(layer_id = %id, count = entities.len(), "Appending cluster layer entities");
        layer.add_entities(entities);
        Ok(())
    }

    /// Fail unless `patch` can be applied to a live cluster layer.
    pub fn check_reconfigurable(&self, patch: &ClusterPatch) -> Result<()> {
        match patch.topology_key() {
            Some(property) if !self.supports_reconfiguration() => {
                Err(OverlayError::ReconfigurationUnsupported {
                    property,
                    provider: self.provider.name().to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Apply a live clustering change.
    ///
    /// The capability check runs before the returned future is created.
    pub fn set_options(
        &self,
        id: LayerId,
        patch: ClusterPatch,
    ) -> Result<impl Future<Output = Result<()>> + Send> {
        self.check_reconfigurable(&patch)?;
        let layer = self.get_native_layer(id);
        Ok(async move {
            if patch.is_empty() {
                return Ok(());
            }
            let layer = layer.await?;
            debug!(layer_id = %id, ?patch, "Applying cluster options");
            if patch.topology_key().is_some() {
                layer.set_cluster_options(&patch);
            } else if let Some(visible) = patch.visible {
                layer.set_visible(visible);
            }
            Ok(())
        })
    }

    pub fn start_clustering(&self, id: LayerId) -> Result<impl Future<Output = Result<()>> + Send> {
        self.toggle_clustering(id, true)
    }

    pub fn stop_clustering(&self, id: LayerId) -> Result<impl Future<Output = Result<()>> + Send> {
        self.toggle_clustering(id, false)
    }

    fn toggle_clustering(
        &self,
        id: LayerId,
        enabled: bool,
    ) -> Result<impl Future<Output = Result<()>> + Send> {
        self.check_reconfigurable(&ClusterPatch {
            clustering_enabled: Some(enabled),
            ..ClusterPatch::default()
        })?;
        let layer = self.get_native_layer(id);
        Ok(async move {
            let layer = layer.await?;
            if enabled {
                layer.start_clustering();
            } else {
                layer.stop_clustering();
            }
            debug!(layer_id = %id, enabled, "Clustering toggled");
            Ok(())
        })
    }

    /// Current clusters of a layer at `zoom`.
    pub async fn get_clusters(&self, id: LayerId, zoom: f64) -> Result<Vec<Cluster<P::Marker>>> {
        let layer = self.get_native_layer(id).await?;
        Ok(layer.clusters(zoom))
    }

    pub async fn create_event_stream(&self, id: LayerId, kind: EventKind) -> Result<EventStream> {
        let layer = self.get_native_layer(id).await?;
        Ok(layer.event_stream(kind))
    }

    pub async fn delete_layer(&self, id: LayerId) -> Result<()> {
        let pending = self.registry.remove(id)?;
        let layer = pending.await?;
        layer.delete();
        info!(layer_id = %id, "Cluster layer deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterPlacementMode;
    use crate::coord::LatLong;
    use crate::entity::MarkerOptions;
    use crate::provider::memory::MemoryProvider;
    use crate::provider::LayerEntity;

    fn service(reconfigurable: bool) -> ClusterService<MemoryProvider> {
        let provider = MemoryProvider::loaded().with_reconfigurable_clusters(reconfigurable);
        ClusterService::new(Arc::new(provider))
    }

    fn grid_patch(size: f64) -> ClusterPatch {
        ClusterPatch {
            grid_size: Some(size),
            ..ClusterPatch::default()
        }
    }

    #[tokio::test]
    async fn test_grid_size_change_reaches_provider() {
        let clusters = service(true);
        clusters.add_layer(ClusterOptions::new(LayerId(1)));

        clusters
            .set_options(LayerId(1), grid_patch(40.0))
            .unwrap()
            .await
            .unwrap();

        let layer = clusters.get_native_layer(LayerId(1)).await.unwrap();
        assert_eq!(layer.cluster_options().grid_size, 40.0);
    }

    #[tokio::test]
    async fn test_unsupported_change_fails_before_awaiting() {
        let clusters = service(false);
        clusters.add_layer(ClusterOptions::new(LayerId(1)));

        let err = clusters
            .set_options(LayerId(1), grid_patch(40.0))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            OverlayError::ReconfigurationUnsupported {
                property: "gridSize",
                ..
            }
        ));
        assert!(clusters.stop_clustering(LayerId(1)).is_err());
    }

    #[tokio::test]
    async fn test_visibility_is_always_accepted() {
        let clusters = service(false);
        clusters.add_layer(ClusterOptions::new(LayerId(2)));

        let patch = ClusterPatch {
            visible: Some(false),
            ..ClusterPatch::default()
        };
        clusters.set_options(LayerId(2), patch).unwrap().await.unwrap();

        let layer = clusters.get_native_layer(LayerId(2)).await.unwrap();
        assert!(!layer.options().visible);
    }

    #[tokio::test]
    async fn test_stop_and_start_clustering() {
        let provider = Arc::new(MemoryProvider::loaded().with_reconfigurable_clusters(true));
        let clusters = ClusterService::new(Arc::clone(&provider));
        let mut options = ClusterOptions::new(LayerId(3));
        options.grid_size = 60.0;
        options.placement_mode = ClusterPlacementMode::FirstPin;
        clusters.add_layer(options);

        let markers = provider
            .create_markers(
                vec![
                    MarkerOptions::at(LatLong::new(47.6062, -122.3321)),
                    MarkerOptions::at(LatLong::new(47.6063, -122.3322)),
                ],
                None,
            )
            .await
            .unwrap();
        clusters
            .set_entities(LayerId(3), markers.into_iter().map(LayerEntity::Marker).collect())
            .await
            .unwrap();

        assert_eq!(clusters.get_clusters(LayerId(3), 10.0).await.unwrap().len(), 1);

        clusters.stop_clustering(LayerId(3)).unwrap().await.unwrap();
        assert!(clusters.get_clusters(LayerId(3), 10.0).await.unwrap().is_empty());

        clusters.start_clustering(LayerId(3)).unwrap().await.unwrap();
        let layer = clusters.get_native_layer(LayerId(3)).await.unwrap();
        assert!(layer.is_clustering());
    }
}
