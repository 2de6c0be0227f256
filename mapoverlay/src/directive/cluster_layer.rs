//! Cluster layer directive hosting individually declared markers.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::info;

use crate::cluster::{cluster_patch, ClusterChange};
use crate::config::ClusterConfig;
use crate::error::{OverlayError, Result};
use crate::layer::LayerKind;
use crate::map::MapService;
use crate::provider::{Cluster, MapProvider};
use crate::service::OverlayContext;

use super::host::LayerRef;

pub struct ClusterLayerDirective<P: MapProvider, M: MapService> {
    ctx: Arc<OverlayContext<P, M>>,
    layer: LayerRef,
    dynamic_markers: bool,
    disposed: AtomicBool,
}

impl<P: MapProvider, M: MapService> ClusterLayerDirective<P, M> {
    pub fn new(ctx: &Arc<OverlayContext<P, M>>, config: &ClusterConfig) -> Arc<Self> {
        let id = ctx.next_layer_id(LayerKind::Generic);
        ctx.clusters().add_layer(config.to_options(id));
        info!(
            layer_id = %id,
            grid_size = config.grid_size(),
            placement = %config.placement_mode(),
            "Cluster layer registered"
        );
        Arc::new(Self {
            ctx: Arc::clone(ctx),
            layer: LayerRef::clustered(id),
            dynamic_markers: config.use_dynamic_size_markers(),
            disposed: AtomicBool::new(false),
        })
    }

    pub fn host(&self) -> LayerRef {
        self.layer
    }

    pub async fn attach(&self) -> Result<()> {
        self.ctx.clusters().get_native_layer(self.layer.id).await?;
        Ok(())
    }

    fn check_live(&self) -> Result<()> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(OverlayError::DirectiveDisposed);
        }
        Ok(())
    }

    /// Apply a batch of cluster input changes.
    ///
    /// Topology inputs fail with `InvalidReconfiguration`; live inputs fail
    /// with `ReconfigurationUnsupported` when the provider cannot retarget
    /// an existing cluster layer.
    pub fn on_changes(&self, changes: Vec<ClusterChange>) -> Result<BoxFuture<'static, Result<()>>> {
        self.check_live()?;
        let patch = cluster_patch(&changes, self.dynamic_markers)?;
        Ok(self.ctx.clusters().set_options(self.layer.id, patch)?.boxed())
    }

    pub fn start_clustering(&self) -> Result<BoxFuture<'static, Result<()>>> {
        self.check_live()?;
        Ok(self.ctx.clusters().start_clustering(self.layer.id)?.boxed())
    }

    pub fn stop_clustering(&self) -> Result<BoxFuture<'static, Result<()>>> {
        self.check_live()?;
        Ok(self.ctx.clusters().stop_clustering(self.layer.id)?.boxed())
    }

    /// Current clusters at the map's zoom.
    pub async fn clusters(&self) -> Result<Vec<Cluster<P::Marker>>> {
        let zoom = self.ctx.map().zoom().await;
        self.ctx.clusters().get_clusters(self.layer.id, zoom).await
    }

    pub async fn delete(&self) -> Result<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.layer.delete(&self.ctx).await?;
        info!(layer_id = %self.layer.id, "Cluster layer deleted");
        Ok(())
    }
}

impl<P: MapProvider, M: MapService> fmt::Debug for ClusterLayerDirective<P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterLayerDirective")
            .field("layer", &self.layer)
            .field("dynamic_markers", &self.dynamic_markers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{ClusterClickAction, ClusterPlacementMode};
    use crate::coord::{LatLong, Size};
    use crate::map::memory::MemoryMap;
    use crate::provider::memory::MemoryProvider;
    use crate::provider::ClusterLayerHandle;

    fn context(reconfigurable: bool) -> Arc<OverlayContext<MemoryProvider, MemoryMap>> {
        let map = MemoryMap::new(LatLong::new(0.0, 0.0), 3.0, Size::new(256.0, 256.0));
        let provider = MemoryProvider::loaded().with_reconfigurable_clusters(reconfigurable);
        OverlayContext::new(Arc::new(provider), Arc::new(map))
    }

    #[tokio::test]
    async fn test_click_action_change_fails() {
        let ctx = context(true);
        let directive = ClusterLayerDirective::new(&ctx, &ClusterConfig::new());
        let err = directive
            .on_changes(vec![ClusterChange::ClickAction(ClusterClickAction::None)])
            .err()
            .unwrap();
        assert_eq!(
            err,
            OverlayError::InvalidReconfiguration {
                property: "ClusterClickAction"
            }
        );
    }

    #[tokio::test]
    async fn test_live_changes_reach_provider() {
        let ctx = context(true);
        let directive = ClusterLayerDirective::new(&ctx, &ClusterConfig::new());
        directive
            .on_changes(vec![
                ClusterChange::GridSize(64.0),
                ClusterChange::PlacementMode(ClusterPlacementMode::FirstPin),
            ])
            .unwrap()
            .await
            .unwrap();

        let layer = ctx.clusters().get_native_layer(directive.host().id).await.unwrap();
        let options = layer.cluster_options();
        assert_eq!(options.grid_size, 64.0);
        assert_eq!(options.placement_mode, ClusterPlacementMode::FirstPin);
    }

    #[tokio::test]
    async fn test_stop_and_start_clustering() {
        let ctx = context(true);
        let directive = ClusterLayerDirective::new(&ctx, &ClusterConfig::new());
        directive.stop_clustering().unwrap().await.unwrap();
        let layer = ctx.clusters().get_native_layer(directive.host().id).await.unwrap();
        assert!(!layer.is_clustering());

        directive.start_clustering().unwrap().await.unwrap();
        assert!(layer.is_clustering());
    }

    #[tokio::test]
    async fn test_toggling_fails_without_capability() {
        let ctx = context(false);
        let directive = ClusterLayerDirective::new(&ctx, &ClusterConfig::new());
        assert!(matches!(
            directive.stop_clustering(),
            Err(OverlayError::ReconfigurationUnsupported { .. })
        ));
        directive
            .on_changes(vec![ClusterChange::Visible(false)])
            .unwrap()
            .await
            .unwrap();
    }
}
