//! Marker layer directive: a layer fed from a marker options array, with
//! optional clustering, labels and a tooltip.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::broadcast;
use tracing::info;

use crate::cluster::{cluster_patch, ClusterChange};
use crate::config::{ClusterConfig, LabelConfig};
use crate::coord::Point;
use crate::entity::{IconInfo, MarkerOptions};
use crate::error::{OverlayError, Result};
use crate::layer::LayerKind;
use crate::map::MapService;
use crate::overlay::{CanvasOverlay, LabelOptions};
use crate::provider::{Cluster, EventKind, MapProvider};
use crate::service::OverlayContext;

use super::collection::{CollectionLayer, Markers};
use super::events::EntityEvent;
use super::host::LayerRef;
use super::labels::LabelChange;

/// Inputs fixed when the layer is created.
#[derive(Debug, Clone, Default)]
pub struct MarkerLayerConfig {
    pub enable_clustering: bool,
    /// Clustering parameters plus the layer's visibility, z-index, offset and
    /// icon info
    pub cluster: ClusterConfig,
    pub labels: LabelConfig,
    pub tooltip_style: LabelOptions,
    pub treat_marker_options_as_stream: bool,
}

/// One changed input of a marker layer.
#[derive(Debug, Clone)]
pub enum MarkerLayerChange {
    MarkerOptions(Vec<MarkerOptions>),
    TreatMarkerOptionsAsStream(bool),
    Visible(bool),
    ZIndex(i32),
    LayerOffset(Point),
    IconInfo(IconInfo),
    EnableClustering(bool),
    Cluster(ClusterChange),
    Label(LabelChange),
}

impl MarkerLayerChange {
    pub fn property(&self) -> &'static str {
        match self {
            Self::MarkerOptions(_) => "MarkerOptions",
            Self::TreatMarkerOptionsAsStream(_) => "TreatMarkerOptionsAsStream",
            Self::Visible(_) => "Visible",
            Self::ZIndex(_) => "ZIndex",
            Self::LayerOffset(_) => "LayerOffset",
            Self::IconInfo(_) => "IconInfo",
            Self::EnableClustering(_) => "EnableClustering",
            Self::Cluster(change) => change.property(),
            Self::Label(change) => change.property(),
        }
    }
}

pub struct MarkerLayerDirective<P: MapProvider, M: MapService> {
    core: CollectionLayer<P, M, Markers>,
    dynamic_markers: bool,
}

impl<P: MapProvider, M: MapService> MarkerLayerDirective<P, M> {
    /// Register the layer. The provider-side layer is created once the
    /// directive is attached.
    pub fn new(ctx: &Arc<OverlayContext<P, M>>, config: MarkerLayerConfig) -> Arc<Self> {
        let id = ctx.next_layer_id(LayerKind::Marker);
        let options = config.cluster.to_options(id);
        let layer = if config.enable_clustering {
            ctx.clusters().add_layer(options);
            LayerRef::clustered(id)
        } else {
            ctx.layers().add_layer(options.layer_options());
            LayerRef::plain(id)
        };
        info!(layer_id = %id, clustered = layer.clustered, "Marker layer registered");

        Arc::new(Self {
            core: CollectionLayer::new(
                ctx,
                layer,
                config.labels,
                config.tooltip_style,
                config.treat_marker_options_as_stream,
                config.cluster.icon_info().cloned(),
            ),
            dynamic_markers: config.cluster.use_dynamic_size_markers(),
        })
    }

    pub fn layer(&self) -> LayerRef {
        self.core.layer()
    }

    pub fn is_clustered(&self) -> bool {
        self.core.layer().clustered
    }

    pub fn overlay(&self) -> &Arc<CanvasOverlay<M>> {
        self.core.overlay()
    }

    /// Created markers, in options order.
    pub fn markers(&self) -> Vec<P::Marker> {
        self.core.entities()
    }

    /// The cumulative marker options array.
    pub fn marker_options(&self) -> Vec<MarkerOptions> {
        self.core.options()
    }

    pub fn is_streaming(&self) -> bool {
        self.core.is_streaming()
    }

    /// Marker events (`click`, `dragend`, `mouseover`, ...) of any marker in
    /// the layer.
    pub fn subscribe(&self, kind: EventKind) -> Option<broadcast::Receiver<EntityEvent<P::Marker>>> {
        self.core.outputs().subscribe(kind)
    }

    pub async fn attach(&self) -> Result<()> {
        self.core.attach().await
    }

    /// Apply a batch of input changes.
    ///
    /// Structural errors are returned before anything is applied. The returned
    /// future performs the provider-side work.
    pub fn on_changes(
        self: &Arc<Self>,
        changes: Vec<MarkerLayerChange>,
    ) -> Result<BoxFuture<'static, Result<()>>> {
        if self.core.is_disposed() {
            return Err(OverlayError::DirectiveDisposed);
        }

        let mut options = None;
        let mut streaming = None;
        let mut visible = None;
        let mut cluster_changes = Vec::new();
        let mut label_changes = Vec::new();
        for change in changes {
            match change {
                MarkerLayerChange::ZIndex(_)
                | MarkerLayerChange::LayerOffset(_)
                | MarkerLayerChange::IconInfo(_)
                | MarkerLayerChange::EnableClustering(_) => {
                    return Err(OverlayError::InvalidReconfiguration {
                        property: change.property(),
                    });
                }
                MarkerLayerChange::MarkerOptions(v) => options = Some(v),
                MarkerLayerChange::TreatMarkerOptionsAsStream(v) => streaming = Some(v),
                MarkerLayerChange::Visible(v) => visible = Some(v),
                MarkerLayerChange::Cluster(c) => cluster_changes.push(c),
                MarkerLayerChange::Label(l) => label_changes.push(l),
            }
        }

        let reclustering = match cluster_changes.first() {
            None => None,
            Some(first) if !self.is_clustered() => {
                return Err(OverlayError::InvalidReconfiguration {
                    property: first.property(),
                });
            }
            Some(_) => {
                let patch = cluster_patch(&cluster_changes, self.dynamic_markers)?;
                let id = self.core.layer().id;
                Some(self.core.ctx().clusters().set_options(id, patch)?.boxed())
            }
        };
        let visibility = visible.map(|v| self.core.set_visible(v)).transpose()?;
        if !label_changes.is_empty() {
            self.core.apply_label_changes(&label_changes)?;
        }
        // the mode applies to options arriving in the same batch
        if let Some(streaming) = streaming {
            self.core.set_streaming(streaming);
        }
        if let Some(options) = options {
            self.core.push(options);
        }

        let this = Arc::clone(self);
        let relabel = !label_changes.is_empty();
        Ok(async move {
            if let Some(reclustering) = reclustering {
                reclustering.await?;
            }
            if let Some(visibility) = visibility {
                visibility.await?;
            }
            this.core.flush().await?;
            if relabel {
                this.core.redraw_labels().await?;
            }
            Ok(())
        }
        .boxed())
    }

    /// Current clusters at the map's zoom. Empty for unclustered layers.
    pub async fn clusters(&self) -> Result<Vec<Cluster<P::Marker>>> {
        if !self.is_clustered() {
            return Ok(Vec::new());
        }
        let zoom = self.core.ctx().map().zoom().await;
        self.core
            .ctx()
            .clusters()
            .get_clusters(self.core.layer().id, zoom)
            .await
    }

    pub async fn delete(&self) -> Result<()> {
        self.core.delete().await?;
        info!(layer_id = %self.core.layer().id, "Marker layer deleted");
        Ok(())
    }
}

impl<P: MapProvider, M: MapService> fmt::Debug for MarkerLayerDirective<P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerLayerDirective")
            .field("layer", &self.core.layer())
            .field("dynamic_markers", &self.dynamic_markers)
            .finish()
    }
}
