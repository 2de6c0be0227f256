//! Routing of layer operations to the service that owns the layer.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::cluster::ClusterPatch;
use crate::error::Result;
use crate::layer::{LayerId, LayerPatch};
use crate::map::MapService;
use crate::provider::{EntityOf, EventSource, MapProvider};
use crate::service::OverlayContext;

/// A directive's provider-side layer: its id and whether the
/// [`ClusterService`](crate::cluster::ClusterService) or the plain
/// [`LayerService`](crate::layer::LayerService) owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerRef {
    pub id: LayerId,
    pub clustered: bool,
}

impl LayerRef {
    pub fn plain(id: LayerId) -> Self {
        Self { id, clustered: false }
    }

    pub fn clustered(id: LayerId) -> Self {
        Self { id, clustered: true }
    }

    pub(crate) fn set_entities<P: MapProvider, M: MapService>(
        self,
        ctx: &Arc<OverlayContext<P, M>>,
        entities: Vec<EntityOf<P>>,
    ) -> BoxFuture<'static, Result<()>> {
        let ctx = Arc::clone(ctx);
        async move {
            if self.clustered {
                ctx.clusters().set_entities(self.id, entities).await
            } else {
                ctx.layers().set_entities(self.id, entities).await
            }
        }
        .boxed()
    }

    pub(crate) fn add_entities<P: MapProvider, M: MapService>(
        self,
        ctx: &Arc<OverlayContext<P, M>>,
        entities: Vec<EntityOf<P>>,
    ) -> BoxFuture<'static, Result<()>> {
        let ctx = Arc::clone(ctx);
        async move {
            if self.clustered {
                ctx.clusters().add_entities(self.id, entities).await
            } else {
                ctx.layers().add_entities(self.id, entities).await
            }
        }
        .boxed()
    }

    /// Show or hide the layer. Accepted by every provider.
    pub(crate) fn set_visible<P: MapProvider, M: MapService>(
        self,
        ctx: &Arc<OverlayContext<P, M>>,
        visible: bool,
    ) -> Result<BoxFuture<'static, Result<()>>> {
        if self.clustered {
            let patch = ClusterPatch {
                visible: Some(visible),
                ..ClusterPatch::default()
            };
            return Ok(ctx.clusters().set_options(self.id, patch)?.boxed());
        }
        let ctx = Arc::clone(ctx);
        Ok(async move {
            let patch = LayerPatch {
                visible: Some(visible),
                ..LayerPatch::default()
            };
            ctx.layers().set_options(self.id, patch).await
        }
        .boxed())
    }

    /// The native layer as an event source, once it exists.
    pub(crate) fn events<P: MapProvider, M: MapService>(
        self,
        ctx: &Arc<OverlayContext<P, M>>,
    ) -> BoxFuture<'static, Result<Arc<dyn EventSource>>> {
        if self.clustered {
            let layer = ctx.clusters().get_native_layer(self.id);
            async move { Ok(Arc::new(layer.await?) as Arc<dyn EventSource>) }.boxed()
        } else {
            let layer = ctx.layers().get_native_layer(self.id);
            async move { Ok(Arc::new(layer.await?) as Arc<dyn EventSource>) }.boxed()
        }
    }

    pub(crate) fn delete<P: MapProvider, M: MapService>(
        self,
        ctx: &Arc<OverlayContext<P, M>>,
    ) -> BoxFuture<'static, Result<()>> {
        let ctx = Arc::clone(ctx);
        async move {
            if self.clustered {
                ctx.clusters().delete_layer(self.id).await
            } else {
                ctx.layers().delete_layer(self.id).await
            }
        }
        .boxed()
    }
}
