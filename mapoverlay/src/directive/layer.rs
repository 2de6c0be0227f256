//! Generic layer directive hosting individually declared markers.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::info;

use crate::coord::Point;
use crate::error::{OverlayError, Result};
use crate::layer::{LayerKind, LayerOptions};
use crate::map::MapService;
use crate::provider::MapProvider;
use crate::service::OverlayContext;

use super::host::LayerRef;

#[derive(Debug, Clone, PartialEq)]
pub enum LayerChange {
    Visible(bool),
    ZIndex(i32),
    LayerOffset(Point),
}

impl LayerChange {
    pub fn property(&self) -> &'static str {
        match self {
            Self::Visible(_) => "Visible",
            Self::ZIndex(_) => "ZIndex",
            Self::LayerOffset(_) => "LayerOffset",
        }
    }
}

pub struct LayerDirective<P: MapProvider, M: MapService> {
    ctx: Arc<OverlayContext<P, M>>,
    layer: LayerRef,
    disposed: AtomicBool,
}

impl<P: MapProvider, M: MapService> LayerDirective<P, M> {
    /// `options` adjusts the defaults for the new layer id.
    pub fn new(
        ctx: &Arc<OverlayContext<P, M>>,
        options: impl FnOnce(LayerOptions) -> LayerOptions,
    ) -> Arc<Self> {
        let id = ctx.next_layer_id(LayerKind::Generic);
        ctx.layers().add_layer(options(LayerOptions::new(id)));
        info!(layer_id = %id, "Layer registered");
        Arc::new(Self {
            ctx: Arc::clone(ctx),
            layer: LayerRef::plain(id),
            disposed: AtomicBool::new(false),
        })
    }

    /// Where child markers attach.
    pub fn host(&self) -> LayerRef {
        self.layer
    }

    /// Resolve once the provider has materialised the layer.
    pub async fn attach(&self) -> Result<()> {
        self.ctx.layers().get_native_layer(self.layer.id).await?;
        Ok(())
    }

    pub fn on_changes(&self, changes: Vec<LayerChange>) -> Result<BoxFuture<'static, Result<()>>> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(OverlayError::DirectiveDisposed);
        }
        let mut visible = None;
        for change in &changes {
            match change {
                LayerChange::Visible(v) => visible = Some(*v),
                LayerChange::ZIndex(_) | LayerChange::LayerOffset(_) => {
                    return Err(OverlayError::InvalidReconfiguration {
                        property: change.property(),
                    });
                }
            }
        }
        match visible {
            Some(v) => self.layer.set_visible(&self.ctx, v),
            None => Ok(async { Ok(()) }.boxed()),
        }
    }

    pub async fn delete(&self) -> Result<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.layer.delete(&self.ctx).await?;
        info!(layer_id = %self.layer.id, "Layer deleted");
        Ok(())
    }
}

impl<P: MapProvider, M: MapService> fmt::Debug for LayerDirective<P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerDirective")
            .field("layer", &self.layer)
            .field("disposed", &self.disposed.load(Ordering::Relaxed))
            .finish()
    }
}
