//! Polygon layer directive: a layer fed from a polygon options array, with
//! labels at polygon centroids and a tooltip.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::broadcast;
use tracing::info;

use crate::config::LabelConfig;
use crate::coord::Point;
use crate::entity::PolygonOptions;
use crate::error::{OverlayError, Result};
use crate::layer::{LayerKind, LayerOptions};
use crate::map::MapService;
use crate::overlay::{CanvasOverlay, LabelOptions};
use crate::provider::{EventKind, MapProvider};
use crate::service::OverlayContext;

use super::collection::{CollectionLayer, Polygons};
use super::events::EntityEvent;
use super::host::LayerRef;
use super::labels::LabelChange;

#[derive(Debug, Clone)]
pub struct PolygonLayerConfig {
    pub visible: bool,
    pub z_index: Option<i32>,
    pub layer_offset: Option<Point>,
    pub labels: LabelConfig,
    pub tooltip_style: LabelOptions,
    pub treat_polygon_options_as_stream: bool,
}

impl Default for PolygonLayerConfig {
    fn default() -> Self {
        Self {
            visible: true,
            z_index: None,
            layer_offset: None,
            labels: LabelConfig::default(),
            tooltip_style: LabelOptions::default(),
            treat_polygon_options_as_stream: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PolygonLayerChange {
    PolygonOptions(Vec<PolygonOptions>),
    TreatPolygonOptionsAsStream(bool),
    Visible(bool),
    ZIndex(i32),
    LayerOffset(Point),
    Label(LabelChange),
}

impl PolygonLayerChange {
    pub fn property(&self) -> &'static str {
        match self {
            Self::PolygonOptions(_) => "PolygonOptions",
            Self::TreatPolygonOptionsAsStream(_) => "TreatPolygonOptionsAsStream",
            Self::Visible(_) => "Visible",
            Self::ZIndex(_) => "ZIndex",
            Self::LayerOffset(_) => "LayerOffset",
            Self::Label(change) => change.property(),
        }
    }
}

pub struct PolygonLayerDirective<P: MapProvider, M: MapService> {
    core: CollectionLayer<P, M, Polygons>,
}

impl<P: MapProvider, M: MapService> PolygonLayerDirective<P, M> {
    pub fn new(ctx: &Arc<OverlayContext<P, M>>, config: PolygonLayerConfig) -> Arc<Self> {
        let id = ctx.next_layer_id(LayerKind::Polygon);
        ctx.layers().add_layer(LayerOptions {
            id,
            visible: config.visible,
            z_index: config.z_index,
            layer_offset: config.layer_offset,
        });
        info!(layer_id = %id, "Polygon layer registered");

        Arc::new(Self {
            core: CollectionLayer::new(
                ctx,
                LayerRef::plain(id),
                config.labels,
                config.tooltip_style,
                config.treat_polygon_options_as_stream,
                None,
            ),
        })
    }

    pub fn layer(&self) -> LayerRef {
        self.core.layer()
    }

    pub fn overlay(&self) -> &Arc<CanvasOverlay<M>> {
        self.core.overlay()
    }

    pub fn polygons(&self) -> Vec<P::Polygon> {
        self.core.entities()
    }

    pub fn polygon_options(&self) -> Vec<PolygonOptions> {
        self.core.options()
    }

    pub fn subscribe(&self, kind: EventKind) -> Option<broadcast::Receiver<EntityEvent<P::Polygon>>> {
        self.core.outputs().subscribe(kind)
    }

    pub async fn attach(&self) -> Result<()> {
        self.core.attach().await
    }

    pub fn on_changes(
        self: &Arc<Self>,
        changes: Vec<PolygonLayerChange>,
    ) -> Result<BoxFuture<'static, Result<()>>> {
        if self.core.is_disposed() {
            return Err(OverlayError::DirectiveDisposed);
        }

        let mut options = None;
        let mut streaming = None;
        let mut visible = None;
        let mut label_changes = Vec::new();
        for change in changes {
            match change {
                PolygonLayerChange::ZIndex(_) | PolygonLayerChange::LayerOffset(_) => {
                    return Err(OverlayError::InvalidReconfiguration {
                        property: change.property(),
                    });
                }
                PolygonLayerChange::PolygonOptions(v) => options = Some(v),
                PolygonLayerChange::TreatPolygonOptionsAsStream(v) => streaming = Some(v),
                PolygonLayerChange::Visible(v) => visible = Some(v),
                PolygonLayerChange::Label(l) => label_changes.push(l),
            }
        }

        let visibility = visible.map(|v| self.core.set_visible(v)).transpose()?;
        if !label_changes.is_empty() {
            self.core.apply_label_changes(&label_changes)?;
        }
        if let Some(streaming) = streaming {
            self.core.set_streaming(streaming);
        }
        if let Some(options) = options {
            self.core.push(options);
        }

        let this = Arc::clone(self);
        let relabel = !label_changes.is_empty();
        Ok(async move {
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

    pub async fn delete(&self) -> Result<()> {
        self.core.delete().await?;
        info!(layer_id = %self.core.layer().id, "Polygon layer deleted");
        Ok(())
    }
}

impl<P: MapProvider, M: MapService> fmt::Debug for PolygonLayerDirective<P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolygonLayerDirective")
            .field("layer", &self.core.layer())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{LatLong, Size};
    use crate::map::memory::MemoryMap;
    use crate::provider::memory::MemoryProvider;
    use crate::provider::{EntityHandle, EventTarget, MapEvent};

    fn context() -> Arc<OverlayContext<MemoryProvider, MemoryMap>> {
        let map = MemoryMap::new(LatLong::new(0.0, 0.0), 6.0, Size::new(400.0, 400.0));
        OverlayContext::new(Arc::new(MemoryProvider::loaded()), Arc::new(map))
    }

    fn square(center: LatLong, title: &str) -> PolygonOptions {
        let d = 0.5;
        PolygonOptions::from_ring(vec![
            LatLong::new(center.latitude - d, center.longitude - d),
            LatLong::new(center.latitude - d, center.longitude + d),
            LatLong::new(center.latitude + d, center.longitude + d),
            LatLong::new(center.latitude + d, center.longitude - d),
        ])
        .with_title(title)
    }

    fn labelled() -> PolygonLayerConfig {
        PolygonLayerConfig {
            labels: LabelConfig::new().with_show_labels(true),
            ..PolygonLayerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_labels_rebuilt_on_replace() {
        let ctx = context();
        let layer = PolygonLayerDirective::new(&ctx, labelled());
        layer.attach().await.unwrap();

        let first = vec![square(LatLong::new(0.0, 0.0), "A"), square(LatLong::new(1.0, 1.0), "B")];
        layer.on_changes(vec![PolygonLayerChange::PolygonOptions(first)]).unwrap().await.unwrap();
        assert_eq!(layer.overlay().labels().len(), 2);

        let second = vec![square(LatLong::new(0.0, 0.0), "C")];
        layer.on_changes(vec![PolygonLayerChange::PolygonOptions(second)]).unwrap().await.unwrap();
        let titles: Vec<String> = layer.overlay().labels().into_iter().map(|l| l.title).collect();
        assert_eq!(titles, ["C"]);
    }

    #[tokio::test]
    async fn test_labels_appended_when_streaming() {
        let ctx = context();
        let config = PolygonLayerConfig {
            treat_polygon_options_as_stream: true,
            ..labelled()
        };
        let layer = PolygonLayerDirective::new(&ctx, config);
        layer.attach().await.unwrap();

        let batch = vec![square(LatLong::new(0.0, 0.0), "A")];
        layer.on_changes(vec![PolygonLayerChange::PolygonOptions(batch.clone())]).unwrap().await.unwrap();
        layer.on_changes(vec![PolygonLayerChange::PolygonOptions(batch)]).unwrap().await.unwrap();
        assert_eq!(layer.overlay().labels().len(), 2);
        assert_eq!(layer.polygons().len(), 2);
    }

    #[tokio::test]
    async fn test_untitled_polygons_get_no_label() {
        let ctx = context();
        let layer = PolygonLayerDirective::new(&ctx, labelled());
        layer.attach().await.unwrap();

        let mut untitled = square(LatLong::new(0.0, 0.0), "");
        untitled.title = None;
        layer
            .on_changes(vec![PolygonLayerChange::PolygonOptions(vec![untitled])])
            .unwrap()
            .await
            .unwrap();
        assert!(layer.overlay().labels().is_empty());
        assert_eq!(layer.polygons().len(), 1);
    }

    #[tokio::test]
    async fn test_label_drawn_at_centroid() {
        let ctx = context();
        let layer = PolygonLayerDirective::new(&ctx, labelled());
        layer.attach().await.unwrap();
        layer
            .on_changes(vec![PolygonLayerChange::PolygonOptions(vec![square(LatLong::new(0.0, 0.0), "Zone")])])
            .unwrap()
            .await
            .unwrap();

        let texts = ctx.map().recordings()[0].filled_texts();
        assert_eq!(texts.len(), 1);
        let (text, x, y) = &texts[0];
        assert_eq!(text, "Zone");
        assert!((x - 200.0).abs() < 1e-6);
        assert!((y - 200.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_hover_shows_tooltip_and_click_is_forwarded() {
        let ctx = context();
        let layer = PolygonLayerDirective::new(&ctx, labelled());
        layer.attach().await.unwrap();
        layer
            .on_changes(vec![PolygonLayerChange::PolygonOptions(vec![square(LatLong::new(0.0, 0.0), "Zone")])])
            .unwrap()
            .await
            .unwrap();
        let polygon = layer.polygons().remove(0);
        let mut clicks = layer.subscribe(EventKind::Click).unwrap();

        polygon.fire(MapEvent::new(EventKind::MouseOver).with_pixels(Point::new(10.0, 10.0)));
        assert_eq!(layer.overlay().tooltip().state().text, "Zone");
        assert!(layer.overlay().tooltip().is_visible());

        polygon.fire(MapEvent::new(EventKind::Click));
        let event = clicks.recv().await.unwrap();
        assert_eq!(event.entity.entity_id(), polygon.entity_id());
        assert_eq!(event.location, Some(LatLong::new(0.0, 0.0)));
        assert!(event.dom_event.target.as_ref().is_some_and(|t: &EventTarget| t.entity_id == polygon.entity_id()));
    }

    #[tokio::test]
    async fn test_disabling_tooltips_releases_subscriptions() {
        let ctx = context();
        let layer = PolygonLayerDirective::new(&ctx, labelled());
        layer.attach().await.unwrap();
        assert_eq!(layer.overlay().subscription_count(), 3);

        layer
            .on_changes(vec![PolygonLayerChange::Label(LabelChange::ShowTooltips(false))])
            .unwrap()
            .await
            .unwrap();
        assert_eq!(layer.overlay().subscription_count(), 0);
    }
}
