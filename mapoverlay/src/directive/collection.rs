//! Layers fed from an options array.
//!
//! Marker and polygon layer directives share the same machinery: the options
//! array goes through an [`UpdateBuffer`], each update pass creates the
//! entities in one batch and hands them to the layer with a bulk replace or
//! an append, and the derived labels follow the same replace/append choice.
//! [`Collection`] captures what differs between entity kinds.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tracing::debug;

use crate::config::LabelConfig;
use crate::coord::LatLong;
use crate::entity::{IconInfo, MarkerOptions, PolygonOptions};
use crate::error::{OverlayError, Result};
use crate::map::MapService;
use crate::overlay::{CanvasOverlay, LabelEntry, LabelOptions};
use crate::provider::{
    EntityHandle, EntityOf, EventKind, EventSource, LayerEntity, ListenerHandle, MapEvent,
    MapProvider, MarkerHandle, PolygonHandle,
};
use crate::service::OverlayContext;

use super::events::{forward_events, EntityEvent, EventOutputs, MARKER_EVENTS, POLYGON_EVENTS};
use super::host::LayerRef;
use super::labels::{apply_label_changes, LabelChange};
use super::stream::{Update, UpdateBuffer};

/// An entity kind that can be fed to a layer as an options array.
pub trait Collection<P: MapProvider>: Send + Sync + 'static {
    type Options: Clone + fmt::Debug + Send + Sync + 'static;
    type Entity: EntityHandle;

    /// Entity events re-exposed as directive outputs
    const EVENTS: &'static [EventKind];
    const NAME: &'static str;

    /// Create a batch of entities, preserving input order.
    fn create<M: MapService>(
        ctx: &Arc<OverlayContext<P, M>>,
        options: Vec<Self::Options>,
        icon: Option<IconInfo>,
    ) -> BoxFuture<'static, Result<Vec<Self::Entity>>>;

    fn into_layer_entity(entity: Self::Entity) -> EntityOf<P>;

    /// Label for an entity, if it has a non-empty title.
    fn label(options: &Self::Options) -> Option<LabelEntry>;

    /// Location reported with the entity's events.
    fn location(entity: &Self::Entity) -> Option<LatLong>;
}

/// Markers, labelled at their position.
#[derive(Debug)]
pub struct Markers;

impl<P: MapProvider> Collection<P> for Markers {
    type Options = MarkerOptions;
    type Entity = P::Marker;

    const EVENTS: &'static [EventKind] = &MARKER_EVENTS;
    const NAME: &'static str = "marker";

    fn create<M: MapService>(
        ctx: &Arc<OverlayContext<P, M>>,
        options: Vec<MarkerOptions>,
        icon: Option<IconInfo>,
    ) -> BoxFuture<'static, Result<Vec<P::Marker>>> {
        let ctx = Arc::clone(ctx);
        async move { ctx.markers().create_markers(options, icon).await }.boxed()
    }

    fn into_layer_entity(entity: P::Marker) -> EntityOf<P> {
        LayerEntity::Marker(entity)
    }

    fn label(options: &MarkerOptions) -> Option<LabelEntry> {
        LabelEntry::for_entity(options.title.as_deref(), Some(options.position))
    }

    fn location(entity: &P::Marker) -> Option<LatLong> {
        Some(entity.location())
    }
}

/// Polygons, labelled at the centroid of their outer ring.
#[derive(Debug)]
pub struct Polygons;

impl<P: MapProvider> Collection<P> for Polygons {
    type Options = PolygonOptions;
    type Entity = P::Polygon;

    const EVENTS: &'static [EventKind] = &POLYGON_EVENTS;
    const NAME: &'static str = "polygon";

    fn create<M: MapService>(
        ctx: &Arc<OverlayContext<P, M>>,
        options: Vec<PolygonOptions>,
        _icon: Option<IconInfo>,
    ) -> BoxFuture<'static, Result<Vec<P::Polygon>>> {
        let ctx = Arc::clone(ctx);
        async move { ctx.polygons().create_polygons(options).await }.boxed()
    }

    fn into_layer_entity(entity: P::Polygon) -> EntityOf<P> {
        LayerEntity::Polygon(entity)
    }

    fn label(options: &PolygonOptions) -> Option<LabelEntry> {
        LabelEntry::for_entity(options.title.as_deref(), options.centroid())
    }

    fn location(entity: &P::Polygon) -> Option<LatLong> {
        entity.centroid()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Detached,
    Attaching,
    Attached,
    Disposed,
}

struct CollectionState<O, E> {
    phase: Phase,
    buffer: UpdateBuffer<O>,
    /// Created entities in options order
    entities: Vec<E>,
    forwarding: Vec<ListenerHandle>,
    layer_events: Option<Arc<dyn EventSource>>,
}

pub(crate) struct CollectionLayer<P: MapProvider, M: MapService, K: Collection<P>> {
    ctx: Arc<OverlayContext<P, M>>,
    layer: LayerRef,
    icon: Option<IconInfo>,
    overlay: Arc<CanvasOverlay<M>>,
    state: Arc<Mutex<CollectionState<K::Options, K::Entity>>>,
    outputs: Arc<EventOutputs<K::Entity>>,
}

impl<P: MapProvider, M: MapService, K: Collection<P>> CollectionLayer<P, M, K> {
    pub(crate) fn new(
        ctx: &Arc<OverlayContext<P, M>>,
        layer: LayerRef,
        labels: LabelConfig,
        tooltip_style: LabelOptions,
        streaming: bool,
        icon: Option<IconInfo>,
    ) -> Self {
        Self {
            overlay: CanvasOverlay::new(Arc::clone(ctx.map()), labels, tooltip_style),
            ctx: Arc::clone(ctx),
            layer,
            icon,
            state: Arc::new(Mutex::new(CollectionState {
                phase: Phase::Detached,
                buffer: UpdateBuffer::new(streaming),
                entities: Vec::new(),
                forwarding: Vec::new(),
                layer_events: None,
            })),
            outputs: Arc::new(EventOutputs::new(K::EVENTS)),
        }
    }

    pub(crate) fn ctx(&self) -> &Arc<OverlayContext<P, M>> {
        &self.ctx
    }

    pub(crate) fn layer(&self) -> LayerRef {
        self.layer
    }

    pub(crate) fn overlay(&self) -> &Arc<CanvasOverlay<M>> {
        &self.overlay
    }

    pub(crate) fn outputs(&self) -> &EventOutputs<K::Entity> {
        &self.outputs
    }

    pub(crate) fn entities(&self) -> Vec<K::Entity> {
        self.state.lock().entities.clone()
    }

    /// Options of every entity the layer holds once pending updates land.
    pub(crate) fn options(&self) -> Vec<K::Options> {
        self.state.lock().buffer.cumulative().to_vec()
    }

    pub(crate) fn is_streaming(&self) -> bool {
        self.state.lock().buffer.is_streaming()
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.state.lock().phase == Phase::Disposed
    }

    /// Wait for the native layer, wire its events, attach the label canvas
    /// and apply any options pushed so far.
    pub(crate) async fn attach(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            match state.phase {
                Phase::Disposed => return Err(OverlayError::DirectiveDisposed),
                Phase::Attaching | Phase::Attached => return Ok(()),
                Phase::Detached => state.phase = Phase::Attaching,
            }
        }

        let events = match self.layer.events(&self.ctx).await {
            Ok(events) => events,
            Err(e) => {
                let mut state = self.state.lock();
                if state.phase == Phase::Attaching {
                    state.phase = Phase::Detached;
                }
                return Err(e);
            }
        };
        let forwarding = forward_events(&*events, &self.outputs, self.resolver());
        {
            let mut state = self.state.lock();
            if state.phase == Phase::Disposed {
                return Ok(());
            }
            state.phase = Phase::Attached;
            state.forwarding = forwarding;
            state.layer_events = Some(Arc::clone(&events));
        }

        match self.overlay.attach().await {
            Err(OverlayError::OverlayDisposed) => return Ok(()),
            other => other?,
        }
        if self.overlay.label_config().show_tooltips() {
            self.overlay
                .manage_tooltip(true, &**self.ctx.map(), &*events)?;
        }
        debug!(layer_id = %self.layer.id, kind = K::NAME, "Layer directive attached");
        self.flush().await
    }

    fn resolver(&self) -> impl Fn(&MapEvent) -> Option<EntityEvent<K::Entity>> + Send + Sync + 'static {
        let state = Arc::downgrade(&self.state);
        move |event: &MapEvent| {
            let state = state.upgrade()?;
            let target = event.target.as_ref()?;
            let entity = state
                .lock()
                .entities
                .iter()
                .find(|e| e.entity_id() == target.entity_id)
                .cloned()?;
            Some(EntityEvent {
                location: event.location.or_else(|| K::location(&entity)),
                pixels: event.pixels,
                dom_event: event.clone(),
                entity,
            })
        }
    }

    pub(crate) fn set_streaming(&self, streaming: bool) {
        self.state.lock().buffer.set_streaming(streaming);
    }

    pub(crate) fn push(&self, options: Vec<K::Options>) {
        self.state.lock().buffer.push(options);
    }

    /// Apply the pending update, if any.
    ///
    /// If the directive is torn down while the entities are being created,
    /// the new entities are deleted as soon as they arrive.
    pub(crate) async fn flush(&self) -> Result<()> {
        let update = {
            let mut state = self.state.lock();
            if state.phase != Phase::Attached {
                return Ok(());
            }
            match state.buffer.take_update() {
                Some(update) => update,
                None => return Ok(()),
            }
        };

        let created = K::create(&self.ctx, update.items().to_vec(), self.icon.clone()).await?;
        let labels: Vec<LabelEntry> = update.items().iter().filter_map(K::label).collect();

        let disposed = {
            let mut state = self.state.lock();
            let disposed = state.phase == Phase::Disposed;
            if !disposed {
                match update {
                    Update::Replace(_) => state.entities = created.clone(),
                    Update::Append(_) => state.entities.extend(created.iter().cloned()),
                }
            }
            disposed
        };
        if disposed {
            self.discard(&created);
            return Ok(());
        }

        let count = created.len();
        let entities: Vec<EntityOf<P>> = created.iter().cloned().map(K::into_layer_entity).collect();
        let applied = match update {
            Update::Replace(_) => {
                self.overlay.set_labels(labels);
                self.layer.set_entities(&self.ctx, entities).await
            }
            Update::Append(_) => {
                self.overlay.append_labels(labels);
                self.layer.add_entities(&self.ctx, entities).await
            }
        };
        if let Err(e) = applied {
            if self.is_disposed() {
                self.discard(&created);
                return Ok(());
            }
            return Err(e);
        }

        debug!(
            layer_id = %self.layer.id,
            kind = K::NAME,
            count,
            replace = update.is_replace(),
            "Layer update applied"
        );
        self.redraw_labels().await
    }

    fn discard(&self, created: &[K::Entity]) {
        debug!(
            layer_id = %self.layer.id,
            count = created.len(),
            "Layer torn down during creation, deleting new entities"
        );
        for entity in created {
            entity.delete();
        }
    }

    /// Fold label changes into the overlay and apply a tooltip toggle.
    ///
    /// Before the layer is attached the new tooltip setting is only recorded;
    /// attaching applies it.
    pub(crate) fn apply_label_changes(&self, changes: &[LabelChange]) -> Result<()> {
        let (config, tooltips) = apply_label_changes(&self.overlay.label_config(), changes);
        self.overlay.set_label_config(config);
        let events = self.state.lock().layer_events.clone();
        if let (Some(show), Some(events)) = (tooltips, events) {
            self.overlay.manage_tooltip(show, &**self.ctx.map(), &*events)?;
        }
        Ok(())
    }

    pub(crate) async fn redraw_labels(&self) -> Result<()> {
        match self.overlay.draw_labels().await {
            Ok(_) | Err(OverlayError::OverlayDisposed) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub(crate) fn set_visible(&self, visible: bool) -> Result<BoxFuture<'static, Result<()>>> {
        self.layer.set_visible(&self.ctx, visible)
    }

    /// Release subscriptions, dispose the label canvas and delete the layer
    /// with everything in it. Idempotent.
    pub(crate) async fn delete(&self) -> Result<()> {
        let entities = {
            let mut state = self.state.lock();
            if state.phase == Phase::Disposed {
                return Ok(());
            }
            state.phase = Phase::Disposed;
            state.forwarding.clear();
            state.layer_events = None;
            std::mem::take(&mut state.entities)
        };
        self.overlay.delete();
        for entity in &entities {
            entity.delete();
        }
        self.layer.delete(&self.ctx).await
    }
}
