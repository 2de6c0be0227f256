//! Single marker directive.
//!
//! Creates one marker on a host layer and keeps it in sync with its inputs
//! through sparse patches: only the inputs that changed are sent to the
//! provider.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

use crate::coord::{LatLong, Point};
use crate::entity::{IconInfo, MarkerOptions, MarkerPatch, Metadata};
use crate::error::{OverlayError, Result};
use crate::map::MapService;
use crate::provider::{
    EntityHandle, EventKind, LayerEntity, ListenerHandle, MapEvent, MapProvider, MarkerHandle,
};
use crate::service::OverlayContext;

use super::events::{forward_events, EntityEvent, EventOutputs, MARKER_EVENTS};
use super::host::LayerRef;

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerChange {
    Position(LatLong),
    Title(String),
    Label(String),
    Icon(String),
    Anchor(Point),
    Width(f64),
    Height(f64),
    Draggable(bool),
    Visible(bool),
    ZIndex(i32),
    Metadata(Metadata),
    IconInfo(IconInfo),
}

impl MarkerChange {
    pub fn property(&self) -> &'static str {
        match self {
            Self::Position(_) => "Position",
            Self::Title(_) => "Title",
            Self::Label(_) => "Label",
            Self::Icon(_) => "IconUrl",
            Self::Anchor(_) => "Anchor",
            Self::Width(_) => "Width",
            Self::Height(_) => "Height",
            Self::Draggable(_) => "Draggable",
            Self::Visible(_) => "Visible",
            Self::ZIndex(_) => "ZIndex",
            Self::Metadata(_) => "Metadata",
            Self::IconInfo(_) => "IconInfo",
        }
    }
}

/// Sparse patch for a batch of marker changes; the last value of an input
/// wins.
pub fn marker_patch(changes: &[MarkerChange]) -> Result<MarkerPatch> {
    let mut patch = MarkerPatch::default();
    for change in changes {
        match change {
            MarkerChange::Position(v) => patch.position = Some(*v),
            MarkerChange::Title(v) => patch.title = Some(v.clone()),
            MarkerChange::Label(v) => patch.label = Some(v.clone()),
            MarkerChange::Icon(v) => patch.icon = Some(v.clone()),
            MarkerChange::Anchor(v) => patch.anchor = Some(*v),
            MarkerChange::Width(v) => patch.width = Some(*v),
            MarkerChange::Height(v) => patch.height = Some(*v),
            MarkerChange::Draggable(v) => patch.draggable = Some(*v),
            MarkerChange::Visible(v) => patch.visible = Some(*v),
            MarkerChange::ZIndex(v) => patch.z_index = Some(*v),
            MarkerChange::Metadata(v) => patch.metadata = Some(v.clone()),
            MarkerChange::IconInfo(_) => {
                return Err(OverlayError::InvalidReconfiguration {
                    property: change.property(),
                })
            }
        }
    }
    Ok(patch)
}

/// Keys of `after` that differ from `before`.
fn diff(before: &MarkerOptions, after: &MarkerOptions) -> MarkerPatch {
    fn changed<T: PartialEq + Clone>(before: &T, after: &T) -> Option<T> {
        (before != after).then(|| after.clone())
    }
    MarkerPatch {
        position: changed(&before.position, &after.position),
        title: changed(&before.title, &after.title).flatten(),
        label: changed(&before.label, &after.label).flatten(),
        icon: changed(&before.icon, &after.icon).flatten(),
        anchor: changed(&before.anchor, &after.anchor).flatten(),
        width: changed(&before.width, &after.width).flatten(),
        height: changed(&before.height, &after.height).flatten(),
        draggable: changed(&before.draggable, &after.draggable),
        visible: changed(&before.visible, &after.visible),
        z_index: changed(&before.z_index, &after.z_index).flatten(),
        metadata: changed(&before.metadata, &after.metadata),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Detached,
    Creating,
    Created,
    Disposed,
}

struct MarkerState<K> {
    phase: Phase,
    options: MarkerOptions,
    marker: Option<K>,
    forwarding: Vec<ListenerHandle>,
}

pub struct MarkerDirective<P: MapProvider, M: MapService> {
    ctx: Arc<OverlayContext<P, M>>,
    host: LayerRef,
    icon: Option<IconInfo>,
    state: Mutex<MarkerState<P::Marker>>,
    outputs: Arc<EventOutputs<P::Marker>>,
}

impl<P: MapProvider, M: MapService> MarkerDirective<P, M> {
    pub fn new(
        ctx: &Arc<OverlayContext<P, M>>,
        host: LayerRef,
        options: MarkerOptions,
        icon: Option<IconInfo>,
    ) -> Arc<Self> {
        Arc::new(Self {
            ctx: Arc::clone(ctx),
            host,
            icon,
            state: Mutex::new(MarkerState {
                phase: Phase::Detached,
                options,
                marker: None,
                forwarding: Vec::new(),
            }),
            outputs: Arc::new(EventOutputs::new(&MARKER_EVENTS)),
        })
    }

    pub fn host(&self) -> LayerRef {
        self.host
    }

    /// The created marker, once creation has resolved.
    pub fn marker(&self) -> Option<P::Marker> {
        self.state.lock().marker.clone()
    }

    /// Whether `attach` is waiting for the provider to create the marker.
    pub fn is_creating(&self) -> bool {
        self.state.lock().phase == Phase::Creating
    }

    /// The marker's current inputs.
    pub fn options(&self) -> MarkerOptions {
        self.state.lock().options.clone()
    }

    pub fn subscribe(
        &self,
        kind: EventKind,
    ) -> Option<broadcast::Receiver<EntityEvent<P::Marker>>> {
        self.outputs.subscribe(kind)
    }

    /// Create the marker and add it to the host layer.
    ///
    /// Inputs changed while the marker was being created are sent as one
    /// patch when it arrives. If the directive is deleted in the meantime,
    /// the new marker is deleted instead.
    pub async fn attach(&self) -> Result<()> {
        let requested = {
            let mut state = self.state.lock();
            match state.phase {
                Phase::Disposed => return Err(OverlayError::DirectiveDisposed),
                Phase::Creating | Phase::Created => return Ok(()),
                Phase::Detached => state.phase = Phase::Creating,
            }
            state.options.clone()
        };

        let marker = match self
            .ctx
            .markers()
            .create_marker(requested.clone(), self.icon.clone())
            .await
        {
            Ok(marker) => marker,
            Err(e) => {
                let mut state = self.state.lock();
                if state.phase == Phase::Creating {
                    state.phase = Phase::Detached;
                }
                return Err(e);
            }
        };

        let catch_up = {
            let mut state = self.state.lock();
            if state.phase == Phase::Disposed {
                None
            } else {
                state.phase = Phase::Created;
                state.marker = Some(marker.clone());
                state.forwarding = forward_events(&marker, &self.outputs, resolver(marker.clone()));
                Some(diff(&requested, &state.options))
            }
        };
        let Some(catch_up) = catch_up else {
            debug!(entity = %marker.entity_id(), "Marker directive deleted during creation");
            marker.delete();
            return Ok(());
        };

        self.ctx.markers().set_options(&marker, &catch_up);
        self.host
            .add_entities(&self.ctx, vec![LayerEntity::Marker(marker)])
            .await
    }

    /// Apply a batch of input changes. Changes made before the marker exists
    /// are recorded and sent once it is created.
    pub fn on_changes(&self, changes: &[MarkerChange]) -> Result<()> {
        let patch = marker_patch(changes)?;
        let marker = {
            let mut state = self.state.lock();
            if state.phase == Phase::Disposed {
                return Err(OverlayError::DirectiveDisposed);
            }
            state.options.apply(&patch);
            state.marker.clone()
        };
        if let Some(marker) = marker {
            self.ctx.markers().set_options(&marker, &patch);
        }
        Ok(())
    }

    /// Unsubscribe and delete the marker. Idempotent.
    pub fn delete(&self) {
        let marker = {
            let mut state = self.state.lock();
            if state.phase == Phase::Disposed {
                return;
            }
            state.phase = Phase::Disposed;
            state.forwarding.clear();
            state.marker.take()
        };
        if let Some(marker) = marker {
            self.ctx.markers().delete(&marker);
        }
    }
}

fn resolver<K: MarkerHandle>(
    marker: K,
) -> impl Fn(&MapEvent) -> Option<EntityEvent<K>> + Send + Sync + 'static {
    move |event: &MapEvent| {
        Some(EntityEvent {
            entity: marker.clone(),
            dom_event: event.clone(),
            location: event.location.or_else(|| Some(marker.location())),
            pixels: event.pixels,
        })
    }
}

impl<P: MapProvider, M: MapService> fmt::Debug for MarkerDirective<P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MarkerDirective")
            .field("host", &self.host)
            .field("phase", &state.phase)
            .field("position", &state.options.position)
            .finish()
    }
}
