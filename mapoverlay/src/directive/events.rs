//! Directive output events.
//!
//! Entity events are re-exposed to directive consumers on broadcast channels,
//! one per event kind, carrying the entity handle next to the raw map event.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::trace;

use crate::coord::{LatLong, Point};
use crate::provider::{EventKind, EventSource, ListenerHandle, MapEvent};

/// Default capacity of each output channel.
pub const OUTPUT_CHANNEL_CAPACITY: usize = 64;

/// Entity events a marker or marker layer re-exposes.
pub const MARKER_EVENTS: [EventKind; 9] = [
    EventKind::Click,
    EventKind::DblClick,
    EventKind::Drag,
    EventKind::DragStart,
    EventKind::DragEnd,
    EventKind::MouseDown,
    EventKind::MouseUp,
    EventKind::MouseOver,
    EventKind::MouseOut,
];

/// Entity events a polygon layer re-exposes.
pub const POLYGON_EVENTS: [EventKind; 6] = [
    EventKind::Click,
    EventKind::DblClick,
    EventKind::MouseDown,
    EventKind::MouseUp,
    EventKind::MouseOver,
    EventKind::MouseOut,
];

/// Payload of a directive output event.
#[derive(Debug, Clone)]
pub struct EntityEvent<E> {
    pub entity: E,
    pub dom_event: MapEvent,
    /// Location derived for the event, e.g. the marker position after a drag
    pub location: Option<LatLong>,
    pub pixels: Option<Point>,
}

/// Output channels of one directive.
pub struct EventOutputs<E> {
    channels: HashMap<EventKind, broadcast::Sender<EntityEvent<E>>>,
}

impl<E: Clone + Send + 'static> EventOutputs<E> {
    pub fn new(kinds: &[EventKind]) -> Self {
        let channels = kinds
            .iter()
            .map(|kind| (*kind, broadcast::channel(OUTPUT_CHANNEL_CAPACITY).0))
            .collect();
        Self { channels }
    }

    /// Receive events of `kind`. `None` if the directive does not expose it.
    pub fn subscribe(&self, kind: EventKind) -> Option<broadcast::Receiver<EntityEvent<E>>> {
        self.channels.get(&kind).map(|tx| tx.subscribe())
    }

    pub fn kinds(&self) -> impl Iterator<Item = EventKind> + '_ {
        self.channels.keys().copied()
    }

    /// Publish an event. Returns the number of receivers reached.
    pub fn emit(&self, event: EntityEvent<E>) -> usize {
        let kind = event.dom_event.kind;
        match self.channels.get(&kind) {
            // send fails only when nobody is subscribed
            Some(tx) => tx.send(event).unwrap_or(0),
            None => 0,
        }
    }
}

impl<E> fmt::Debug for EventOutputs<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventOutputs")
            .field("kinds", &self.channels.len())
            .finish()
    }
}

/// Forward every exposed event kind from `source` to `outputs`.
///
/// `resolve` maps a raw event to its payload; returning `None` drops the
/// event (e.g. when the target entity is not one the directive owns).
pub fn forward_events<E, S, F>(
    source: &S,
    outputs: &Arc<EventOutputs<E>>,
    resolve: F,
) -> Vec<ListenerHandle>
where
    E: Clone + Send + 'static,
    S: EventSource + ?Sized,
    F: Fn(&MapEvent) -> Option<EntityEvent<E>> + Send + Sync + 'static,
{
    let resolve = Arc::new(resolve);
    let kinds: Vec<EventKind> = outputs.kinds().collect();
    kinds
        .into_iter()
        .map(|kind| {
            let outputs = Arc::clone(outputs);
            let resolve = Arc::clone(&resolve);
            source.add_listener(
                kind,
                Arc::new(move |event: &MapEvent| {
                    if let Some(payload) = resolve(event) {
                        let reached = outputs.emit(payload);
                        trace!(kind = %event.kind, reached, "Forwarded entity event");
                    }
                }),
            )
        })
        .collect()
}
