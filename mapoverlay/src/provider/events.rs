//! DOM-style event plumbing shared by entities, layers and maps.
//!
//! Providers fire events through a [`ListenerRegistry`]. Subscribers get a
//! [`ListenerHandle`] back; dropping the handle removes the listener, so
//! subscription lifetimes are tied to ownership rather than to explicit
//! bookkeeping.

use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures::channel::mpsc;
use futures::{Stream, StreamExt};
use parking_lot::Mutex;

use crate::coord::{LatLong, Point};

use super::types::EntityId;

/// Kinds of events an entity, layer or map can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    DblClick,
    Drag,
    DragStart,
    DragEnd,
    MouseDown,
    MouseMove,
    MouseOut,
    MouseOver,
    MouseUp,
    RightClick,
    /// Map view changed (pan or zoom)
    ViewChange,
}

impl EventKind {
    /// Event name as used by the map SDKs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::DblClick => "dblclick",
            Self::Drag => "drag",
            Self::DragStart => "dragstart",
            Self::DragEnd => "dragend",
            Self::MouseDown => "mousedown",
            Self::MouseMove => "mousemove",
            Self::MouseOut => "mouseout",
            Self::MouseOver => "mouseover",
            Self::MouseUp => "mouseup",
            Self::RightClick => "rightclick",
            Self::ViewChange => "viewchange",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The entity an event was fired on.
#[derive(Debug, Clone, PartialEq)]
pub struct EventTarget {
    pub entity_id: EntityId,
    pub title: Option<String>,
    pub location: Option<LatLong>,
}

impl EventTarget {
    /// Title of the target, if it is set and non-empty.
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }
}

/// A fired event.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEvent {
    pub kind: EventKind,
    /// Geographic location of the pointer, when the provider knows it
    pub location: Option<LatLong>,
    /// Pixel position of the pointer relative to the map viewport
    pub pixels: Option<Point>,
    /// Entity under the pointer; `None` for map-level events
    pub target: Option<EventTarget>,
}

impl MapEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            location: None,
            pixels: None,
            target: None,
        }
    }

    pub fn with_location(mut self, location: LatLong) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_pixels(mut self, pixels: Point) -> Self {
        self.pixels = Some(pixels);
        self
    }

    pub fn with_target(mut self, target: EventTarget) -> Self {
        self.target = Some(target);
        self
    }
}

/// Callback invoked for every matching event.
pub type Listener = Arc<dyn Fn(&MapEvent) + Send + Sync>;

/// Anything listeners can be attached to.
pub trait EventSource: Send + Sync {
    /// Attach a listener for `kind`. The listener stays attached until the
    /// returned handle is dropped.
    fn add_listener(&self, kind: EventKind, listener: Listener) -> ListenerHandle;

    /// Stream of events of one kind.
    fn event_stream(&self, kind: EventKind) -> EventStream {
        let (tx, rx) = mpsc::unbounded();
        let handle = self.add_listener(
            kind,
            Arc::new(move |event: &MapEvent| {
                let _ = tx.unbounded_send(event.clone());
            }),
        );
        EventStream {
            rx,
            _handle: handle,
        }
    }
}

struct Registration {
    id: u64,
    kind: EventKind,
    listener: Listener,
}

#[derive(Default)]
struct RegistryInner {
    next_id: AtomicU64,
    listeners: Mutex<Vec<Registration>>,
}

/// Listener bookkeeping for one event source.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<RegistryInner>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener and return the handle owning the registration.
    pub fn add(&self, kind: EventKind, listener: Listener) -> ListenerHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push(Registration { id, kind, listener });
        ListenerHandle {
            registry: Arc::downgrade(&self.inner),
            id,
            kind,
        }
    }

    /// Dispatch an event to every listener registered for its kind.
    ///
    /// Listeners are called outside the registry lock, so a listener may add
    /// or remove listeners. Returns the number of listeners called.
    pub fn emit(&self, event: &MapEvent) -> usize {
        let matching: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .filter(|r| r.kind == event.kind)
            .map(|r| Arc::clone(&r.listener))
            .collect();

        for listener in &matching {
            listener(event);
        }
        matching.len()
    }

    /// Number of registered listeners across all kinds.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    /// Number of registered listeners for one kind.
    pub fn listener_count_for(&self, kind: EventKind) -> usize {
        self.inner
            .listeners
            .lock()
            .iter()
            .filter(|r| r.kind == kind)
            .count()
    }

    /// Remove every listener. Outstanding handles become inert.
    pub fn clear(&self) {
        self.inner.listeners.lock().clear();
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Owns one listener registration; dropping it unsubscribes.
pub struct ListenerHandle {
    registry: Weak<RegistryInner>,
    id: u64,
    kind: EventKind,
}

impl ListenerHandle {
    /// Event kind this handle is subscribed to.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .map(|inner| inner.listeners.lock().iter().any(|r| r.id == self.id))
            .unwrap_or(false)
    }

    /// Explicitly unsubscribe. Equivalent to dropping the handle.
    pub fn remove(self) {}
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            inner.listeners.lock().retain(|r| r.id != self.id);
        }
    }
}

impl fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Stream of events produced by [`EventSource::event_stream`].
///
/// Dropping the stream removes the underlying listener.
pub struct EventStream {
    rx: mpsc::UnboundedReceiver<MapEvent>,
    _handle: ListenerHandle,
}

impl Stream for EventStream {
    type Item = MapEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_next_unpin(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct Source(ListenerRegistry);

    impl EventSource for Source {
        fn add_listener(&self, kind: EventKind, listener: Listener) -> ListenerHandle {
            self.0.add(kind, listener)
        }
    }

    fn counter_listener(counter: &Arc<AtomicUsize>) -> Listener {
        let counter = Arc::clone(counter);
        Arc::new(move |_: &MapEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_emit_only_reaches_matching_kind() {
        let registry = ListenerRegistry::new();
        let clicks = Arc::new(AtomicUsize::new(0));
        let _h = registry.add(EventKind::Click, counter_listener(&clicks));

        assert_eq!(registry.emit(&MapEvent::new(EventKind::MouseOver)), 0);
        assert_eq!(registry.emit(&MapEvent::new(EventKind::Click)), 1);
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropping_handle_unsubscribes() {
        let registry = ListenerRegistry::new();
        let clicks = Arc::new(AtomicUsize::new(0));
        let handle = registry.add(EventKind::Click, counter_listener(&clicks));
        assert!(handle.is_active());
        assert_eq!(registry.listener_count(), 1);

        handle.remove();
        assert_eq!(registry.listener_count(), 0);
        registry.emit(&MapEvent::new(EventKind::Click));
        assert_eq!(clicks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_clear_makes_handles_inert() {
        let registry = ListenerRegistry::new();
        let clicks = Arc::new(AtomicUsize::new(0));
        let handle = registry.add(EventKind::Click, counter_listener(&clicks));
        registry.clear();
        assert!(!handle.is_active());
        drop(handle);
        assert_eq!(registry.listener_count(), 0);
    }

    #[test]
    fn test_listener_may_unsubscribe_during_emit() {
        let registry = ListenerRegistry::new();
        let slot: Arc<Mutex<Option<ListenerHandle>>> = Arc::new(Mutex::new(None));
        let slot_in_listener = Arc::clone(&slot);
        let handle = registry.add(
            EventKind::Click,
            Arc::new(move |_: &MapEvent| {
                slot_in_listener.lock().take();
            }),
        );
        *slot.lock() = Some(handle);

        assert_eq!(registry.emit(&MapEvent::new(EventKind::Click)), 1);
        assert_eq!(registry.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_event_stream_yields_events_and_cleans_up() {
        let registry = ListenerRegistry::new();
        let source = Source(registry.clone());
        let mut stream = source.event_stream(EventKind::DragEnd);
        assert_eq!(registry.listener_count_for(EventKind::DragEnd), 1);

        let event = MapEvent::new(EventKind::DragEnd).with_location(LatLong::new(1.0, 2.0));
        registry.emit(&event);
        assert_eq!(stream.next().await, Some(event));

        drop(stream);
        assert_eq!(registry.listener_count(), 0);
    }

    #[test]
    fn test_display_title_ignores_empty() {
        let mut target = EventTarget {
            entity_id: EntityId(1),
            title: Some(String::new()),
            location: None,
        };
        assert_eq!(target.display_title(), None);
        target.title = Some("Depot".to_string());
        assert_eq!(target.display_title(), Some("Depot"));
    }
}
