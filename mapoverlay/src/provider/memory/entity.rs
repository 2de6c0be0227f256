//! In-memory entities.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::coord::LatLong;
use crate::entity::{
    IconInfo, MarkerOptions, MarkerPatch, PolygonOptions, PolygonPatch, PolylineOptions,
    PolylinePatch,
};
use crate::provider::{
    EntityHandle, EntityId, EventKind, EventSource, EventTarget, Listener, ListenerHandle,
    ListenerRegistry, MapEvent, MarkerHandle, PolygonHandle, PolylineHandle,
};

/// What the in-memory entity needs to know about its option record.
pub trait EntityOptions: Clone + fmt::Debug + Send + Sync + 'static {
    fn title(&self) -> Option<String>;

    fn anchor(&self) -> Option<LatLong>;

    fn visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);
}

impl EntityOptions for MarkerOptions {
    fn title(&self) -> Option<String> {
        self.title.clone()
    }

    fn anchor(&self) -> Option<LatLong> {
        Some(self.position)
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl EntityOptions for PolygonOptions {
    fn title(&self) -> Option<String> {
        self.title.clone()
    }

    fn anchor(&self) -> Option<LatLong> {
        self.centroid()
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl EntityOptions for PolylineOptions {
    fn title(&self) -> Option<String> {
        self.title.clone()
    }

    fn anchor(&self) -> Option<LatLong> {
        self.path.first().copied()
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

struct EntityInner<O> {
    id: EntityId,
    options: Mutex<O>,
    icon: Option<IconInfo>,
    deleted: AtomicBool,
    listeners: ListenerRegistry,
    /// Listeners of the layer currently holding the entity
    parent: Mutex<Option<ListenerRegistry>>,
}

/// Entity materialised by [`MemoryProvider`](super::MemoryProvider).
pub struct MemoryEntity<O> {
    inner: Arc<EntityInner<O>>,
}

pub type MemoryMarker = MemoryEntity<MarkerOptions>;
pub type MemoryPolygon = MemoryEntity<PolygonOptions>;
pub type MemoryPolyline = MemoryEntity<PolylineOptions>;

impl<O: EntityOptions> MemoryEntity<O> {
    pub(crate) fn new(id: EntityId, options: O, icon: Option<IconInfo>) -> Self {
        Self {
            inner: Arc::new(EntityInner {
                id,
                options: Mutex::new(options),
                icon,
                deleted: AtomicBool::new(false),
                listeners: ListenerRegistry::new(),
                parent: Mutex::new(None),
            }),
        }
    }

    /// Icon the entity was created with.
    pub fn icon(&self) -> Option<IconInfo> {
        self.inner.icon.clone()
    }

    pub(crate) fn snapshot(&self) -> O {
        self.inner.options.lock().clone()
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut O)) {
        f(&mut self.inner.options.lock());
    }

    pub(crate) fn attach(&self, layer_listeners: &ListenerRegistry) {
        *self.inner.parent.lock() = Some(layer_listeners.clone());
    }

    pub(crate) fn detach(&self) {
        self.inner.parent.lock().take();
    }

    /// Simulate a user interaction on this entity.
    ///
    /// The event target is filled in from the entity when the event does not
    /// carry one. The event reaches the entity's listeners first, then the
    /// listeners of its layer. Returns the number of listeners called.
    pub fn fire(&self, mut event: MapEvent) -> usize {
        if self.is_deleted() {
            warn!(entity = %self.inner.id, kind = %event.kind, "Event on deleted entity dropped");
            return 0;
        }
        if event.target.is_none() {
            let options = self.snapshot();
            event.target = Some(EventTarget {
                entity_id: self.inner.id,
                title: options.title(),
                location: options.anchor(),
            });
        }
        trace!(entity = %self.inner.id, kind = %event.kind, "Dispatching entity event");

        let mut called = self.inner.listeners.emit(&event);
        let parent = self.inner.parent.lock().clone();
        if let Some(parent) = parent {
            called += parent.emit(&event);
        }
        called
    }

    /// Listeners attached directly to this entity.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.listener_count()
    }
}

impl<O> Clone for MemoryEntity<O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<O: EntityOptions> fmt::Debug for MemoryEntity<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryEntity")
            .field("id", &self.inner.id)
            .field("options", &*self.inner.options.lock())
            .field("deleted", &self.is_deleted())
            .finish()
    }
}

impl<O: EntityOptions> EventSource for MemoryEntity<O> {
    fn add_listener(&self, kind: EventKind, listener: Listener) -> ListenerHandle {
        self.inner.listeners.add(kind, listener)
    }
}

impl<O: EntityOptions> EntityHandle for MemoryEntity<O> {
    fn entity_id(&self) -> EntityId {
        self.inner.id
    }

    fn set_visible(&self, visible: bool) {
        self.update(|o| o.set_visible(visible));
    }

    fn is_visible(&self) -> bool {
        self.inner.options.lock().visible()
    }

    fn delete(&self) {
        if !self.inner.deleted.swap(true, Ordering::AcqRel) {
            self.inner.listeners.clear();
            self.detach();
            trace!(entity = %self.inner.id, "Entity deleted");
        }
    }

    fn is_deleted(&self) -> bool {
        self.inner.deleted.load(Ordering::Acquire)
    }
}

impl MarkerHandle for MemoryMarker {
    fn options(&self) -> MarkerOptions {
        self.snapshot()
    }

    fn set_options(&self, patch: &MarkerPatch) {
        self.update(|o| o.apply(patch));
    }
}

impl PolygonHandle for MemoryPolygon {
    fn options(&self) -> PolygonOptions {
        self.snapshot()
    }

    fn set_options(&self, patch: &PolygonPatch) {
        self.update(|o| o.apply(patch));
    }
}

impl PolylineHandle for MemoryPolyline {
    fn options(&self) -> PolylineOptions {
        self.snapshot()
    }

    fn set_options(&self, patch: &PolylinePatch) {
        self.update(|o| o.apply(patch));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn marker(title: &str) -> MemoryMarker {
        MemoryEntity::new(
            EntityId(1),
            MarkerOptions::at(LatLong::new(10.0, 20.0)).with_title(title),
            None,
        )
    }

    #[test]
    fn test_fire_fills_in_target() {
        let m = marker("Depot");
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let _h = m.add_listener(
            EventKind::MouseOver,
            Arc::new(move |e: &MapEvent| {
                *sink.lock() = e.target.clone();
            }),
        );

        m.fire(MapEvent::new(EventKind::MouseOver));
        let target = seen.lock().clone().unwrap();
        assert_eq!(target.entity_id, EntityId(1));
        assert_eq!(target.display_title(), Some("Depot"));
        assert_eq!(target.location, Some(LatLong::new(10.0, 20.0)));
    }

    #[test]
    fn test_events_bubble_to_layer() {
        let m = marker("a");
        let layer = ListenerRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let _h = layer.add(
            EventKind::Click,
            Arc::new(move |_: &MapEvent| {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        );

        m.attach(&layer);
        assert_eq!(m.fire(MapEvent::new(EventKind::Click)), 1);
        m.detach();
        assert_eq!(m.fire(MapEvent::new(EventKind::Click)), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_deleted_entity_drops_events_and_listeners() {
        let m = marker("a");
        let _h = m.add_listener(EventKind::Click, Arc::new(|_: &MapEvent| {}));
        m.delete();
        assert_eq!(m.listener_count(), 0);
        assert_eq!(m.fire(MapEvent::new(EventKind::Click)), 0);
    }
}
