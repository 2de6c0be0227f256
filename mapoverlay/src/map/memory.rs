//! In-memory map.
//!
//! Keeps a view (center, zoom, viewport size) and projects with the Web
//! Mercator world-pixel formula, placing the center in the middle of the
//! viewport. Canvas overlays are backed by [`RecordingCanvas`] so the draw
//! calls can be inspected.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::join_all;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::coord::{to_world_pixel, LatLong, Point, Size};
use crate::overlay::{shared_canvas, RecordingCanvas, SharedCanvas};
use crate::provider::{
    EventKind, EventSource, Listener, ListenerHandle, ListenerRegistry, MapEvent, ProviderError,
};

use super::{CanvasHandle, CanvasId, DrawCallback, MapService};

#[derive(Debug, Clone, Copy, PartialEq)]
struct View {
    center: LatLong,
    zoom: f64,
    size: Size,
}

struct Overlay {
    id: CanvasId,
    draw: DrawCallback,
    canvas: SharedCanvas,
    recording: RecordingCanvas,
}

pub struct MemoryMap {
    view: Mutex<View>,
    overlays: Mutex<Vec<Overlay>>,
    next_canvas: AtomicU64,
    listeners: ListenerRegistry,
}

impl MemoryMap {
    pub fn new(center: LatLong, zoom: f64, size: Size) -> Self {
        Self {
            view: Mutex::new(View { center, zoom, size }),
            overlays: Mutex::new(Vec::new()),
            next_canvas: AtomicU64::new(1),
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn center(&self) -> LatLong {
        self.view.lock().center
    }

    pub fn current_zoom(&self) -> f64 {
        self.view.lock().zoom
    }

    /// Viewport pixel of a location under the current view.
    pub fn project(&self, location: LatLong) -> Point {
        let view = *self.view.lock();
        project(&view, location)
    }

    /// Move the map, fire a view change event and redraw every overlay.
    pub async fn set_view(&self, center: LatLong, zoom: f64) {
        {
            let mut view = self.view.lock();
            view.center = center;
            view.zoom = zoom;
        }
        debug!(%center, zoom, "Map view changed");
        self.fire(MapEvent::new(EventKind::ViewChange).with_location(center));
        self.redraw().await;
    }

    /// Resize the viewport and redraw.
    pub async fn set_size(&self, size: Size) {
        self.view.lock().size = size;
        self.redraw().await;
    }

    /// Call the draw callback of every overlay and wait for all of them.
    pub async fn redraw(&self) {
        let pending: Vec<_> = self
            .overlays
            .lock()
            .iter()
            .map(|o| (o.draw)(o.canvas.clone()))
            .collect();
        join_all(pending).await;
    }

    /// Simulate a map-level pointer event. Returns the number of listeners
    /// called.
    pub fn fire(&self, event: MapEvent) -> usize {
        trace!(kind = %event.kind, "Dispatching map event");
        self.listeners.emit(&event)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.listener_count()
    }

    pub fn canvas_count(&self) -> usize {
        self.overlays.lock().len()
    }

    /// Recorded draw calls of one overlay.
    pub fn recording(&self, id: CanvasId) -> Option<RecordingCanvas> {
        self.overlays
            .lock()
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.recording.clone())
    }

    /// Recorded draw calls of every overlay, in creation order.
    pub fn recordings(&self) -> Vec<RecordingCanvas> {
        self.overlays.lock().iter().map(|o| o.recording.clone()).collect()
    }
}

fn project(view: &View, location: LatLong) -> Point {
    let point = to_world_pixel(location, view.zoom);
    let center = to_world_pixel(view.center, view.zoom);
    Point::new(
        point.x - center.x + view.size.width / 2.0,
        point.y - center.y + view.size.height / 2.0,
    )
}

impl EventSource for MemoryMap {
    fn add_listener(&self, kind: EventKind, listener: Listener) -> ListenerHandle {
        self.listeners.add(kind, listener)
    }
}

impl MapService for MemoryMap {
    fn zoom(&self) -> impl Future<Output = f64> + Send {
        std::future::ready(self.current_zoom())
    }

    fn locations_to_points(&self, locations: &[LatLong]) -> impl Future<Output = Vec<Point>> + Send {
        let view = *self.view.lock();
        let points = locations.iter().map(|l| project(&view, *l)).collect();
        std::future::ready(points)
    }

    fn map_size(&self) -> Size {
        self.view.lock().size
    }

    fn create_canvas_overlay(
        &self,
        draw: DrawCallback,
    ) -> impl Future<Output = Result<CanvasHandle, ProviderError>> + Send {
        let id = CanvasId(self.next_canvas.fetch_add(1, Ordering::Relaxed));
        let recording = RecordingCanvas::new();
        let canvas = shared_canvas(recording.clone());
        self.overlays.lock().push(Overlay {
            id,
            draw,
            canvas: canvas.clone(),
            recording,
        });
        debug!(canvas = %id, "Canvas overlay created");
        std::future::ready(Ok(CanvasHandle { id, canvas }))
    }

    fn remove_canvas_overlay(&self, id: CanvasId) {
        self.overlays.lock().retain(|o| o.id != id);
        debug!(canvas = %id, "Canvas overlay removed");
    }
}
