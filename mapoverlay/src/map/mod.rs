//! Map service contract.
//!
//! The overlay core needs four things from the map itself: the current zoom,
//! batched projection of locations to viewport pixels, the viewport size, and
//! a transparent canvas stacked on top of the map that is redrawn whenever
//! the view changes. Map-level pointer events come through [`EventSource`].

pub mod memory;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::coord::{LatLong, Point, Size};
use crate::overlay::SharedCanvas;
use crate::provider::{EventSource, ProviderError};

/// Called with the overlay's canvas whenever the map needs it redrawn.
pub type DrawCallback = Arc<dyn Fn(SharedCanvas) -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanvasId(pub u64);

impl fmt::Display for CanvasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "canvas-{}", self.0)
    }
}

/// A canvas overlay created on the map.
#[derive(Clone)]
pub struct CanvasHandle {
    pub id: CanvasId,
    pub canvas: SharedCanvas,
}

impl fmt::Debug for CanvasHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasHandle").field("id", &self.id).finish()
    }
}

pub trait MapService: EventSource + 'static {
    fn zoom(&self) -> impl Future<Output = f64> + Send;

    /// Project locations to viewport pixels in one call. The result is in
    /// input order.
    fn locations_to_points(&self, locations: &[LatLong]) -> impl Future<Output = Vec<Point>> + Send;

    /// Viewport size in pixels.
    fn map_size(&self) -> Size;

    /// Stack a canvas on the map. `draw` is called for every redraw until the
    /// overlay is removed.
    fn create_canvas_overlay(
        &self,
        draw: DrawCallback,
    ) -> impl Future<Output = Result<CanvasHandle, ProviderError>> + Send;

    fn remove_canvas_overlay(&self, id: CanvasId);
}
