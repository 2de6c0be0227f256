//! Canvas overlay: a transparent canvas stacked on the map that draws
//! zoom-dependent labels and owns the layer's tooltip.
//!
//! Lifecycle: `Uninitialized` until [`CanvasOverlay::attach`] obtains a canvas
//! from the map, then `Ready`, switching to `Drawing` while a redraw is in
//! flight. [`CanvasOverlay::delete`] moves it to `Disposed` and releases the
//! tooltip subscriptions. The draw callback handed to the map holds only a
//! weak reference, so the map never keeps a deleted overlay alive.

use std::fmt;
use std::sync::{Arc, Weak};

use futures::FutureExt;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::LabelConfig;
use crate::coord::LatLong;
use crate::error::{OverlayError, Result};
use crate::map::{CanvasHandle, DrawCallback, MapService};
use crate::provider::{EventKind, EventSource, ListenerHandle, MapEvent};

use super::canvas::SharedCanvas;
use super::label::{render_labels, LabelEntry, LabelOptions};
use super::tooltip::{Tooltip, TooltipPatch};

/// Observable state of a canvas overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Uninitialized,
    Ready,
    Drawing,
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Attaching,
    Attached,
    Disposed,
}

struct OverlayInner {
    phase: Phase,
    draws_in_flight: usize,
    canvas: Option<CanvasHandle>,
    labels: Vec<LabelEntry>,
    config: LabelConfig,
    /// Always empty or exactly the three tooltip handlers
    subscriptions: Vec<ListenerHandle>,
}

pub struct CanvasOverlay<M: MapService> {
    map: Arc<M>,
    tooltip: Tooltip,
    inner: Mutex<OverlayInner>,
}

impl<M: MapService> CanvasOverlay<M> {
    /// `tooltip_style` is the label style used where `config` leaves a field
    /// unset.
    pub fn new(map: Arc<M>, config: LabelConfig, tooltip_style: LabelOptions) -> Arc<Self> {
        Arc::new(Self {
            map,
            tooltip: Tooltip::new(tooltip_style),
            inner: Mutex::new(OverlayInner {
                phase: Phase::Uninitialized,
                draws_in_flight: 0,
                canvas: None,
                labels: Vec::new(),
                config,
                subscriptions: Vec::new(),
            }),
        })
    }

    pub fn state(&self) -> OverlayState {
        let inner = self.inner.lock();
        match inner.phase {
            Phase::Uninitialized | Phase::Attaching => OverlayState::Uninitialized,
            Phase::Disposed => OverlayState::Disposed,
            Phase::Attached if inner.draws_in_flight > 0 => OverlayState::Drawing,
            Phase::Attached => OverlayState::Ready,
        }
    }

    /// Obtain a canvas from the map and draw the current labels on it.
    ///
    /// Attaching twice is a no-op. If the overlay is deleted while the map is
    /// creating the canvas, the canvas is removed again once it arrives.
    pub async fn attach(self: &Arc<Self>) -> Result<()> {
        {
            let mut inner = self.inner.lock();
            match inner.phase {
                Phase::Disposed => return Err(OverlayError::OverlayDisposed),
                Phase::Attaching | Phase::Attached => return Ok(()),
                Phase::Uninitialized => inner.phase = Phase::Attaching,
            }
        }

        let handle = self.map.create_canvas_overlay(self.draw_callback()).await?;

        let disposed = {
            let mut inner = self.inner.lock();
            if inner.phase == Phase::Disposed {
                true
            } else {
                inner.phase = Phase::Attached;
                inner.canvas = Some(handle.clone());
                false
            }
        };
        if disposed {
            debug!(canvas = %handle.id, "Overlay deleted while attaching, removing canvas");
            self.map.remove_canvas_overlay(handle.id);
            return Ok(());
        }

        debug!(canvas = %handle.id, "Canvas overlay attached");
        self.draw(handle.canvas).await?;
        Ok(())
    }

    fn draw_callback(self: &Arc<Self>) -> DrawCallback {
        let weak: Weak<Self> = Arc::downgrade(self);
        Arc::new(move |canvas: SharedCanvas| {
            let weak = weak.clone();
            async move {
                if let Some(overlay) = weak.upgrade() {
                    if let Err(e) = overlay.draw(canvas).await {
                        trace!(error = %e, "Skipped overlay redraw");
                    }
                }
            }
            .boxed()
        })
    }

    /// Replace the label set.
    pub fn set_labels(&self, labels: Vec<LabelEntry>) {
        self.inner.lock().labels = labels;
    }

    /// Append to the label set.
    pub fn append_labels(&self, labels: impl IntoIterator<Item = LabelEntry>) {
        self.inner.lock().labels.extend(labels);
    }

    pub fn labels(&self) -> Vec<LabelEntry> {
        self.inner.lock().labels.clone()
    }

    pub fn set_label_config(&self, config: LabelConfig) {
        self.inner.lock().config = config;
    }

    pub fn label_config(&self) -> LabelConfig {
        self.inner.lock().config.clone()
    }

    /// Clear the canvas and draw the labels again.
    ///
    /// Returns the number of labels drawn; 0 before the overlay is attached.
    pub async fn draw_labels(&self) -> Result<usize> {
        let canvas = {
            let inner = self.inner.lock();
            match inner.phase {
                Phase::Disposed => return Err(OverlayError::OverlayDisposed),
                Phase::Uninitialized | Phase::Attaching => return Ok(0),
                Phase::Attached => inner.canvas.as_ref().map(|h| h.canvas.clone()),
            }
        };
        match canvas {
            Some(canvas) => self.draw(canvas).await,
            None => Ok(0),
        }
    }

    async fn draw(&self, canvas: SharedCanvas) -> Result<usize> {
        let (labels, config) = {
            let mut inner = self.inner.lock();
            if inner.phase == Phase::Disposed {
                return Err(OverlayError::OverlayDisposed);
            }
            inner.draws_in_flight += 1;
            (inner.labels.clone(), inner.config.clone())
        };

        let drawn = self.render(&canvas, &labels, &config).await;

        let mut inner = self.inner.lock();
        inner.draws_in_flight = inner.draws_in_flight.saturating_sub(1);
        Ok(drawn)
    }

    async fn render(&self, canvas: &SharedCanvas, labels: &[LabelEntry], config: &LabelConfig) -> usize {
        let viewport = self.map.map_size();
        canvas
            .lock()
            .clear_rect(0.0, 0.0, viewport.width, viewport.height);

        if !config.show_labels() || labels.is_empty() {
            return 0;
        }
        let zoom = self.map.zoom().await;
        if !config.zoom_in_range(zoom) {
            trace!(zoom, "Labels hidden at this zoom");
            return 0;
        }

        let locations: Vec<LatLong> = labels.iter().map(|l| l.location).collect();
        let points = self.map.locations_to_points(&locations).await;
        let style = config
            .label_options()
            .or(self.tooltip.default_label_style())
            .resolve();

        let mut canvas = canvas.lock();
        let drawn = render_labels(&mut **canvas, labels, &points, viewport, &style);
        trace!(total = labels.len(), drawn, zoom, "Labels drawn");
        drawn
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    /// Turn the tooltip on or off.
    ///
    /// Both directions first hide the tooltip and drop any existing handlers.
    /// Turning it on then subscribes to pointer moves on the map and to
    /// mouseover/mouseout on the layer's entities.
    pub fn manage_tooltip(
        &self,
        show: bool,
        map_events: &dyn EventSource,
        layer_events: &dyn EventSource,
    ) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.phase == Phase::Disposed {
            return Err(OverlayError::OverlayDisposed);
        }
        inner.subscriptions.clear();
        self.tooltip.set(TooltipPatch::hide());
        if !show {
            debug!("Tooltip disabled");
            return Ok(());
        }

        let tooltip = self.tooltip.clone();
        let on_move = map_events.add_listener(
            EventKind::MouseMove,
            Arc::new(move |event: &MapEvent| {
                if let (true, Some(pixels)) = (tooltip.is_visible(), event.pixels) {
                    tooltip.set(TooltipPatch::move_to(pixels));
                }
            }),
        );

        let tooltip = self.tooltip.clone();
        let on_over = layer_events.add_listener(
            EventKind::MouseOver,
            Arc::new(move |event: &MapEvent| {
                let title = event.target.as_ref().and_then(|t| t.display_title());
                if let Some(title) = title {
                    tooltip.set(TooltipPatch::show(title, event.pixels.unwrap_or_default()));
                }
            }),
        );

        let tooltip = self.tooltip.clone();
        let on_out = layer_events.add_listener(
            EventKind::MouseOut,
            Arc::new(move |_: &MapEvent| tooltip.set(TooltipPatch::hide())),
        );

        inner.subscriptions = vec![on_move, on_over, on_out];
        debug!("Tooltip enabled");
        Ok(())
    }

    /// Number of active tooltip subscriptions: 0 or 3.
    pub fn subscription_count(&self) -> usize {
        self.inner
            .lock()
            .subscriptions
            .iter()
            .filter(|h| h.is_active())
            .count()
    }

    /// Dispose the overlay: release the tooltip handlers, hide the tooltip
    /// and remove the canvas from the map. Idempotent.
    pub fn delete(&self) {
        let canvas = {
            let mut inner = self.inner.lock();
            if inner.phase == Phase::Disposed {
                return;
            }
            inner.phase = Phase::Disposed;
            inner.subscriptions.clear();
            inner.labels.clear();
            inner.canvas.take()
        };
        self.tooltip.set(TooltipPatch::hide());
        if let Some(handle) = canvas {
            self.map.remove_canvas_overlay(handle.id);
        }
        debug!("Canvas overlay disposed");
    }
}

impl<M: MapService> fmt::Debug for CanvasOverlay<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasOverlay")
            .field("state", &self.state())
            .field("labels", &self.inner.lock().labels.len())
            .finish()
    }
}
