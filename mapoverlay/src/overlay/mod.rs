//! Canvas overlay for labels and tooltips.
//!
//! - [`canvas`]: the 2D drawing surface abstraction and a recording backend
//! - [`label`]: label entries, styles and viewport-culled text rendering
//! - [`tooltip`]: the shared tooltip state with patch-based updates
//! - [`service`]: the overlay lifecycle tying those to a [`MapService`](crate::map::MapService)

pub mod canvas;
pub mod label;
pub mod service;
pub mod tooltip;

pub use canvas::{shared_canvas, Canvas2d, DrawCommand, RecordingCanvas, SharedCanvas, TextAlign};
pub use label::{render_labels, LabelEntry, LabelOptions, LabelStyle};
pub use service::{CanvasOverlay, OverlayState};
pub use tooltip::{Tooltip, TooltipPatch, TooltipState};
