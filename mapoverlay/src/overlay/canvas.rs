//! 2D drawing surface used by the label renderer.
//!
//! Mirrors the subset of the HTML canvas 2D context the renderer needs, so
//! a provider adapter can hand over its real canvas and tests can record
//! draw calls instead.

use std::sync::Arc;

use parking_lot::Mutex;

/// Horizontal text alignment relative to the draw point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

pub trait Canvas2d: Send {
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// CSS font shorthand, e.g. `"11px sans-serif"`.
    fn set_font(&mut self, font: &str);

    fn set_fill_style(&mut self, style: &str);

    fn set_stroke_style(&mut self, style: &str);

    fn set_line_width(&mut self, width: f64);

    fn set_text_align(&mut self, align: TextAlign);

    fn stroke_text(&mut self, text: &str, x: f64, y: f64);

    fn fill_text(&mut self, text: &str, x: f64, y: f64);
}

/// Canvas shared between the map and the overlay drawing on it.
pub type SharedCanvas = Arc<Mutex<Box<dyn Canvas2d>>>;

pub fn shared_canvas(canvas: impl Canvas2d + 'static) -> SharedCanvas {
    Arc::new(Mutex::new(Box::new(canvas)))
}

/// One recorded canvas call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    ClearRect { x: f64, y: f64, width: f64, height: f64 },
    Font(String),
    FillStyle(String),
    StrokeStyle(String),
    LineWidth(f64),
    TextAlign(TextAlign),
    StrokeText { text: String, x: f64, y: f64 },
    FillText { text: String, x: f64, y: f64 },
}

/// Canvas that records every call. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    commands: Arc<Mutex<Vec<DrawCommand>>>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<DrawCommand> {
        self.commands.lock().clone()
    }

    /// Texts filled since the last clear, in draw order.
    pub fn filled_texts(&self) -> Vec<(String, f64, f64)> {
        let commands = self.commands.lock();
        let start = commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::ClearRect { .. }))
            .map_or(0, |i| i + 1);
        commands[start..]
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, x, y } => Some((text.clone(), *x, *y)),
                _ => None,
            })
            .collect()
    }

    pub fn clear_log(&self) {
        self.commands.lock().clear();
    }

    fn record(&self, command: DrawCommand) {
        self.commands.lock().push(command);
    }
}

impl Canvas2d for RecordingCanvas {
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.record(DrawCommand::ClearRect { x, y, width, height });
    }

    fn set_font(&mut self, font: &str) {
        self.record(DrawCommand::Font(font.to_string()));
    }

    fn set_fill_style(&mut self, style: &str) {
        self.record(DrawCommand::FillStyle(style.to_string()));
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.record(DrawCommand::StrokeStyle(style.to_string()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.record(DrawCommand::LineWidth(width));
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.record(DrawCommand::TextAlign(align));
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64) {
        self.record(DrawCommand::StrokeText {
            text: text.to_string(),
            x,
            y,
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.record(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
        });
    }
}
