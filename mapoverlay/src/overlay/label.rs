//! Text labels drawn on the canvas overlay.

use serde::{Deserialize, Serialize};

use crate::coord::{LatLong, Point, Size};

use super::canvas::{Canvas2d, TextAlign};

pub const DEFAULT_FONT_SIZE: f64 = 11.0;
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";
pub const DEFAULT_FONT_COLOR: &str = "#FFFFFF";
pub const DEFAULT_STROKE_COLOR: &str = "#000000";
pub const DEFAULT_STROKE_WEIGHT: f64 = 2.0;

/// A label anchored at a geographic location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEntry {
    pub location: LatLong,
    pub title: String,
}

impl LabelEntry {
    /// Label for an entity, if it has a non-empty title and a location.
    pub fn for_entity(title: Option<&str>, location: Option<LatLong>) -> Option<Self> {
        match (title, location) {
            (Some(title), Some(location)) if !title.is_empty() => Some(Self {
                location,
                title: title.to_string(),
            }),
            _ => None,
        }
    }
}

/// Partial label styling. Unset fields fall back to the next style in line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelOptions {
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub font_color: Option<String>,
    pub stroke_color: Option<String>,
    pub stroke_weight: Option<f64>,
}

impl LabelOptions {
    /// Fields of `self`, with unset ones taken from `fallback`.
    pub fn or(&self, fallback: &LabelOptions) -> LabelOptions {
        LabelOptions {
            font_size: self.font_size.or(fallback.font_size),
            font_family: self.font_family.clone().or_else(|| fallback.font_family.clone()),
            font_color: self.font_color.clone().or_else(|| fallback.font_color.clone()),
            stroke_color: self.stroke_color.clone().or_else(|| fallback.stroke_color.clone()),
            stroke_weight: self.stroke_weight.or(fallback.stroke_weight),
        }
    }

    /// Fill remaining gaps with the built-in style.
    pub fn resolve(&self) -> LabelStyle {
        LabelStyle {
            font_size: self.font_size.unwrap_or(DEFAULT_FONT_SIZE),
            font_family: self
                .font_family
                .clone()
                .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string()),
            font_color: self
                .font_color
                .clone()
                .unwrap_or_else(|| DEFAULT_FONT_COLOR.to_string()),
            stroke_color: self
                .stroke_color
                .clone()
                .unwrap_or_else(|| DEFAULT_STROKE_COLOR.to_string()),
            stroke_weight: self.stroke_weight.unwrap_or(DEFAULT_STROKE_WEIGHT),
        }
    }
}

/// Fully resolved label style.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub font_size: f64,
    pub font_family: String,
    pub font_color: String,
    pub stroke_color: String,
    pub stroke_weight: f64,
}

impl LabelStyle {
    pub fn font(&self) -> String {
        format!("{}px {}", self.font_size, self.font_family)
    }
}

impl Default for LabelStyle {
    fn default() -> Self {
        LabelOptions::default().resolve()
    }
}

/// Draw the labels whose projected point lies inside the viewport.
///
/// `points` are the projections of `labels`, position for position. Returns
/// the number of labels drawn.
pub fn render_labels(
    canvas: &mut dyn Canvas2d,
    labels: &[LabelEntry],
    points: &[Point],
    viewport: Size,
    style: &LabelStyle,
) -> usize {
    let visible: Vec<(&LabelEntry, Point)> = labels
        .iter()
        .zip(points.iter().copied())
        .filter(|(_, point)| viewport.contains(*point))
        .collect();
    if visible.is_empty() {
        return 0;
    }

    canvas.set_font(&style.font());
    canvas.set_text_align(TextAlign::Center);
    canvas.set_fill_style(&style.font_color);
    if style.stroke_weight > 0.0 {
        canvas.set_stroke_style(&style.stroke_color);
        canvas.set_line_width(style.stroke_weight);
    }

    for (label, point) in &visible {
        // Outline first so the fill stays on top.
        if style.stroke_weight > 0.0 {
            canvas.stroke_text(&label.title, point.x, point.y);
        }
        canvas.fill_text(&label.title, point.x, point.y);
    }
    visible.len()
}
