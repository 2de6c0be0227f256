//! Label and tooltip configuration.

use crate::overlay::LabelOptions;

use super::defaults::{
    DEFAULT_LABEL_MAX_ZOOM, DEFAULT_LABEL_MIN_ZOOM, DEFAULT_SHOW_LABELS, DEFAULT_SHOW_TOOLTIPS,
};
use super::settings::LabelSettings;

/// When and how a layer draws labels and tooltips.
///
/// # Example
///
/// ```
/// use mapoverlay::config::LabelConfig;
///
/// let config = LabelConfig::new().with_show_labels(true).with_zoom_range(5.0, 12.0);
/// assert!(config.zoom_in_range(5.0));
/// assert!(config.zoom_in_range(12.0));
/// assert!(!config.zoom_in_range(12.5));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LabelConfig {
    show_labels: bool,
    show_tooltips: bool,
    min_zoom: f64,
    max_zoom: f64,
    label_options: LabelOptions,
}

impl LabelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_show_labels(mut self, show: bool) -> Self {
        self.show_labels = show;
        self
    }

    pub fn with_show_tooltips(mut self, show: bool) -> Self {
        self.show_tooltips = show;
        self
    }

    pub fn with_min_zoom(mut self, zoom: f64) -> Self {
        self.min_zoom = zoom;
        self
    }

    pub fn with_max_zoom(mut self, zoom: f64) -> Self {
        self.max_zoom = zoom;
        self
    }

    /// Draw labels only between `min` and `max`, both inclusive.
    pub fn with_zoom_range(self, min: f64, max: f64) -> Self {
        self.with_min_zoom(min).with_max_zoom(max)
    }

    pub fn with_label_options(mut self, options: LabelOptions) -> Self {
        self.label_options = options;
        self
    }

    pub fn show_labels(&self) -> bool {
        self.show_labels
    }

    pub fn show_tooltips(&self) -> bool {
        self.show_tooltips
    }

    pub fn min_zoom(&self) -> f64 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    pub fn label_options(&self) -> &LabelOptions {
        &self.label_options
    }

    pub fn zoom_in_range(&self, zoom: f64) -> bool {
        zoom >= self.min_zoom && zoom <= self.max_zoom
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            show_labels: DEFAULT_SHOW_LABELS,
            show_tooltips: DEFAULT_SHOW_TOOLTIPS,
            min_zoom: DEFAULT_LABEL_MIN_ZOOM,
            max_zoom: DEFAULT_LABEL_MAX_ZOOM,
            label_options: LabelOptions::default(),
        }
    }
}

impl From<&LabelSettings> for LabelConfig {
    fn from(settings: &LabelSettings) -> Self {
        Self::new()
            .with_show_labels(settings.show_labels)
            .with_show_tooltips(settings.show_tooltips)
            .with_zoom_range(settings.min_zoom, settings.max_zoom)
            .with_label_options(LabelOptions {
                font_size: settings.font_size,
                font_family: settings.font_family.clone(),
                font_color: settings.font_color.clone(),
                stroke_color: settings.stroke_color.clone(),
                stroke_weight: settings.stroke_weight,
            })
    }
}
