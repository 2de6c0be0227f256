//! Settings structs, one per `[section]` of the INI file.

use std::path::PathBuf;

use crate::cluster::{ClusterClickAction, ClusterPlacementMode};

/// Complete configuration loaded from an INI file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub cluster: ClusterSettings,
    pub labels: LabelSettings,
    pub logging: LoggingSettings,
}

/// `[cluster]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSettings {
    pub grid_size: f64,
    pub placement_mode: ClusterPlacementMode,
    pub click_action: ClusterClickAction,
    pub minimum_cluster_size: usize,
    pub clustering_enabled: bool,
    pub use_dynamic_size_markers: bool,
    pub dynamic_marker_base_size: f64,
}

/// `[labels]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSettings {
    pub show_labels: bool,
    pub show_tooltips: bool,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub font_color: Option<String>,
    pub stroke_color: Option<String>,
    pub stroke_weight: Option<f64>,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `info` or
    /// `mapoverlay=debug`
    pub level: String,
    /// Also write logs to this file
    pub file: Option<PathBuf>,
}
