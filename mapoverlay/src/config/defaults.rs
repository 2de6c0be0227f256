//! Default values for every configuration setting.

use super::settings::*;
use crate::cluster::{ClusterClickAction, ClusterPlacementMode, DEFAULT_BASE_SIZE};

// =============================================================================
// Clustering
// =============================================================================

/// Edge length of a clustering cell in pixels.
pub const DEFAULT_GRID_SIZE: f64 = 150.0;

pub const DEFAULT_MINIMUM_CLUSTER_SIZE: usize = 2;

pub const DEFAULT_CLUSTERING_ENABLED: bool = true;

pub const DEFAULT_USE_DYNAMIC_SIZE_MARKERS: bool = false;

pub const DEFAULT_DYNAMIC_MARKER_BASE_SIZE: f64 = DEFAULT_BASE_SIZE;

// =============================================================================
// Labels and tooltips
// =============================================================================

pub const DEFAULT_SHOW_LABELS: bool = false;

pub const DEFAULT_SHOW_TOOLTIPS: bool = true;

/// Lowest zoom at which labels are drawn; below every real zoom level.
pub const DEFAULT_LABEL_MIN_ZOOM: f64 = -1.0;

/// Highest zoom at which labels are drawn; above every real zoom level.
pub const DEFAULT_LABEL_MAX_ZOOM: f64 = 9_007_199_254_740_991.0;

// =============================================================================
// Logging
// =============================================================================

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            cluster: ClusterSettings {
                grid_size: DEFAULT_GRID_SIZE,
                placement_mode: ClusterPlacementMode::default(),
                click_action: ClusterClickAction::default(),
                minimum_cluster_size: DEFAULT_MINIMUM_CLUSTER_SIZE,
                clustering_enabled: DEFAULT_CLUSTERING_ENABLED,
                use_dynamic_size_markers: DEFAULT_USE_DYNAMIC_SIZE_MARKERS,
                dynamic_marker_base_size: DEFAULT_DYNAMIC_MARKER_BASE_SIZE,
            },
            labels: LabelSettings {
                show_labels: DEFAULT_SHOW_LABELS,
                show_tooltips: DEFAULT_SHOW_TOOLTIPS,
                min_zoom: DEFAULT_LABEL_MIN_ZOOM,
                max_zoom: DEFAULT_LABEL_MAX_ZOOM,
                font_size: None,
                font_family: None,
                font_color: None,
                stroke_color: None,
                stroke_weight: None,
            },
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}
