//! Cluster layer configuration.

use std::sync::Arc;

use crate::cluster::{
    create_dynamic_size_marker, ClusterClickAction, ClusterOptions, ClusterPlacementMode,
    DynamicMarkerRange, IconCreationCallback,
};
use crate::coord::Point;
use crate::entity::{IconInfo, MarkerOptions};
use crate::error::{OverlayError, Result};
use crate::layer::LayerId;

use super::defaults::{
    DEFAULT_CLUSTERING_ENABLED, DEFAULT_DYNAMIC_MARKER_BASE_SIZE, DEFAULT_GRID_SIZE,
    DEFAULT_MINIMUM_CLUSTER_SIZE, DEFAULT_USE_DYNAMIC_SIZE_MARKERS,
};
use super::settings::ClusterSettings;

/// Configuration of one cluster layer.
///
/// Dynamic size markers and a custom icon creation callback exclude each
/// other: enabling dynamic markers makes the dynamic icon generator the
/// callback, and setting a callback while they are enabled is an error.
///
/// # Example
///
/// ```
/// use mapoverlay::config::ClusterConfig;
/// use mapoverlay::cluster::ClusterPlacementMode;
///
/// let config = ClusterConfig::new()
///     .with_grid_size(80.0)
///     .with_placement_mode(ClusterPlacementMode::FirstPin)
///     .with_dynamic_size_markers(true);
///
/// assert_eq!(config.grid_size(), 80.0);
/// assert!(config.icon_creation_callback().is_some());
/// ```
#[derive(Clone)]
pub struct ClusterConfig {
    grid_size: f64,
    placement_mode: ClusterPlacementMode,
    click_action: ClusterClickAction,
    minimum_cluster_size: usize,
    clustering_enabled: bool,
    use_dynamic_size_markers: bool,
    dynamic_marker_base_size: f64,
    dynamic_marker_ranges: DynamicMarkerRange,
    icon_creation_callback: Option<IconCreationCallback>,
    icon_info: Option<IconInfo>,
    z_index: Option<i32>,
    layer_offset: Option<Point>,
    visible: bool,
}

impl ClusterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the clustering cell size in pixels. Default: 150.
    pub fn with_grid_size(mut self, grid_size: f64) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn with_placement_mode(mut self, mode: ClusterPlacementMode) -> Self {
        self.placement_mode = mode;
        self
    }

    pub fn with_click_action(mut self, action: ClusterClickAction) -> Self {
        self.click_action = action;
        self
    }

    /// Smallest group of markers shown as a cluster. Default: 2.
    pub fn with_minimum_cluster_size(mut self, size: usize) -> Self {
        self.minimum_cluster_size = size;
        self
    }

    pub fn with_clustering_enabled(mut self, enabled: bool) -> Self {
        self.clustering_enabled = enabled;
        self
    }

    /// Use the dynamic icon generator for cluster glyphs.
    ///
    /// Enabling replaces any custom icon creation callback.
    pub fn with_dynamic_size_markers(mut self, enabled: bool) -> Self {
        self.use_dynamic_size_markers = enabled;
        if enabled {
            self.icon_creation_callback = None;
        }
        self
    }

    pub fn with_dynamic_marker_base_size(mut self, base_size: f64) -> Self {
        self.dynamic_marker_base_size = base_size;
        self
    }

    pub fn with_dynamic_marker_ranges(mut self, ranges: DynamicMarkerRange) -> Self {
        self.dynamic_marker_ranges = ranges;
        self
    }

    /// Set a custom icon creation callback.
    ///
    /// # Errors
    ///
    /// [`OverlayError::MutuallyExclusive`] when dynamic size markers are
    /// enabled.
    pub fn with_icon_creation_callback(mut self, callback: IconCreationCallback) -> Result<Self> {
        if self.use_dynamic_size_markers {
            return Err(OverlayError::MutuallyExclusive {
                property: "IconCreationCallback",
                conflicts_with: "UseDynamicSizeMarkers",
            });
        }
        self.icon_creation_callback = Some(callback);
        Ok(self)
    }

    pub fn with_icon_info(mut self, icon_info: IconInfo) -> Self {
        self.icon_info = Some(icon_info);
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }

    pub fn with_layer_offset(mut self, offset: Point) -> Self {
        self.layer_offset = Some(offset);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    pub fn placement_mode(&self) -> ClusterPlacementMode {
        self.placement_mode
    }

    pub fn click_action(&self) -> ClusterClickAction {
        self.click_action
    }

    pub fn minimum_cluster_size(&self) -> usize {
        self.minimum_cluster_size
    }

    pub fn clustering_enabled(&self) -> bool {
        self.clustering_enabled
    }

    pub fn use_dynamic_size_markers(&self) -> bool {
        self.use_dynamic_size_markers
    }

    pub fn dynamic_marker_base_size(&self) -> f64 {
        self.dynamic_marker_base_size
    }

    pub fn dynamic_marker_ranges(&self) -> &DynamicMarkerRange {
        &self.dynamic_marker_ranges
    }

    /// The callback cluster icons are built with: the dynamic generator when
    /// dynamic size markers are enabled, otherwise the custom callback.
    pub fn icon_creation_callback(&self) -> Option<IconCreationCallback> {
        if self.use_dynamic_size_markers {
            let base_size = self.dynamic_marker_base_size;
            let ranges = self.dynamic_marker_ranges.clone();
            let generator: IconCreationCallback =
                Arc::new(move |members: &[MarkerOptions], info: &mut IconInfo| {
                    create_dynamic_size_marker(members.len() as u64, info, base_size, &ranges)
                });
            return Some(generator);
        }
        self.icon_creation_callback.clone()
    }

    pub fn icon_info(&self) -> Option<&IconInfo> {
        self.icon_info.as_ref()
    }

    pub fn z_index(&self) -> Option<i32> {
        self.z_index
    }

    pub fn layer_offset(&self) -> Option<Point> {
        self.layer_offset
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Descriptor for a cluster layer with this configuration.
    pub fn to_options(&self, id: LayerId) -> ClusterOptions {
        ClusterOptions {
            id,
            visible: self.visible,
            z_index: self.z_index,
            layer_offset: self.layer_offset,
            clustering_enabled: self.clustering_enabled,
            grid_size: self.grid_size,
            placement_mode: self.placement_mode,
            click_action: self.click_action,
            minimum_cluster_size: self.minimum_cluster_size,
            icon_info: self.icon_info.clone(),
            icon_callback: self.icon_creation_callback(),
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            placement_mode: ClusterPlacementMode::default(),
            click_action: ClusterClickAction::default(),
            minimum_cluster_size: DEFAULT_MINIMUM_CLUSTER_SIZE,
            clustering_enabled: DEFAULT_CLUSTERING_ENABLED,
            use_dynamic_size_markers: DEFAULT_USE_DYNAMIC_SIZE_MARKERS,
            dynamic_marker_base_size: DEFAULT_DYNAMIC_MARKER_BASE_SIZE,
            dynamic_marker_ranges: DynamicMarkerRange::default(),
            icon_creation_callback: None,
            icon_info: None,
            z_index: None,
            layer_offset: None,
            visible: true,
        }
    }
}

impl From<&ClusterSettings> for ClusterConfig {
    fn from(settings: &ClusterSettings) -> Self {
        Self::new()
            .with_grid_size(settings.grid_size)
            .with_placement_mode(settings.placement_mode)
            .with_click_action(settings.click_action)
            .with_minimum_cluster_size(settings.minimum_cluster_size)
            .with_clustering_enabled(settings.clustering_enabled)
            .with_dynamic_size_markers(settings.use_dynamic_size_markers)
            .with_dynamic_marker_base_size(settings.dynamic_marker_base_size)
    }
}

impl std::fmt::Debug for ClusterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterConfig")
            .field("grid_size", &self.grid_size)
            .field("placement_mode", &self.placement_mode)
            .field("click_action", &self.click_action)
            .field("minimum_cluster_size", &self.minimum_cluster_size)
            .field("clustering_enabled", &self.clustering_enabled)
            .field("use_dynamic_size_markers", &self.use_dynamic_size_markers)
            .field("dynamic_marker_base_size", &self.dynamic_marker_base_size)
            .field("custom_icon_callback", &self.icon_creation_callback.is_some())
            .field("z_index", &self.z_index)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::MAX_SAFE_COUNT;
    use crate::coord::LatLong;

    fn callback() -> IconCreationCallback {
        Arc::new(|_, _| "<svg/>".to_string())
    }

    #[test]
    fn test_defaults() {
        let config = ClusterConfig::default();
        assert_eq!(config.grid_size(), 150.0);
        assert_eq!(config.placement_mode(), ClusterPlacementMode::MeanValue);
        assert_eq!(config.click_action(), ClusterClickAction::ZoomIntoCluster);
        assert_eq!(config.minimum_cluster_size(), 2);
        assert!(config.clustering_enabled());
        assert!(!config.use_dynamic_size_markers());
        assert_eq!(config.dynamic_marker_base_size(), 12.0);
        assert_eq!(config.dynamic_marker_ranges().len(), 3);
        assert!(config.icon_creation_callback().is_none());
    }

    #[test]
    fn test_callback_rejected_while_dynamic_markers_enabled() {
        let result = ClusterConfig::new()
            .with_dynamic_size_markers(true)
            .with_icon_creation_callback(callback());
        assert_eq!(
            result.err(),
            Some(OverlayError::MutuallyExclusive {
                property: "IconCreationCallback",
                conflicts_with: "UseDynamicSizeMarkers",
            })
        );
    }

    #[test]
    fn test_enabling_dynamic_markers_replaces_callback() {
        let config = ClusterConfig::new()
            .with_icon_creation_callback(callback())
            .unwrap()
            .with_dynamic_size_markers(true);

        let generator = config.icon_creation_callback().unwrap();
        let members = vec![MarkerOptions::at(LatLong::new(0.0, 0.0)); 100];
        let mut info = IconInfo::default();
        let markup = generator(&members, &mut info);

        assert!(markup.contains("<circle"));
        assert_eq!(info.size.unwrap().width, 44.0);
    }

    #[test]
    fn test_generator_uses_configured_ranges() {
        let ranges = DynamicMarkerRange::empty().with_threshold(MAX_SAFE_COUNT, "blue");
        let config = ClusterConfig::new()
            .with_dynamic_size_markers(true)
            .with_dynamic_marker_ranges(ranges);
        let mut info = IconInfo::default();
        let markup = (config.icon_creation_callback().unwrap())(&[], &mut info);
        assert!(markup.contains(r#"fill="blue""#));
    }

    #[test]
    fn test_to_options_carries_topology() {
        let options = ClusterConfig::new()
            .with_z_index(4)
            .with_click_action(ClusterClickAction::None)
            .to_options(LayerId(9));
        assert_eq!(options.id, LayerId(9));
        assert_eq!(options.z_index, Some(4));
        assert_eq!(options.click_action, ClusterClickAction::None);
    }
}
