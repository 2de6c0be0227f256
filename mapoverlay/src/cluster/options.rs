//! Cluster layer descriptors.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::coord::Point;
use crate::entity::{IconInfo, MarkerOptions};
use crate::layer::{LayerId, LayerOptions};

/// Builds the icon markup of a cluster from its members and fills in the
/// icon metadata the provider needs to place it.
pub type IconCreationCallback = Arc<dyn Fn(&[MarkerOptions], &mut IconInfo) -> String + Send + Sync>;

/// Where a cluster glyph is placed relative to its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusterPlacementMode {
    /// Center of the grid cell
    None,
    /// Location of the first member
    FirstPin,
    /// Mean location of all members
    #[default]
    MeanValue,
}

impl FromStr for ClusterPlacementMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "firstpin" | "first_pin" => Ok(Self::FirstPin),
            "meanvalue" | "mean_value" | "mean" => Ok(Self::MeanValue),
            _ => Err(format!(
                "unknown placement mode '{}', expected none, first_pin or mean_value",
                s
            )),
        }
    }
}

impl fmt::Display for ClusterPlacementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::FirstPin => write!(f, "first_pin"),
            Self::MeanValue => write!(f, "mean_value"),
        }
    }
}

/// What clicking a cluster does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusterClickAction {
    None,
    #[default]
    ZoomIntoCluster,
}

impl ClusterClickAction {
    pub fn zooms(&self) -> bool {
        matches!(self, Self::ZoomIntoCluster)
    }
}

impl FromStr for ClusterClickAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "zoomintocluster" | "zoom_into_cluster" | "zoom" => Ok(Self::ZoomIntoCluster),
            _ => Err(format!(
                "unknown click action '{}', expected none or zoom_into_cluster",
                s
            )),
        }
    }
}

impl fmt::Display for ClusterClickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::ZoomIntoCluster => write!(f, "zoom_into_cluster"),
        }
    }
}

/// Descriptor a cluster layer is created with.
#[derive(Clone)]
pub struct ClusterOptions {
    pub id: LayerId,
    pub visible: bool,
    pub z_index: Option<i32>,
    pub layer_offset: Option<Point>,
    pub clustering_enabled: bool,
    /// Edge length of a clustering cell in pixels
    pub grid_size: f64,
    pub placement_mode: ClusterPlacementMode,
    pub click_action: ClusterClickAction,
    /// Smallest bucket rendered as a cluster rather than single pins
    pub minimum_cluster_size: usize,
    /// Icon applied to cluster glyphs before the callback runs
    pub icon_info: Option<IconInfo>,
    pub icon_callback: Option<IconCreationCallback>,
}

impl ClusterOptions {
    pub fn new(id: LayerId) -> Self {
        Self {
            id,
            visible: true,
            z_index: None,
            layer_offset: None,
            clustering_enabled: true,
            grid_size: crate::config::DEFAULT_GRID_SIZE,
            placement_mode: ClusterPlacementMode::default(),
            click_action: ClusterClickAction::default(),
            minimum_cluster_size: crate::config::DEFAULT_MINIMUM_CLUSTER_SIZE,
            icon_info: None,
            icon_callback: None,
        }
    }

    /// Layer-level part of the descriptor.
    pub fn layer_options(&self) -> LayerOptions {
        LayerOptions {
            id: self.id,
            visible: self.visible,
            z_index: self.z_index,
            layer_offset: self.layer_offset,
        }
    }

    pub fn apply(&mut self, patch: &ClusterPatch) {
        if let Some(v) = patch.clustering_enabled {
            self.clustering_enabled = v;
        }
        if let Some(v) = patch.grid_size {
            self.grid_size = v;
        }
        if let Some(v) = patch.placement_mode {
            self.placement_mode = v;
        }
        if let Some(v) = patch.zoom_on_click {
            self.click_action = if v {
                ClusterClickAction::ZoomIntoCluster
            } else {
                ClusterClickAction::None
            };
        }
        if let Some(v) = patch.visible {
            self.visible = v;
        }
    }
}

impl fmt::Debug for ClusterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterOptions")
            .field("id", &self.id)
            .field("visible", &self.visible)
            .field("z_index", &self.z_index)
            .field("layer_offset", &self.layer_offset)
            .field("clustering_enabled", &self.clustering_enabled)
            .field("grid_size", &self.grid_size)
            .field("placement_mode", &self.placement_mode)
            .field("click_action", &self.click_action)
            .field("minimum_cluster_size", &self.minimum_cluster_size)
            .field("icon_info", &self.icon_info)
            .field("icon_callback", &self.icon_callback.is_some())
            .finish()
    }
}

/// Live cluster update.
///
/// Everything except `visible` requires a provider with reconfigurable
/// clusters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClusterPatch {
    pub clustering_enabled: Option<bool>,
    pub grid_size: Option<f64>,
    pub placement_mode: Option<ClusterPlacementMode>,
    pub zoom_on_click: Option<bool>,
    pub visible: Option<bool>,
}

impl ClusterPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Name of the first key that reshapes clustering, if any.
    pub fn topology_key(&self) -> Option<&'static str> {
        if self.clustering_enabled.is_some() {
            Some("clusteringEnabled")
        } else if self.grid_size.is_some() {
            Some("gridSize")
        } else if self.placement_mode.is_some() {
            Some("placementMode")
        } else if self.zoom_on_click.is_some() {
            Some("zoomOnClick")
        } else {
            None
        }
    }
}
