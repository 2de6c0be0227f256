//! Translation of cluster input changes into a live [`ClusterPatch`].
//!
//! Some cluster inputs shape the provider-side layer so deeply that they can
//! only be set at creation. Changing them later is a usage error and is
//! reported immediately; the remaining inputs become a patch that the
//! [`ClusterService`](super::ClusterService) applies if the provider allows.

use crate::coord::Point;
use crate::entity::IconInfo;
use crate::error::{OverlayError, Result};

use super::icon::DynamicMarkerRange;
use super::options::{ClusterClickAction, ClusterPatch, ClusterPlacementMode, IconCreationCallback};

/// One changed cluster input.
#[derive(Clone)]
pub enum ClusterChange {
    ClickAction(ClusterClickAction),
    UseDynamicSizeMarkers(bool),
    DynamicMarkerBaseSize(f64),
    DynamicMarkerRanges(DynamicMarkerRange),
    IconCreationCallback(IconCreationCallback),
    IconInfo(IconInfo),
    ZIndex(i32),
    LayerOffset(Point),
    ClusteringEnabled(bool),
    GridSize(f64),
    PlacementMode(ClusterPlacementMode),
    ZoomOnClick(bool),
    Visible(bool),
}

impl ClusterChange {
    /// Input name as exposed to directive consumers.
    pub fn property(&self) -> &'static str {
        match self {
            Self::ClickAction(_) => "ClusterClickAction",
            Self::UseDynamicSizeMarkers(_) => "UseDynamicSizeMarkers",
            Self::DynamicMarkerBaseSize(_) => "DynamicMarkerBaseSize",
            Self::DynamicMarkerRanges(_) => "DynamicMarkerRanges",
            Self::IconCreationCallback(_) => "IconCreationCallback",
            Self::IconInfo(_) => "IconInfo",
            Self::ZIndex(_) => "ZIndex",
            Self::LayerOffset(_) => "LayerOffset",
            Self::ClusteringEnabled(_) => "ClusteringEnabled",
            Self::GridSize(_) => "GridSize",
            Self::PlacementMode(_) => "ClusterPlacementMode",
            Self::ZoomOnClick(_) => "ZoomOnClick",
            Self::Visible(_) => "Visible",
        }
    }
}

impl std::fmt::Debug for ClusterChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClusterChange({})", self.property())
    }
}

/// Build the patch for a batch of changes on an existing cluster layer.
///
/// `dynamic_markers` is whether the layer was created with dynamic size
/// markers. Each input is applied at most once; the last value in the batch
/// wins.
pub fn cluster_patch(changes: &[ClusterChange], dynamic_markers: bool) -> Result<ClusterPatch> {
    let mut patch = ClusterPatch::default();
    for change in changes {
        match change {
            ClusterChange::IconCreationCallback(_) if dynamic_markers => {
                return Err(OverlayError::MutuallyExclusive {
                    property: "IconCreationCallback",
                    conflicts_with: "UseDynamicSizeMarkers",
                });
            }
            ClusterChange::ClickAction(_)
            | ClusterChange::UseDynamicSizeMarkers(_)
            | ClusterChange::DynamicMarkerBaseSize(_)
            | ClusterChange::DynamicMarkerRanges(_)
            | ClusterChange::IconCreationCallback(_)
            | ClusterChange::IconInfo(_)
            | ClusterChange::ZIndex(_)
            | ClusterChange::LayerOffset(_) => {
                return Err(OverlayError::InvalidReconfiguration {
                    property: change.property(),
                });
            }
            ClusterChange::ClusteringEnabled(v) => patch.clustering_enabled = Some(*v),
            ClusterChange::GridSize(v) => patch.grid_size = Some(*v),
            ClusterChange::PlacementMode(v) => patch.placement_mode = Some(*v),
            ClusterChange::ZoomOnClick(v) => patch.zoom_on_click = Some(*v),
            ClusterChange::Visible(v) => patch.visible = Some(*v),
        }
    }
    Ok(patch)
}
