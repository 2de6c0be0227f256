//! Entity option records and sparse patches.
//!
//! Options are plain values describing the desired visual state. They are
//! never mutated in place by the core: every change produces a new snapshot,
//! and partial updates travel as patches whose `None` fields mean "leave as is".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::coord::{centroid, LatLong, Point, Size};

/// Free-form key/value data attached to an entity.
pub type Metadata = BTreeMap<String, String>;

/// How a marker's icon is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerTypeId {
    /// Provider default pin
    #[default]
    None,
    /// Image loaded from `IconInfo::url`
    Url,
    /// Vector markup supplied inline
    Markup,
    /// Circle sized by cluster member count
    DynamicCircleMarker,
}

/// Icon description shared by a batch of markers or a cluster glyph.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IconInfo {
    pub marker_type: MarkerTypeId,
    pub url: Option<String>,
    pub size: Option<Size>,
    /// Anchor as a fraction of the icon size, `(0.5, 0.5)` is the center
    pub marker_offset_ratio: Option<Point>,
    /// Offset of the cluster count text from the icon anchor
    pub text_offset: Option<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerOptions {
    pub position: LatLong,
    pub title: Option<String>,
    pub label: Option<String>,
    /// Icon URL or inline markup
    pub icon: Option<String>,
    pub anchor: Option<Point>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub draggable: bool,
    pub visible: bool,
    pub z_index: Option<i32>,
    pub metadata: Metadata,
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self {
            position: LatLong::default(),
            title: None,
            label: None,
            icon: None,
            anchor: None,
            width: None,
            height: None,
            draggable: false,
            visible: true,
            z_index: None,
            metadata: Metadata::new(),
        }
    }
}

impl MarkerOptions {
    pub fn at(position: LatLong) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Overlay the keys present in `patch`.
    pub fn apply(&mut self, patch: &MarkerPatch) {
        if let Some(v) = patch.position {
            self.position = v;
        }
        if let Some(v) = &patch.title {
            self.title = Some(v.clone());
        }
        if let Some(v) = &patch.label {
            self.label = Some(v.clone());
        }
        if let Some(v) = &patch.icon {
            self.icon = Some(v.clone());
        }
        if let Some(v) = patch.anchor {
            self.anchor = Some(v);
        }
        if let Some(v) = patch.width {
            self.width = Some(v);
        }
        if let Some(v) = patch.height {
            self.height = Some(v);
        }
        if let Some(v) = patch.draggable {
            self.draggable = v;
        }
        if let Some(v) = patch.visible {
            self.visible = v;
        }
        if let Some(v) = patch.z_index {
            self.z_index = Some(v);
        }
        if let Some(v) = &patch.metadata {
            self.metadata = v.clone();
        }
    }
}

/// Sparse marker update. Only `Some` fields are sent to the provider.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarkerPatch {
    pub position: Option<LatLong>,
    pub title: Option<String>,
    pub label: Option<String>,
    pub icon: Option<String>,
    pub anchor: Option<Point>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub draggable: Option<bool>,
    pub visible: Option<bool>,
    pub z_index: Option<i32>,
    pub metadata: Option<Metadata>,
}

impl MarkerPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolygonOptions {
    /// Outer ring first, holes after
    pub paths: Vec<Vec<LatLong>>,
    pub title: Option<String>,
    pub fill_color: Option<String>,
    pub fill_opacity: Option<f64>,
    pub stroke_color: Option<String>,
    pub stroke_opacity: Option<f64>,
    pub stroke_weight: Option<f64>,
    pub clickable: bool,
    pub visible: bool,
    pub z_index: Option<i32>,
    pub metadata: Metadata,
}

impl Default for PolygonOptions {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            title: None,
            fill_color: None,
            fill_opacity: None,
            stroke_color: None,
            stroke_opacity: None,
            stroke_weight: None,
            clickable: true,
            visible: true,
            z_index: None,
            metadata: Metadata::new(),
        }
    }
}

impl PolygonOptions {
    pub fn from_ring(ring: Vec<LatLong>) -> Self {
        Self {
            paths: vec![ring],
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Centroid of the outer ring.
    pub fn centroid(&self) -> Option<LatLong> {
        self.paths.first().and_then(|ring| centroid(ring))
    }

    pub fn apply(&mut self, patch: &PolygonPatch) {
        if let Some(v) = &patch.paths {
            self.paths = v.clone();
        }
        if let Some(v) = &patch.title {
            self.title = Some(v.clone());
        }
        if let Some(v) = &patch.fill_color {
            self.fill_color = Some(v.clone());
        }
        if let Some(v) = patch.fill_opacity {
            self.fill_opacity = Some(v);
        }
        if let Some(v) = &patch.stroke_color {
            self.stroke_color = Some(v.clone());
        }
        if let Some(v) = patch.stroke_opacity {
            self.stroke_opacity = Some(v);
        }
        if let Some(v) = patch.stroke_weight {
            self.stroke_weight = Some(v);
        }
        if let Some(v) = patch.clickable {
            self.clickable = v;
        }
        if let Some(v) = patch.visible {
            self.visible = v;
        }
        if let Some(v) = patch.z_index {
            self.z_index = Some(v);
        }
        if let Some(v) = &patch.metadata {
            self.metadata = v.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolygonPatch {
    pub paths: Option<Vec<Vec<LatLong>>>,
    pub title: Option<String>,
    pub fill_color: Option<String>,
    pub fill_opacity: Option<f64>,
    pub stroke_color: Option<String>,
    pub stroke_opacity: Option<f64>,
    pub stroke_weight: Option<f64>,
    pub clickable: Option<bool>,
    pub visible: Option<bool>,
    pub z_index: Option<i32>,
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolylineOptions {
    pub path: Vec<LatLong>,
    pub title: Option<String>,
    pub stroke_color: Option<String>,
    pub stroke_opacity: Option<f64>,
    pub stroke_weight: Option<f64>,
    pub visible: bool,
    pub z_index: Option<i32>,
    pub metadata: Metadata,
}

impl Default for PolylineOptions {
    fn default() -> Self {
        Self {
            path: Vec::new(),
            title: None,
            stroke_color: None,
            stroke_opacity: None,
            stroke_weight: None,
            visible: true,
            z_index: None,
            metadata: Metadata::new(),
        }
    }
}

impl PolylineOptions {
    pub fn apply(&mut self, patch: &PolylinePatch) {
        if let Some(v) = &patch.path {
            self.path = v.clone();
        }
        if let Some(v) = &patch.title {
            self.title = Some(v.clone());
        }
        if let Some(v) = &patch.stroke_color {
            self.stroke_color = Some(v.clone());
        }
        if let Some(v) = patch.stroke_opacity {
            self.stroke_opacity = Some(v);
        }
        if let Some(v) = patch.stroke_weight {
            self.stroke_weight = Some(v);
        }
        if let Some(v) = patch.visible {
            self.visible = v;
        }
        if let Some(v) = patch.z_index {
            self.z_index = Some(v);
        }
        if let Some(v) = &patch.metadata {
            self.metadata = v.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolylinePatch {
    pub path: Option<Vec<LatLong>>,
    pub title: Option<String>,
    pub stroke_color: Option<String>,
    pub stroke_opacity: Option<f64>,
    pub stroke_weight: Option<f64>,
    pub visible: Option<bool>,
    pub z_index: Option<i32>,
    pub metadata: Option<Metadata>,
}
