//! Layer-level options.

use crate::coord::Point;

use super::id::LayerId;

/// Options a layer is created with.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerOptions {
    pub id: LayerId,
    pub visible: bool,
    pub z_index: Option<i32>,
    /// Pixel offset applied to every entity of the layer
    pub layer_offset: Option<Point>,
}

impl LayerOptions {
    pub fn new(id: LayerId) -> Self {
        Self {
            id,
            visible: true,
            z_index: None,
            layer_offset: None,
        }
    }

    pub fn apply(&mut self, patch: &LayerPatch) {
        if let Some(v) = patch.visible {
            self.visible = v;
        }
        if let Some(v) = patch.z_index {
            self.z_index = Some(v);
        }
    }
}

/// Sparse layer update.
///
/// Offset has no patch key; it is fixed once the layer exists.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayerPatch {
    pub visible: Option<bool>,
    pub z_index: Option<i32>,
}
