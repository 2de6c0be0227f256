//! Label and tooltip inputs shared by the marker and polygon layer
//! directives.

use crate::config::LabelConfig;
use crate::overlay::LabelOptions;

#[derive(Debug, Clone, PartialEq)]
pub enum LabelChange {
    ShowLabels(bool),
    ShowTooltips(bool),
    LabelMinZoom(f64),
    LabelMaxZoom(f64),
    LabelOptions(LabelOptions),
}

impl LabelChange {
    pub fn property(&self) -> &'static str {
        match self {
            Self::ShowLabels(_) => "ShowLabels",
            Self::ShowTooltips(_) => "ShowTooltips",
            Self::LabelMinZoom(_) => "LabelMinZoom",
            Self::LabelMaxZoom(_) => "LabelMaxZoom",
            Self::LabelOptions(_) => "LabelOptions",
        }
    }
}

/// Fold a batch of label changes into `config`.
///
/// Returns the new config and, if the tooltip flag actually changed, its new
/// value.
pub(crate) fn apply_label_changes(
    config: &LabelConfig,
    changes: &[LabelChange],
) -> (LabelConfig, Option<bool>) {
    let before = config.show_tooltips();
    let mut config = config.clone();
    for change in changes {
        config = match change {
            LabelChange::ShowLabels(v) => config.with_show_labels(*v),
            LabelChange::ShowTooltips(v) => config.with_show_tooltips(*v),
            LabelChange::LabelMinZoom(v) => config.with_min_zoom(*v),
            LabelChange::LabelMaxZoom(v) => config.with_max_zoom(*v),
            LabelChange::LabelOptions(v) => config.with_label_options(v.clone()),
        };
    }
    let tooltips = (config.show_tooltips() != before).then_some(config.show_tooltips());
    (config, tooltips)
}
