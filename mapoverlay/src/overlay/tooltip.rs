//! The per-overlay tooltip.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::coord::Point;

use super::label::LabelOptions;

/// Snapshot of the tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipState {
    pub hidden: bool,
    pub text: String,
    pub position: Point,
}

impl Default for TooltipState {
    fn default() -> Self {
        Self {
            hidden: true,
            text: String::new(),
            position: Point::default(),
        }
    }
}

/// Sparse tooltip update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TooltipPatch {
    pub hidden: Option<bool>,
    pub text: Option<String>,
    pub position: Option<Point>,
}

impl TooltipPatch {
    pub fn hide() -> Self {
        Self {
            hidden: Some(true),
            ..Self::default()
        }
    }

    pub fn move_to(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn show(text: impl Into<String>, position: Point) -> Self {
        Self {
            hidden: Some(false),
            text: Some(text.into()),
            position: Some(position),
        }
    }
}

/// Shared handle to one tooltip. Clones refer to the same tooltip.
#[derive(Debug, Clone, Default)]
pub struct Tooltip {
    state: Arc<Mutex<TooltipState>>,
    label_style: LabelOptions,
}

impl Tooltip {
    pub fn new(label_style: LabelOptions) -> Self {
        Self {
            state: Arc::default(),
            label_style,
        }
    }

    /// The only way the tooltip changes.
    pub fn set(&self, patch: TooltipPatch) {
        let mut state = self.state.lock();
        if let Some(hidden) = patch.hidden {
            state.hidden = hidden;
        }
        if let Some(text) = patch.text {
            state.text = text;
        }
        if let Some(position) = patch.position {
            state.position = position;
        }
    }

    pub fn state(&self) -> TooltipState {
        self.state.lock().clone()
    }

    pub fn is_visible(&self) -> bool {
        !self.state.lock().hidden
    }

    /// Label style used when a layer sets none of its own.
    pub fn default_label_style(&self) -> &LabelOptions {
        &self.label_style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_hidden() {
        assert!(!Tooltip::default().is_visible());
    }

    #[test]
    fn test_move_keeps_text_and_visibility() {
        let tooltip = Tooltip::default();
        tooltip.set(TooltipPatch::show("Depot", Point::new(1.0, 2.0)));
        tooltip.set(TooltipPatch::move_to(Point::new(5.0, 6.0)));

        let state = tooltip.state();
        assert!(!state.hidden);
        assert_eq!(state.text, "Depot");
        assert_eq!(state.position, Point::new(5.0, 6.0));
    }

    #[test]
    fn test_clones_share_state() {
        let tooltip = Tooltip::default();
        let other = tooltip.clone();
        other.set(TooltipPatch::show("x", Point::default()));
        assert!(tooltip.is_visible());
        tooltip.set(TooltipPatch::hide());
        assert!(!other.is_visible());
    }
}
