//! Dynamic cluster icons.
//!
//! Cluster glyphs grow logarithmically with the number of members and take
//! their color from a threshold table, so a 10-marker cluster and a
//! 10,000-marker cluster are distinguishable at a glance without the latter
//! covering half the map.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::coord::{Point, Size};
use crate::entity::{IconInfo, MarkerTypeId};

/// Color used when no threshold covers the member count.
pub const FALLBACK_COLOR: &str = "rgba(20, 180, 20, 0.5)";

/// Default base radius of a dynamic marker in pixels.
pub const DEFAULT_BASE_SIZE: f64 = 12.0;

/// Smallest base radius a glyph is drawn with.
pub const MIN_BASE_SIZE: f64 = 1.0;

/// Vertical distance, in pixels, between the icon center and the baseline of
/// the member-count text.
const TEXT_BASELINE_OFFSET: f64 = 8.0;

/// Largest count representable without precision loss in the map SDKs.
pub const MAX_SAFE_COUNT: u64 = (1 << 53) - 1;

/// Mapping from inclusive upper member-count bound to fill color.
///
/// Lookups walk the thresholds in ascending order and take the first one that
/// is greater than or equal to the count.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicMarkerRange {
    thresholds: BTreeMap<u64, String>,
}

impl DynamicMarkerRange {
    /// Empty table; every lookup yields [`FALLBACK_COLOR`] until thresholds
    /// are added.
    pub fn empty() -> Self {
        Self {
            thresholds: BTreeMap::new(),
        }
    }

    /// Add or replace the color for counts up to and including `threshold`.
    pub fn with_threshold(mut self, threshold: u64, color: impl Into<String>) -> Self {
        self.thresholds.insert(threshold, color.into());
        self
    }

    /// Color for counts above every other threshold.
    pub fn with_unbounded(self, color: impl Into<String>) -> Self {
        self.with_threshold(MAX_SAFE_COUNT, color)
    }

    pub fn color_for(&self, member_count: u64) -> &str {
        self.thresholds
            .range(member_count..)
            .next()
            .map(|(_, color)| color.as_str())
            .unwrap_or(FALLBACK_COLOR)
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> {
        self.thresholds.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl Default for DynamicMarkerRange {
    fn default() -> Self {
        Self::empty()
            .with_threshold(10, "rgba(20, 180, 20, 0.5)")
            .with_threshold(100, "rgba(255, 210, 40, 0.5)")
            .with_unbounded("rgba(255, 40, 40, 0.5)")
    }
}

/// Build the SVG glyph for a cluster of `member_count` markers.
///
/// Fills in `icon_info.size`, `icon_info.marker_offset_ratio` (center anchor)
/// and `icon_info.text_offset` (vertically centered count text). A count of
/// zero is treated as one. `base_size` is raised to [`MIN_BASE_SIZE`] so the
/// outer circle always encloses the inner one.
pub fn create_dynamic_size_marker(
    member_count: u64,
    icon_info: &mut IconInfo,
    base_size: f64,
    ranges: &DynamicMarkerRange,
) -> String {
    let count = member_count.max(1);
    let base_size = base_size.max(MIN_BASE_SIZE);
    let outline = base_size * 0.35;
    let radius = (count as f64).log10() * 5.0 + base_size;
    let diameter = radius * 2.0;
    let color = ranges.color_for(count);

    let mut svg = String::with_capacity(256);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{d}" height="{d}">"#,
        d = diameter
    );
    let _ = write!(
        svg,
        r#"<circle cx="{r}" cy="{r}" r="{r}" fill="{color}"/>"#,
        r = radius,
        color = color
    );
    let _ = write!(
        svg,
        r#"<circle cx="{r}" cy="{r}" r="{inner}" fill="{color}"/>"#,
        r = radius,
        inner = radius - outline,
        color = color
    );
    svg.push_str("</svg>");

    icon_info.marker_type = MarkerTypeId::DynamicCircleMarker;
    icon_info.size = Some(Size::new(diameter, diameter));
    icon_info.marker_offset_ratio = Some(Point::new(0.5, 0.5));
    icon_info.text_offset = Some(Point::new(0.0, radius - TEXT_BASELINE_OFFSET));

    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle_radii(svg: &str) -> Vec<f64> {
        svg.split("<circle")
            .skip(1)
            .filter_map(|c| {
                let start = c.find(" r=\"")? + 4;
                let end = start + c[start..].find('"')?;
                c[start..end].parse().ok()
            })
            .collect()
    }

    #[test]
    fn test_two_concentric_circles_outer_larger() {
        for count in [1, 2, 9, 10, 11, 99, 1_000, 1_000_000] {
            let mut info = IconInfo::default();
            let svg = create_dynamic_size_marker(count, &mut info, 12.0, &DynamicMarkerRange::default());
            let radii = circle_radii(&svg);
            assert_eq!(radii.len(), 2, "count {}: {}", count, svg);
            assert!(radii[0] > radii[1], "count {}: outer must exceed inner", count);

            let size = info.size.unwrap();
            assert_eq!(size.width, size.height);
            assert!((size.width - 2.0 * radii[0]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_degenerate_base_size_is_clamped() {
        let ranges = DynamicMarkerRange::default();
        let mut expected = IconInfo::default();
        let clamped = create_dynamic_size_marker(5, &mut expected, MIN_BASE_SIZE, &ranges);
        for base_size in [0.0, -5.0, f64::NAN] {
            let mut info = IconInfo::default();
            let svg = create_dynamic_size_marker(5, &mut info, base_size, &ranges);
            let radii = circle_radii(&svg);
            assert!(radii[0] > radii[1] && radii[1] > 0.0, "base {}: {}", base_size, svg);
            assert_eq!(svg, clamped);
            assert_eq!(info.size, expected.size);
        }
    }

    #[test]
    fn test_singleton_cluster_uses_base_size() {
        let mut info = IconInfo::default();
        create_dynamic_size_marker(1, &mut info, 12.0, &DynamicMarkerRange::default());
        assert_eq!(info.size, Some(Size::new(24.0, 24.0)));
        assert_eq!(info.text_offset, Some(Point::new(0.0, 4.0)));
        assert_eq!(info.marker_offset_ratio, Some(Point::new(0.5, 0.5)));
        assert_eq!(info.marker_type, MarkerTypeId::DynamicCircleMarker);
    }

    #[test]
    fn test_radius_grows_logarithmically() {
        let mut info = IconInfo::default();
        create_dynamic_size_marker(100, &mut info, 12.0, &DynamicMarkerRange::default());
        // log10(100) * 5 + 12 = 22
        assert_eq!(info.size, Some(Size::new(44.0, 44.0)));
    }

    #[test]
    fn test_zero_count_is_treated_as_one() {
        let mut zero = IconInfo::default();
        let mut one = IconInfo::default();
        let ranges = DynamicMarkerRange::default();
        let a = create_dynamic_size_marker(0, &mut zero, 12.0, &ranges);
        let b = create_dynamic_size_marker(1, &mut one, 12.0, &ranges);
        assert_eq!(a, b);
        assert!(zero.size.unwrap().width.is_finite());
    }

    #[test]
    fn test_color_selection_by_smallest_covering_threshold() {
        let ranges = DynamicMarkerRange::empty()
            .with_threshold(10, "green")
            .with_threshold(100, "yellow")
            .with_unbounded("red");
        assert_eq!(ranges.color_for(5), "green");
        assert_eq!(ranges.color_for(10), "green");
        assert_eq!(ranges.color_for(50), "yellow");
        assert_eq!(ranges.color_for(1_000_000), "red");
    }

    #[test]
    fn test_fallback_color_when_no_threshold_covers() {
        let ranges = DynamicMarkerRange::empty().with_threshold(10, "green");
        assert_eq!(ranges.color_for(11), FALLBACK_COLOR);
        assert_eq!(DynamicMarkerRange::empty().color_for(1), FALLBACK_COLOR);
    }

    #[test]
    fn test_default_range_covers_unbounded() {
        let ranges = DynamicMarkerRange::default();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges.iter().last().map(|(k, _)| k), Some(MAX_SAFE_COUNT));
    }

    #[test]
    fn test_markup_uses_range_color() {
        let ranges = DynamicMarkerRange::empty().with_unbounded("blue");
        let svg = create_dynamic_size_marker(3, &mut IconInfo::default(), 10.0, &ranges);
        assert_eq!(svg.matches(r#"fill="blue""#).count(), 2);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
    }
}
