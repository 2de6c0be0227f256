//! Integration tests for the canvas overlay.
//!
//! These tests verify:
//! - Viewport culling of labels
//! - Tooltip subscription lifecycle
//! - Label redraws following the map view

use std::sync::Arc;

use mapoverlay::config::LabelConfig;
use mapoverlay::coord::{from_world_pixel, to_world_pixel, LatLong, Point, Size};
use mapoverlay::layer::{LayerIdGenerator, LayerKind, LayerOptions};
use mapoverlay::map::memory::MemoryMap;
use mapoverlay::overlay::{
    render_labels, CanvasOverlay, LabelEntry, LabelOptions, RecordingCanvas, TooltipState,
};
use mapoverlay::provider::memory::{MemoryLayer, MemoryProvider};
use mapoverlay::entity::MarkerOptions;
use mapoverlay::provider::{EventKind, LayerEntity, LayerHandle, MapEvent, MapProvider};

// =============================================================================
// Test Helpers
// =============================================================================

const ZOOM: f64 = 4.0;

fn viewport() -> Size {
    Size::new(300.0, 300.0)
}

fn map() -> Arc<MemoryMap> {
    Arc::new(MemoryMap::new(LatLong::new(0.0, 0.0), ZOOM, viewport()))
}

/// Location that the map above projects to `pixel`.
fn location_at(pixel: Point) -> LatLong {
    let center = to_world_pixel(LatLong::new(0.0, 0.0), ZOOM);
    let half = viewport();
    from_world_pixel(
        Point::new(
            center.x + pixel.x - half.width / 2.0,
            center.y + pixel.y - half.height / 2.0,
        ),
        ZOOM,
    )
}

fn label(title: &str, location: LatLong) -> LabelEntry {
    LabelEntry {
        location,
        title: title.to_string(),
    }
}

async fn native_layer() -> MemoryLayer {
    let id = LayerIdGenerator::new().next(LayerKind::Polygon);
    MemoryProvider::loaded()
        .create_layer(LayerOptions::new(id))
        .await
        .unwrap()
}

// =============================================================================
// Culling
// =============================================================================

#[test]
fn test_render_culls_points_outside_viewport() {
    let mut canvas = RecordingCanvas::new();
    let labels = vec![
        label("outside", LatLong::new(0.0, 0.0)),
        label("inside", LatLong::new(0.0, 0.0)),
    ];
    let points = vec![Point::new(-5.0, 10.0), Point::new(150.0, 150.0)];

    let drawn = render_labels(
        &mut canvas,
        &labels,
        &points,
        viewport(),
        &LabelOptions::default().resolve(),
    );

    assert_eq!(drawn, 1);
    let texts = canvas.filled_texts();
    assert_eq!(texts, vec![("inside".to_string(), 150.0, 150.0)]);
}

#[tokio::test]
async fn test_overlay_culls_projected_labels() {
    let map = map();
    let overlay = CanvasOverlay::new(
        Arc::clone(&map),
        LabelConfig::new().with_show_labels(true),
        LabelOptions::default(),
    );
    overlay.set_labels(vec![
        label("outside", location_at(Point::new(-5.0, 10.0))),
        label("inside", LatLong::new(0.0, 0.0)),
    ]);
    overlay.attach().await.unwrap();

    assert_eq!(overlay.draw_labels().await.unwrap(), 1);
    let canvas = map.recordings().pop().expect("overlay canvas");
    let texts = canvas.filled_texts();
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].0, "inside");
    assert!((texts[0].1 - 150.0).abs() < 1e-6);
    assert!((texts[0].2 - 150.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_labels_follow_map_view() {
    let map = map();
    let overlay = CanvasOverlay::new(
        Arc::clone(&map),
        LabelConfig::new().with_show_labels(true),
        LabelOptions::default(),
    );
    overlay.set_labels(vec![label("edge", location_at(Point::new(-5.0, 10.0)))]);
    overlay.attach().await.unwrap();
    let canvas = map.recordings().pop().unwrap();
    assert!(canvas.filled_texts().is_empty());

    // Recentering on the label brings it into view.
    map.set_view(location_at(Point::new(-5.0, 10.0)), ZOOM).await;
    let texts = canvas.filled_texts();
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].0, "edge");
}

// =============================================================================
// Tooltip
// =============================================================================

#[tokio::test]
async fn test_tooltip_subscriptions_follow_toggle() {
    let map = map();
    let layer = native_layer().await;
    let overlay = CanvasOverlay::new(Arc::clone(&map), LabelConfig::new(), LabelOptions::default());
    overlay.attach().await.unwrap();

    overlay.manage_tooltip(true, &*map, &layer).unwrap();
    assert_eq!(overlay.subscription_count(), 3);

    overlay.manage_tooltip(false, &*map, &layer).unwrap();
    assert_eq!(overlay.subscription_count(), 0);
    assert!(!overlay.tooltip().is_visible());
    assert_eq!(map.listener_count(), 0);
}

#[tokio::test]
async fn test_tooltip_shows_hovered_marker_title() {
    let map = map();
    let provider = MemoryProvider::loaded();
    let layer = provider
        .create_layer(LayerOptions::new(LayerIdGenerator::new().next(LayerKind::Marker)))
        .await
        .unwrap();
    let marker = provider
        .create_markers(vec![MarkerOptions::at(LatLong::new(0.0, 0.0)).with_title("Harbor")], None)
        .await
        .unwrap()
        .remove(0);
    layer.set_entities(vec![LayerEntity::Marker(marker.clone())]);

    let overlay = CanvasOverlay::new(Arc::clone(&map), LabelConfig::new(), LabelOptions::default());
    overlay.attach().await.unwrap();
    overlay.manage_tooltip(true, &*map, &layer).unwrap();

    marker.fire(MapEvent::new(EventKind::MouseOver).with_pixels(Point::new(20.0, 30.0)));
    assert_eq!(
        overlay.tooltip().state(),
        TooltipState {
            hidden: false,
            text: "Harbor".to_string(),
            position: Point::new(20.0, 30.0),
        }
    );

    map.fire(MapEvent::new(EventKind::MouseMove).with_pixels(Point::new(25.0, 35.0)));
    assert_eq!(overlay.tooltip().state().position, Point::new(25.0, 35.0));

    marker.fire(MapEvent::new(EventKind::MouseOut));
    assert!(!overlay.tooltip().is_visible());
}
