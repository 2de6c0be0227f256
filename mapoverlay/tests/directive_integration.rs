//! Integration tests for directives on the in-memory adapter.
//!
//! These tests verify:
//! - Replace vs stream update semantics
//! - Reconfiguration guards on cluster layers
//! - Entity creation order
//! - Teardown while creation is still in flight
//! - Events re-exposed as directive outputs

use std::sync::Arc;

use mapoverlay::cluster::{ClusterChange, ClusterClickAction};
use mapoverlay::config::ClusterConfig;
use mapoverlay::coord::{LatLong, Size};
use mapoverlay::directive::{
    LayerDirective, MarkerChange, MarkerDirective, MarkerLayerChange, MarkerLayerConfig,
    MarkerLayerDirective,
};
use mapoverlay::entity::MarkerOptions;
use mapoverlay::error::OverlayError;
use mapoverlay::map::memory::MemoryMap;
use mapoverlay::provider::memory::MemoryProvider;
use mapoverlay::provider::{
    ClusterLayerHandle, EntityHandle, EventKind, LayerHandle, MapEvent, MarkerHandle,
};
use mapoverlay::service::OverlayContext;

// =============================================================================
// Test Helpers
// =============================================================================

type Context = Arc<OverlayContext<MemoryProvider, MemoryMap>>;

fn context(provider: MemoryProvider) -> (Context, Arc<MemoryProvider>) {
    let provider = Arc::new(provider);
    let map = MemoryMap::new(LatLong::new(47.6, -122.3), 12.0, Size::new(800.0, 600.0));
    (OverlayContext::new(Arc::clone(&provider), Arc::new(map)), provider)
}

fn pins(titles: &[&str]) -> Vec<MarkerOptions> {
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            MarkerOptions::at(LatLong::new(47.6 + i as f64 * 0.01, -122.3)).with_title(*title)
        })
        .collect()
}

async fn apply(layer: &Arc<MarkerLayerDirective<MemoryProvider, MemoryMap>>, options: Vec<MarkerOptions>) {
    layer
        .on_changes(vec![MarkerLayerChange::MarkerOptions(options)])
        .unwrap()
        .await
        .unwrap();
}

// =============================================================================
// Update semantics
// =============================================================================

#[tokio::test]
async fn test_same_array_twice_doubles_when_streaming() {
    let (ctx, _) = context(MemoryProvider::loaded());
    let layer = MarkerLayerDirective::new(
        &ctx,
        MarkerLayerConfig {
            treat_marker_options_as_stream: true,
            ..MarkerLayerConfig::default()
        },
    );
    layer.attach().await.unwrap();

    let batch = pins(&["a", "b", "c"]);
    apply(&layer, batch.clone()).await;
    apply(&layer, batch).await;

    assert_eq!(layer.marker_options().len(), 6);
    assert_eq!(layer.markers().len(), 6);
}

#[tokio::test]
async fn test_latest_array_wins_when_replacing() {
    let (ctx, _) = context(MemoryProvider::loaded());
    let layer = MarkerLayerDirective::new(&ctx, MarkerLayerConfig::default());
    layer.attach().await.unwrap();

    apply(&layer, pins(&["a", "b", "c"])).await;
    apply(&layer, pins(&["d", "e"])).await;

    let titles: Vec<Option<String>> = layer.markers().iter().map(|m| m.options().title).collect();
    assert_eq!(titles, vec![Some("d".to_string()), Some("e".to_string())]);
    let native = ctx.layers().get_native_layer(layer.layer().id).await.unwrap();
    assert_eq!(native.entities().len(), 2);
}

#[tokio::test]
async fn test_switching_to_stream_keeps_existing_markers() {
    let (ctx, _) = context(MemoryProvider::loaded());
    let layer = MarkerLayerDirective::new(&ctx, MarkerLayerConfig::default());
    layer.attach().await.unwrap();
    apply(&layer, pins(&["a", "b"])).await;

    layer
        .on_changes(vec![
            MarkerLayerChange::TreatMarkerOptionsAsStream(true),
            MarkerLayerChange::MarkerOptions(pins(&["c"])),
        ])
        .unwrap()
        .await
        .unwrap();

    assert!(layer.is_streaming());
    assert_eq!(layer.markers().len(), 3);
}

// =============================================================================
// Reconfiguration guard
// =============================================================================

#[tokio::test]
async fn test_click_action_is_fixed_after_creation() {
    let (ctx, _) = context(MemoryProvider::loaded().with_reconfigurable_clusters(true));
    let layer = MarkerLayerDirective::new(
        &ctx,
        MarkerLayerConfig {
            enable_clustering: true,
            ..MarkerLayerConfig::default()
        },
    );
    layer.attach().await.unwrap();

    let err = layer
        .on_changes(vec![MarkerLayerChange::Cluster(ClusterChange::ClickAction(
            ClusterClickAction::None,
        ))])
        .err()
        .unwrap();
    assert_eq!(
        err,
        OverlayError::InvalidReconfiguration {
            property: "ClusterClickAction"
        }
    );
}

#[tokio::test]
async fn test_grid_size_reaches_reconfigurable_provider() {
    let (ctx, _) = context(MemoryProvider::loaded().with_reconfigurable_clusters(true));
    let layer = MarkerLayerDirective::new(
        &ctx,
        MarkerLayerConfig {
            enable_clustering: true,
            cluster: ClusterConfig::new().with_grid_size(150.0),
            ..MarkerLayerConfig::default()
        },
    );
    layer.attach().await.unwrap();

    layer
        .on_changes(vec![MarkerLayerChange::Cluster(ClusterChange::GridSize(80.0))])
        .unwrap()
        .await
        .unwrap();

    let native = ctx.clusters().get_native_layer(layer.layer().id).await.unwrap();
    assert_eq!(native.cluster_options().grid_size, 80.0);
}

#[tokio::test]
async fn test_grid_size_fails_fast_without_capability() {
    let (ctx, _) = context(MemoryProvider::loaded());
    let layer = MarkerLayerDirective::new(
        &ctx,
        MarkerLayerConfig {
            enable_clustering: true,
            ..MarkerLayerConfig::default()
        },
    );

    let err = layer
        .on_changes(vec![MarkerLayerChange::Cluster(ClusterChange::GridSize(80.0))])
        .err()
        .unwrap();
    assert!(matches!(
        err,
        OverlayError::ReconfigurationUnsupported {
            property: "gridSize",
            ..
        }
    ));
}

// =============================================================================
// Ordering
// =============================================================================

#[tokio::test]
async fn test_batch_creation_preserves_order() {
    let (ctx, _) = context(MemoryProvider::loaded());
    let markers = ctx
        .markers()
        .create_markers(pins(&["a", "b", "c"]), None)
        .await
        .unwrap();

    let titles: Vec<String> = markers
        .iter()
        .filter_map(|m| m.options().title)
        .collect();
    assert_eq!(titles, vec!["a", "b", "c"]);
}

// =============================================================================
// Teardown race
// =============================================================================

#[tokio::test]
async fn test_marker_deleted_during_creation_never_appears() {
    let (ctx, provider) = context(MemoryProvider::new());
    let host = LayerDirective::new(&ctx, |options| options);
    let directive = MarkerDirective::new(
        &ctx,
        host.host(),
        MarkerOptions::at(LatLong::new(47.6, -122.3)),
        None,
    );

    let pending = {
        let directive = Arc::clone(&directive);
        tokio::spawn(async move { directive.attach().await })
    };
    // Creation is parked on the provider's readiness gate until loaded.
    while !directive.is_creating() {
        tokio::task::yield_now().await;
    }
    directive.delete();
    provider.mark_loaded();
    pending.await.unwrap().unwrap();

    assert!(directive.marker().is_none());
    let native = ctx.layers().get_native_layer(host.host().id).await.unwrap();
    assert!(native.entities().is_empty());
}

#[tokio::test]
async fn test_deleted_layer_rejects_further_changes() {
    let (ctx, _) = context(MemoryProvider::loaded());
    let layer = MarkerLayerDirective::new(&ctx, MarkerLayerConfig::default());
    layer.attach().await.unwrap();
    apply(&layer, pins(&["a"])).await;
    let marker = layer.markers().remove(0);

    layer.delete().await.unwrap();

    assert!(marker.is_deleted());
    assert_eq!(
        layer
            .on_changes(vec![MarkerLayerChange::Visible(false)])
            .err()
            .unwrap(),
        OverlayError::DirectiveDisposed
    );
}

// =============================================================================
// Outputs
// =============================================================================

#[tokio::test]
async fn test_layer_click_is_reexposed() {
    let (ctx, _) = context(MemoryProvider::loaded());
    let layer = MarkerLayerDirective::new(&ctx, MarkerLayerConfig::default());
    layer.attach().await.unwrap();
    apply(&layer, pins(&["a", "b"])).await;
    let mut clicks = layer.subscribe(EventKind::Click).unwrap();

    let second = layer.markers().remove(1);
    second.fire(MapEvent::new(EventKind::Click));

    let event = clicks.recv().await.unwrap();
    assert_eq!(event.entity.entity_id(), second.entity_id());
    assert_eq!(event.location, Some(second.location()));
}

#[tokio::test]
async fn test_marker_directive_sends_sparse_updates() {
    let (ctx, _) = context(MemoryProvider::loaded());
    let host = LayerDirective::new(&ctx, |options| options);
    let directive = MarkerDirective::new(
        &ctx,
        host.host(),
        MarkerOptions::at(LatLong::new(47.6, -122.3)).with_title("Depot"),
        None,
    );
    directive.attach().await.unwrap();

    directive
        .on_changes(&[MarkerChange::Position(LatLong::new(47.7, -122.4))])
        .unwrap();

    let marker = directive.marker().unwrap();
    assert_eq!(marker.location(), LatLong::new(47.7, -122.4));
    assert_eq!(marker.options().title.as_deref(), Some("Depot"));
}
