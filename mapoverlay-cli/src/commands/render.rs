//! `render` command: build overlays for a JSON scene and print the result.
//!
//! Markers go into a clustered marker layer, polygons into a labelled
//! polygon layer, both on the in-memory adapter. The command prints the
//! clusters at the requested zoom and every label drawn on the canvas.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use mapoverlay::config::ConfigFile;
use mapoverlay::coord::{mean_location, LatLong, Size};
use mapoverlay::directive::{
    MarkerLayerChange, MarkerLayerConfig, MarkerLayerDirective, PolygonLayerChange,
    PolygonLayerConfig, PolygonLayerDirective,
};
use mapoverlay::map::memory::MemoryMap;
use mapoverlay::provider::memory::MemoryProvider;
use mapoverlay::service::OverlayContext;
use tracing::debug;

use super::scene::Scene;
use crate::error::CliError;
use crate::runner::CliRunner;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Scene file with `markers` and `polygons` arrays
    #[arg(long)]
    scene: PathBuf,

    /// Config file (default: ~/.mapoverlay/config.ini)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Map zoom level
    #[arg(long, default_value_t = 12.0)]
    zoom: f64,

    /// Map center latitude (default: mean of the scene's markers)
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Map center longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1024.0)]
    width: f64,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 768.0)]
    height: f64,

    /// Feed the markers one at a time as a stream instead of one batch
    #[arg(long)]
    stream: bool,
}

pub fn run(args: RenderArgs) -> Result<(), CliError> {
    if !(args.width > 0.0 && args.height > 0.0) {
        return Err(CliError::InvalidArgument(format!(
            "viewport must have a positive size, got {} x {}",
            args.width, args.height
        )));
    }

    let runner = CliRunner::new(args.config.as_deref())?;
    let scene = Scene::load(&args.scene)?;

    let runtime = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;
    runtime.block_on(render(&args, runner.config(), scene))
}

async fn render(args: &RenderArgs, config: &ConfigFile, scene: Scene) -> Result<(), CliError> {
    let center = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => LatLong::new(lat, lon),
        _ => {
            let positions: Vec<LatLong> = scene.markers.iter().map(|m| m.position).collect();
            mean_location(&positions).unwrap_or_default()
        }
    };
    debug!(lat = center.latitude, lon = center.longitude, zoom = args.zoom, "Map view");

    let map = Arc::new(MemoryMap::new(center, args.zoom, Size::new(args.width, args.height)));
    let provider = Arc::new(MemoryProvider::loaded().with_reconfigurable_clusters(true));
    let ctx = OverlayContext::new(provider, Arc::clone(&map));
    let labels = config.label_config();

    let markers = MarkerLayerDirective::new(
        &ctx,
        MarkerLayerConfig {
            enable_clustering: true,
            cluster: config.cluster_config(),
            labels: labels.clone(),
            treat_marker_options_as_stream: args.stream,
            ..MarkerLayerConfig::default()
        },
    );
    markers.attach().await?;
    if args.stream {
        for pin in scene.markers {
            markers
                .on_changes(vec![MarkerLayerChange::MarkerOptions(vec![pin])])?
                .await?;
        }
    } else {
        markers
            .on_changes(vec![MarkerLayerChange::MarkerOptions(scene.markers)])?
            .await?;
    }

    let polygons = PolygonLayerDirective::new(
        &ctx,
        PolygonLayerConfig {
            labels: labels.with_show_labels(true),
            ..PolygonLayerConfig::default()
        },
    );
    polygons.attach().await?;
    polygons
        .on_changes(vec![PolygonLayerChange::PolygonOptions(scene.polygons)])?
        .await?;

    let clusters = markers.clusters().await?;
    println!("Clusters at zoom {} ({} markers):", args.zoom, markers.markers().len());
    for cluster in &clusters {
        println!(
            "  {:>5} at {:.5}, {:.5}{}",
            cluster.member_count(),
            cluster.location.latitude,
            cluster.location.longitude,
            if cluster.icon.is_some() { " [icon]" } else { "" }
        );
    }

    println!();
    println!("Labels:");
    for canvas in map.recordings() {
        for (text, x, y) in canvas.filled_texts() {
            println!("  {:<24} ({:.1}, {:.1})", text, x, y);
        }
    }

    markers.delete().await?;
    polygons.delete().await?;
    Ok(())
}
