//! MapOverlay CLI - Command-line interface
//!
//! This binary drives the mapoverlay library against its in-memory reference
//! adapter: it prints dynamic cluster icons and renders JSON scenes into
//! clusters and label draw calls.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::icon::IconArgs;
use commands::render::RenderArgs;

#[derive(Parser)]
#[command(name = "mapoverlay")]
#[command(version = mapoverlay::VERSION)]
#[command(about = "Marker, cluster and label overlays for slippy maps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dynamic cluster icon for a member count
    Icon(IconArgs),
    /// Render a JSON scene of markers and polygons
    Render(RenderArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Icon(args) => commands::icon::run(args),
        Commands::Render(args) => commands::render::run(args),
    };

    if let Err(e) = result {
        e.exit();
    }
}
