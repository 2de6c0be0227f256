//! `icon` command: print the dynamic cluster icon for a member count.

use clap::Args;
use mapoverlay::cluster::{create_dynamic_size_marker, DynamicMarkerRange, DEFAULT_BASE_SIZE};
use mapoverlay::entity::IconInfo;

use crate::error::CliError;

#[derive(Debug, Args)]
pub struct IconArgs {
    /// Number of markers in the cluster
    #[arg(long)]
    count: u64,

    /// Base radius of the icon in pixels
    #[arg(long, default_value_t = DEFAULT_BASE_SIZE)]
    base_size: f64,
}

pub fn run(args: IconArgs) -> Result<(), CliError> {
    if !(args.base_size.is_finite() && args.base_size > 0.0) {
        return Err(CliError::InvalidArgument(format!(
            "--base-size must be a positive number, got {}",
            args.base_size
        )));
    }

    let mut info = IconInfo::default();
    let svg = create_dynamic_size_marker(
        args.count,
        &mut info,
        args.base_size,
        &DynamicMarkerRange::default(),
    );

    println!("{}", svg);
    println!();
    println!("  Type:   {:?}", info.marker_type);
    if let Some(size) = info.size {
        println!("  Size:   {} x {}", size.width, size.height);
    }
    if let Some(ratio) = info.marker_offset_ratio {
        println!("  Anchor: ({}, {})", ratio.x, ratio.y);
    }
    if let Some(offset) = info.text_offset {
        println!("  Text:   ({}, {})", offset.x, offset.y);
    }
    Ok(())
}
