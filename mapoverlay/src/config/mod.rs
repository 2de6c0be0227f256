//! Configuration for overlay components.
//!
//! Two layers of configuration live here:
//!
//! - builder-style config objects ([`ClusterConfig`], [`LabelConfig`]) that
//!   directives are created with;
//! - the INI file ([`ConfigFile`]) with `[cluster]`, `[labels]` and
//!   `[logging]` sections, which converts into the config objects.
//!
//! # Example
//!
//! ```
//! use mapoverlay::config::{ClusterConfig, LabelConfig};
//!
//! let clusters = ClusterConfig::new().with_grid_size(120.0);
//! let labels = LabelConfig::new().with_show_labels(true);
//! assert_eq!(clusters.grid_size(), 120.0);
//! assert!(labels.show_labels());
//! ```

mod cluster;
mod defaults;
mod file;
mod label;
mod parser;
mod settings;
mod writer;

pub use cluster::ClusterConfig;
pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use label::LabelConfig;
pub use settings::{ClusterSettings, ConfigFile, LabelSettings, LoggingSettings};
