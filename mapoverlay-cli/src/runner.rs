//! CLI runner for common setup.
//!
//! Loads the config file and initializes logging once per command.

use std::path::Path;

use mapoverlay::config::{config_file_path, ConfigFile};
use mapoverlay::logging::{init_logging, LoggingGuard};
use tracing::info;

use crate::error::CliError;

/// Runner that owns the loaded configuration and keeps logging alive.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
}

impl CliRunner {
    /// Load `config_path` (or `~/.mapoverlay/config.ini`) and initialize
    /// logging from its `[logging]` section.
    pub fn new(config_path: Option<&Path>) -> Result<Self, CliError> {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(config_file_path);
        let config = ConfigFile::load_from(&path)?;

        let logging_guard =
            init_logging(&config.logging).map_err(|e| CliError::LoggingInit(e.to_string()))?;
        info!(config = %path.display(), "MapOverlay {}", mapoverlay::VERSION);

        Ok(Self {
            logging_guard,
            config,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }
}
