//! Configuration file loading and saving.
//!
//! Settings structs live in [`super::settings`], constants in
//! [`super::defaults`], parsing in [`super::parser`] and serialization in
//! [`super::writer`].

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use super::cluster::ClusterConfig;
use super::label::LabelConfig;
use super::settings::ConfigFile;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(#[source] std::io::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigFile {
    /// Load configuration from `path`.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Parse configuration from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigFileError::ReadError(ini::Error::Parse(e)))?;
        super::parser::parse_ini(&ini)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::WriteError)?;
        }
        std::fs::write(path, super::writer::to_config_string(self))
            .map_err(ConfigFileError::WriteError)
    }

    pub fn cluster_config(&self) -> ClusterConfig {
        ClusterConfig::from(&self.cluster)
    }

    pub fn label_config(&self) -> LabelConfig {
        LabelConfig::from(&self.labels)
    }
}

/// Directory holding the user configuration (`~/.mapoverlay`).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".mapoverlay"))
        .unwrap_or_else(|| PathBuf::from(".mapoverlay"))
}

/// Path of the user config file (`~/.mapoverlay/config.ini`).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterPlacementMode;

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = ConfigFile::load_from(&temp_dir.path().join("missing.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("overlay.ini");

        let mut config = ConfigFile::default();
        config.cluster.grid_size = 90.0;
        config.cluster.placement_mode = ClusterPlacementMode::FirstPin;
        config.labels.show_labels = true;
        config.labels.max_zoom = 14.0;
        config.labels.font_color = Some("yellow".to_string());
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_typed_configs_follow_file() {
        let config = ConfigFile::from_ini_str("[cluster]\ngrid_size = 64\n[labels]\nshow_labels = yes\n")
            .unwrap();
        assert_eq!(config.cluster_config().grid_size(), 64.0);
        assert!(config.label_config().show_labels());
    }
}
