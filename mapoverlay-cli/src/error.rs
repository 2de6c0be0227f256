//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use mapoverlay::config::ConfigFileError;
use mapoverlay::error::OverlayError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be loaded
    Config(ConfigFileError),
    /// Argument outside its accepted range
    InvalidArgument(String),
    /// Scene file could not be read
    SceneRead { path: PathBuf, error: std::io::Error },
    /// Scene file is not valid scene JSON
    SceneParse {
        path: PathBuf,
        error: serde_json::Error,
    },
    /// Async runtime could not be started
    Runtime(std::io::Error),
    /// Overlay operation failed
    Overlay(OverlayError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::SceneParse { .. } = self {
            eprintln!();
            eprintln!("A scene file looks like:");
            eprintln!(r#"  {{ "markers": [{{ "position": {{ "latitude": 47.6, "longitude": -122.3 }}, "title": "Pier" }}],"#);
            eprintln!(r#"    "polygons": [{{ "paths": [[...]], "title": "Park" }}] }}"#);
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::SceneRead { path, error } => {
                write!(f, "Failed to read scene '{}': {}", path.display(), error)
            }
            CliError::SceneParse { path, error } => {
                write!(f, "Failed to parse scene '{}': {}", path.display(), error)
            }
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Overlay(e) => write!(f, "Overlay error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::SceneRead { error, .. } => Some(error),
            CliError::SceneParse { error, .. } => Some(error),
            CliError::Runtime(e) => Some(e),
            CliError::Overlay(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<OverlayError> for CliError {
    fn from(e: OverlayError) -> Self {
        CliError::Overlay(e)
    }
}
