//! JSON scene files.

use std::path::Path;

use mapoverlay::entity::{MarkerOptions, PolygonOptions};
use serde::Deserialize;

use crate::error::CliError;

/// Markers and polygons to render.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub markers: Vec<MarkerOptions>,
    pub polygons: Vec<PolygonOptions>,
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|error| CliError::SceneRead {
            path: path.to_path_buf(),
            error,
        })?;
        Self::parse(&text).map_err(|error| CliError::SceneParse {
            path: path.to_path_buf(),
            error,
        })
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
