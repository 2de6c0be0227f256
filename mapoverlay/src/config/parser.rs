//! INI parsing: the single place where INI key names map to settings fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays the values present.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [cluster] section
    if let Some(section) = ini.section(Some("cluster")) {
        let s = "cluster";
        if let Some(v) = parse_value::<f64>(section, s, "grid_size", "must be a number of pixels")? {
            if v <= 0.0 {
                return Err(invalid(s, "grid_size", &v.to_string(), "must be greater than 0"));
            }
            config.cluster.grid_size = v;
        }
        if let Some(v) = section.get("placement_mode") {
            config.cluster.placement_mode = v
                .trim()
                .parse()
                .map_err(|reason: String| invalid(s, "placement_mode", v, &reason))?;
        }
        if let Some(v) = section.get("click_action") {
            config.cluster.click_action = v
                .trim()
                .parse()
                .map_err(|reason: String| invalid(s, "click_action", v, &reason))?;
        }
        if let Some(v) =
            parse_value::<usize>(section, s, "minimum_cluster_size", "must be a positive integer")?
        {
            if v == 0 {
                return Err(invalid(s, "minimum_cluster_size", "0", "must be at least 1"));
            }
            config.cluster.minimum_cluster_size = v;
        }
        if let Some(v) = section.get("enabled") {
            config.cluster.clustering_enabled = parse_bool(v);
        }
        if let Some(v) = section.get("dynamic_markers") {
            config.cluster.use_dynamic_size_markers = parse_bool(v);
        }
        if let Some(v) = parse_value::<f64>(
            section,
            s,
            "dynamic_marker_base_size",
            "must be a number of pixels",
        )? {
            config.cluster.dynamic_marker_base_size = v;
        }
    }

    // [labels] section
    if let Some(section) = ini.section(Some("labels")) {
        let s = "labels";
        if let Some(v) = section.get("show_labels") {
            config.labels.show_labels = parse_bool(v);
        }
        if let Some(v) = section.get("show_tooltips") {
            config.labels.show_tooltips = parse_bool(v);
        }
        if let Some(v) = parse_value::<f64>(section, s, "min_zoom", "must be a number")? {
            config.labels.min_zoom = v;
        }
        if let Some(v) = parse_value::<f64>(section, s, "max_zoom", "must be a number")? {
            config.labels.max_zoom = v;
        }
        if config.labels.min_zoom > config.labels.max_zoom {
            return Err(invalid(
                s,
                "min_zoom",
                &config.labels.min_zoom.to_string(),
                "must not exceed max_zoom",
            ));
        }
        if let Some(v) = parse_value::<f64>(section, s, "font_size", "must be a number of pixels")? {
            config.labels.font_size = Some(v);
        }
        config.labels.font_family = non_empty(section, "font_family");
        config.labels.font_color = non_empty(section, "font_color");
        config.labels.stroke_color = non_empty(section, "stroke_color");
        if let Some(v) =
            parse_value::<f64>(section, s, "stroke_weight", "must be a number of pixels")?
        {
            config.labels.stroke_weight = Some(v);
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "level") {
            config.logging.level = v;
        }
        config.logging.file = non_empty(section, "file").map(|v| expand_tilde(&v));
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse `key` if present and non-empty.
fn parse_value<T: FromStr>(
    section: &Properties,
    name: &str,
    key: &str,
    reason: &str,
) -> Result<Option<T>, ConfigFileError> {
    match section.get(key).map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| invalid(name, key, v, reason)),
    }
}

fn non_empty(section: &Properties, key: &str) -> Option<String> {
    section
        .get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse a boolean value from a config string.
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to the home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{ClusterClickAction, ClusterPlacementMode};

    fn parse(text: &str) -> Result<ConfigFile, ConfigFileError> {
        parse_ini(&Ini::load_from_str(text).unwrap())
    }

    #[test]
    fn test_empty_ini_yields_defaults() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_cluster_section() {
        let config = parse(
            "[cluster]\n\
             grid_size = 100\n\
             placement_mode = first_pin\n\
             click_action = none\n\
             minimum_cluster_size = 5\n\
             dynamic_markers = true\n\
             dynamic_marker_base_size = 16\n",
        )
        .unwrap();

        assert_eq!(config.cluster.grid_size, 100.0);
        assert_eq!(config.cluster.placement_mode, ClusterPlacementMode::FirstPin);
        assert_eq!(config.cluster.click_action, ClusterClickAction::None);
        assert_eq!(config.cluster.minimum_cluster_size, 5);
        assert!(config.cluster.use_dynamic_size_markers);
        assert_eq!(config.cluster.dynamic_marker_base_size, 16.0);
    }

    #[test]
    fn test_invalid_grid_size() {
        let err = parse("[cluster]\ngrid_size = wide\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue { section, key, .. } => {
                assert_eq!(section, "cluster");
                assert_eq!(key, "grid_size");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(parse("[cluster]\ngrid_size = 0\n").is_err());
    }

    #[test]
    fn test_invalid_placement_mode() {
        assert!(matches!(
            parse("[cluster]\nplacement_mode = random\n"),
            Err(ConfigFileError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_labels_section() {
        let config = parse(
            "[labels]\n\
             show_labels = on\n\
             show_tooltips = no\n\
             min_zoom = 4\n\
             max_zoom = 18\n\
             font_size = 13\n\
             font_family =\n\
             stroke_weight = 0\n",
        )
        .unwrap();

        assert!(config.labels.show_labels);
        assert!(!config.labels.show_tooltips);
        assert_eq!(config.labels.min_zoom, 4.0);
        assert_eq!(config.labels.max_zoom, 18.0);
        assert_eq!(config.labels.font_size, Some(13.0));
        assert_eq!(config.labels.font_family, None);
        assert_eq!(config.labels.stroke_weight, Some(0.0));
    }

    #[test]
    fn test_inverted_zoom_range_is_rejected() {
        assert!(parse("[labels]\nmin_zoom = 10\nmax_zoom = 2\n").is_err());
    }

    #[test]
    fn test_logging_section() {
        let config = parse("[logging]\nlevel = mapoverlay=debug\nfile = /tmp/overlay.log\n").unwrap();
        assert_eq!(config.logging.level, "mapoverlay=debug");
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/overlay.log")));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE"));
        assert!(parse_bool(" yes "));
        assert!(parse_bool("1"));
        assert!(!parse_bool("off"));
        assert!(!parse_bool(""));
    }
}
