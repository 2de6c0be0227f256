//! INI serialization: `ConfigFile` to the commented text written to disk.

use super::settings::ConfigFile;

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Convert a `ConfigFile` to a commented INI string.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let cluster = &config.cluster;
    let labels = &config.labels;
    let log_file = config
        .logging
        .file
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    format!(
        r#"[cluster]
; Edge length of a clustering cell in pixels
grid_size = {grid_size}
; Where the cluster glyph sits: mean_value, first_pin or none (cell center)
placement_mode = {placement_mode}
; What clicking a cluster does: zoom_into_cluster or none
click_action = {click_action}
; Smallest number of markers shown as a cluster
minimum_cluster_size = {minimum_cluster_size}
enabled = {enabled}
; Size cluster icons by member count (replaces any custom icon callback)
dynamic_markers = {dynamic_markers}
dynamic_marker_base_size = {base_size}

[labels]
show_labels = {show_labels}
show_tooltips = {show_tooltips}
; Zoom range in which labels are drawn, both ends inclusive
min_zoom = {min_zoom}
max_zoom = {max_zoom}
; Label style; empty values use the built-in style (11px sans-serif, white, black outline)
font_size = {font_size}
font_family = {font_family}
font_color = {font_color}
stroke_color = {stroke_color}
stroke_weight = {stroke_weight}

[logging]
; Used when RUST_LOG is not set
level = {level}
; Optional log file
file = {log_file}
"#,
        grid_size = cluster.grid_size,
        placement_mode = cluster.placement_mode,
        click_action = cluster.click_action,
        minimum_cluster_size = cluster.minimum_cluster_size,
        enabled = flag(cluster.clustering_enabled),
        dynamic_markers = flag(cluster.use_dynamic_size_markers),
        base_size = cluster.dynamic_marker_base_size,
        show_labels = flag(labels.show_labels),
        show_tooltips = flag(labels.show_tooltips),
        min_zoom = labels.min_zoom,
        max_zoom = labels.max_zoom,
        font_size = opt(&labels.font_size),
        font_family = opt(&labels.font_family),
        font_color = opt(&labels.font_color),
        stroke_color = opt(&labels.stroke_color),
        stroke_weight = opt(&labels.stroke_weight),
        level = config.logging.level,
        log_file = log_file,
    )
}
