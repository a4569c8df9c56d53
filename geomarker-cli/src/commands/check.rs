//! Check command - validate a configuration and list its markers.

use std::path::PathBuf;

use geomarker::config::{ConfigFile, VisibilitySettings};
use geomarker::marker::MarkerDefinition;

use super::common::{format_distance, format_position, load_config};
use crate::error::CliError;

/// Arguments for the check command.
pub struct CheckArgs {
    pub config: Option<PathBuf>,
}

/// Run the check command.
pub fn run(args: CheckArgs) -> Result<(), CliError> {
    let (path, config) = load_config(args.config)?;

    println!("Configuration: {}", path.display());
    println!();
    print!("{}", settings_report(&config.settings));
    println!();
    print!("{}", markers_report(&config));

    Ok(())
}

fn settings_report(settings: &VisibilitySettings) -> String {
    format!(
        "Settings:\n  Distance range:  {} - {}\n  Update interval: {} ms\n  Debug:           {}\n",
        format_distance(settings.min_distance_m),
        format_distance(settings.max_distance_m),
        settings.update_interval_ms,
        if settings.debug { "on" } else { "off" },
    )
}

fn markers_report(config: &ConfigFile) -> String {
    let mut out = format!("Markers ({}):\n", config.markers.len());
    let mut invalid = 0;

    for marker in &config.markers {
        if !marker.position.is_valid() {
            invalid += 1;
        }
        out.push_str(&marker_line(marker));
        out.push('\n');
    }

    if invalid > 0 {
        out.push_str(&format!(
            "\n{} marker(s) have no valid position and will never be shown\n",
            invalid
        ));
    }
    out
}

fn marker_line(marker: &MarkerDefinition) -> String {
    format!(
        "  {:<24} {:<6} {:<24} radius {}",
        marker.id,
        marker.kind.marker_type().name(),
        format_position(&marker.position),
        format_distance(marker.geofence_radius_m),
    )
}
