//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use geomarker::config::{config_file_path, ConfigFile};
use geomarker::coord::Coordinate;

use crate::error::CliError;

/// Resolve the configuration path: CLI argument, then the user config directory.
pub fn resolve_config_path(cli_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    cli_path
        .or_else(config_file_path)
        .ok_or(CliError::NoConfigPath)
}

/// Resolve and load the configuration file.
pub fn load_config(cli_path: Option<PathBuf>) -> Result<(PathBuf, ConfigFile), CliError> {
    let path = resolve_config_path(cli_path)?;
    let config = ConfigFile::load(&path)?;
    Ok((path, config))
}

/// Whether the resolved configuration file enables debug reporting.
pub fn config_requests_debug(cli_path: Option<PathBuf>) -> bool {
    resolve_config_path(cli_path).is_ok_and(|path| ConfigFile::debug_requested(&path))
}

/// Format a distance for display, switching to kilometers above 1 km.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.1} m", meters)
    } else {
        format!("{:.2} km", meters / 1000.0)
    }
}

/// Format a coordinate, or a marker for missing values.
pub fn format_position(position: &Coordinate) -> String {
    if position.is_valid() {
        position.to_string()
    } else {
        "(no valid position)".to_string()
    }
}
