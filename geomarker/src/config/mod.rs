//! Marker and visibility configuration.
//!
//! The configuration file is a JSON document with a `markers` array and a
//! `settings` object, with camelCase field names:
//!
//! ```json
//! {
//!   "markers": [
//!     { "id": "text-marker-1", "type": "text", "text": "Welcome",
//!       "latitude": 52.2845823, "longitude": 5.518673, "geofenceRadius": 50 }
//!   ],
//!   "settings": { "minDistance": 0, "maxDistance": 200, "updateInterval": 1000, "debug": true }
//! }
//! ```
//!
//! Loading is lenient: a malformed marker is dropped or flagged, and a
//! missing or invalid setting takes its documented default. Only an
//! unreadable file or invalid JSON is an error.

mod settings;

pub use settings::{
    RawSettings, VisibilitySettings, DEFAULT_MAX_DISTANCE_M, DEFAULT_MIN_DISTANCE_M,
    DEFAULT_UPDATE_INTERVAL_MS,
};

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::marker::MarkerDefinition;

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "geomarker";

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "markers.json";

/// Default configuration file path (`<config_dir>/geomarker/markers.json`).
///
/// Returns `None` on platforms without a config directory.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document is not valid JSON.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Loaded configuration: the marker set plus global settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    /// Marker definitions in file order, with unusable entries removed.
    pub markers: Vec<MarkerDefinition>,

    /// Normalized visibility settings.
    pub settings: VisibilitySettings,
}

impl ConfigFile {
    /// Create a configuration from already-built parts.
    pub fn new(markers: Vec<MarkerDefinition>, settings: VisibilitySettings) -> Self {
        Self { markers, settings }
    }

    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_json_str(&contents)?;

        tracing::info!(
            path = %path.display(),
            markers = config.markers.len(),
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(contents: &str) -> ConfigResult<Self> {
        let document: Value = serde_json::from_str(contents)?;
        Ok(Self::from_value(&document))
    }

    /// Whether the file at `path` sets `settings.debug` to true.
    ///
    /// Reads nothing else and logs nothing, so it can run before the logger
    /// is installed. An unreadable or malformed file gives `false`.
    pub fn debug_requested(path: &Path) -> bool {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|contents| serde_json::from_str::<Value>(&contents).ok())
            .and_then(|document| document.pointer("/settings/debug").and_then(Value::as_bool))
            .unwrap_or(false)
    }

    /// Set the settings, replacing the loaded ones.
    pub fn with_settings(mut self, settings: VisibilitySettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build configuration from an already-parsed JSON document.
    ///
    /// Anything of the wrong shape is logged and replaced by its default:
    /// a non-object document, a `markers` value that is not an array, or a
    /// `settings` value that is not an object.
    pub fn from_value(document: &Value) -> Self {
        let Some(root) = document.as_object() else {
            tracing::warn!(document = %document, "Configuration is not an object, using defaults");
            return Self::default();
        };

        let entries: &[Value] = match root.get("markers") {
            Some(Value::Array(entries)) => entries,
            None => &[],
            Some(other) => {
                tracing::warn!(markers = %other, "Markers is not an array, loading no markers");
                &[]
            }
        };

        let mut seen = HashSet::new();
        let mut markers = Vec::with_capacity(entries.len());

        for (index, value) in entries.iter().enumerate() {
            let marker = match MarkerDefinition::from_json(value) {
                Ok(marker) => marker,
                Err(e) => {
                    tracing::warn!(index = index, error = %e, "Skipping malformed marker");
                    continue;
                }
            };

            if !seen.insert(marker.id.clone()) {
                tracing::warn!(marker = %marker.id, "Duplicate marker id, keeping the first");
                continue;
            }

            if let Err(e) = marker.position.validate() {
                tracing::warn!(
                    marker = %marker.id,
                    error = %e,
                    "Marker has no valid position and will never be shown"
                );
            }

            markers.push(marker);
        }

        let raw_settings = root
            .get("settings")
            .map(RawSettings::from_json)
            .unwrap_or_default();

        Self {
            markers,
            settings: VisibilitySettings::from_raw(&raw_settings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::MarkerType;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "markers": [
            { "id": "text-marker-1", "type": "text", "text": "Welcome",
              "latitude": 52.2845823, "longitude": 5.518673, "geofenceRadius": 50 },
            { "id": "model-marker-1", "type": "gltf", "src": "model.gltf",
              "latitude": 52.2847, "longitude": 5.5188, "geofenceRadius": 100 },
            { "id": "audio-marker-1", "type": "audio", "src": "audio.ogg",
              "latitude": 52.2849, "longitude": 5.519, "geofenceRadius": 30 }
        ],
        "settings": { "minDistance": 0, "maxDistance": 200, "updateInterval": 1000, "debug": true }
    }"#;

    #[test]
    fn test_parse_sample_config() {
        let config = ConfigFile::from_json_str(SAMPLE).unwrap();

        assert_eq!(config.markers.len(), 3);
        assert_eq!(config.markers[1].kind.marker_type(), MarkerType::Model);
        assert_eq!(config.markers[1].geofence_radius_m, 100.0);
        assert_eq!(config.markers[2].kind.marker_type(), MarkerType::Audio);
        assert!(config.settings.debug);
        assert_eq!(config.settings.max_distance_m, 200.0);
    }

    #[test]
    fn test_missing_settings_use_defaults() {
        let config = ConfigFile::from_json_str(r#"{ "markers": [] }"#).unwrap();
        assert!(config.markers.is_empty());
        assert_eq!(config.settings, VisibilitySettings::default());

        let config = ConfigFile::from_json_str("{}").unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_malformed_markers_skipped() {
        let json = r#"{
            "markers": [
                "not an object",
                { "latitude": 1.0, "longitude": 2.0 },
                { "id": "good", "latitude": 1.0, "longitude": 2.0 }
            ]
        }"#;
        let config = ConfigFile::from_json_str(json).unwrap();
        assert_eq!(config.markers.len(), 1);
        assert_eq!(config.markers[0].id, "good");
    }

    #[test]
    fn test_marker_without_position_kept_for_evaluation() {
        let json = r#"{ "markers": [ { "id": "nowhere" } ] }"#;
        let config = ConfigFile::from_json_str(json).unwrap();
        assert_eq!(config.markers.len(), 1);
        assert!(!config.markers[0].position.is_valid());
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let json = r#"{
            "markers": [
                { "id": "dup", "latitude": 1.0, "longitude": 2.0 },
                { "id": "dup", "latitude": 3.0, "longitude": 4.0 }
            ]
        }"#;
        let config = ConfigFile::from_json_str(json).unwrap();
        assert_eq!(config.markers.len(), 1);
        assert_eq!(config.markers[0].position.latitude, 1.0);
    }

    #[test]
    fn test_wrong_setting_types_use_defaults() {
        let json = r#"{
            "markers": [ { "id": "a", "latitude": 1.0, "longitude": 2.0 } ],
            "settings": { "maxDistance": "300", "debug": "yes" }
        }"#;
        let config = ConfigFile::from_json_str(json).unwrap();
        assert_eq!(config.markers.len(), 1);
        assert_eq!(config.settings, VisibilitySettings::default());
    }

    #[test]
    fn test_null_sections_are_empty() {
        let config = ConfigFile::from_json_str(r#"{ "markers": null, "settings": null }"#).unwrap();
        assert_eq!(config, ConfigFile::default());

        let config =
            ConfigFile::from_json_str(r#"{ "markers": { "id": "a" }, "settings": [] }"#).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_non_object_document_uses_defaults() {
        assert_eq!(ConfigFile::from_json_str("[1, 2]").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_invalid_json_is_error() {
        let err = ConfigFile::from_json_str("{ markers: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("invalid configuration"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = ConfigFile::load(file.path()).unwrap();
        assert_eq!(config.markers.len(), 3);
    }

    #[test]
    fn test_debug_requested() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        assert!(ConfigFile::debug_requested(file.path()));

        let mut plain = tempfile::NamedTempFile::new().unwrap();
        plain.write_all(br#"{ "settings": { "debug": "yes" } }"#).unwrap();
        assert!(!ConfigFile::debug_requested(plain.path()));

        let dir = tempfile::tempdir().unwrap();
        assert!(!ConfigFile::debug_requested(&dir.path().join("missing.json")));
    }

    #[test]
    fn test_config_file_path_name() {
        if let Some(path) = config_file_path() {
            assert!(path.ends_with("geomarker/markers.json"));
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let err = ConfigFile::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFailed { .. }));
        assert!(err.to_string().contains("missing.json"));
    }
}
