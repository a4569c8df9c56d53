//! Visibility settings.
//!
//! Global gates applied to every marker on top of its own geofence, plus
//! the periodic evaluation interval.

use std::time::Duration;

use serde_json::{Map, Value};

// ==================== Visibility Defaults ====================

/// Default minimum distance in meters to show a marker.
pub const DEFAULT_MIN_DISTANCE_M: f64 = 0.0;

/// Default maximum distance in meters to show a marker.
pub const DEFAULT_MAX_DISTANCE_M: f64 = 200.0;

/// Default interval between periodic evaluations in milliseconds.
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 1000;

/// Global visibility settings.
///
/// Loaded once before the engine starts and immutable afterwards.
/// Invariants when built through [`VisibilitySettings::from_raw`]:
/// `0 <= min_distance_m < max_distance_m` and `update_interval_ms > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilitySettings {
    /// Markers closer than this are hidden.
    ///
    /// Default: 0 m.
    pub min_distance_m: f64,

    /// Markers farther than this are hidden, whatever their geofence.
    ///
    /// Default: 200 m.
    pub max_distance_m: f64,

    /// Interval between periodic evaluations.
    ///
    /// Default: 1000 ms.
    pub update_interval_ms: u64,

    /// Report per-marker distances and gate results on each evaluation.
    pub debug: bool,
}

impl Default for VisibilitySettings {
    fn default() -> Self {
        Self {
            min_distance_m: DEFAULT_MIN_DISTANCE_M,
            max_distance_m: DEFAULT_MAX_DISTANCE_M,
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            debug: false,
        }
    }
}

impl VisibilitySettings {
    /// Create settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the global distance range.
    pub fn with_range(mut self, min_distance_m: f64, max_distance_m: f64) -> Self {
        self.min_distance_m = min_distance_m;
        self.max_distance_m = max_distance_m;
        self
    }

    /// Set the periodic evaluation interval.
    pub fn with_update_interval_ms(mut self, interval_ms: u64) -> Self {
        self.update_interval_ms = interval_ms;
        self
    }

    /// Enable or disable debug reporting.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Get the update interval as a Duration.
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    /// Whether a distance passes the global range gate (inclusive).
    #[inline]
    pub fn in_range(&self, distance_m: f64) -> bool {
        distance_m >= self.min_distance_m && distance_m <= self.max_distance_m
    }

    /// Build settings from raw configuration values.
    ///
    /// Missing fields take their defaults. Present but invalid values are
    /// replaced by defaults with a warning. If the default maximum does not
    /// exceed a valid configured minimum, both range fields are reset.
    pub fn from_raw(raw: &RawSettings) -> Self {
        let mut min_distance_m = match raw.min_distance {
            Some(min) if min.is_finite() && min >= 0.0 => min,
            Some(min) => {
                tracing::warn!(
                    min_distance = min,
                    default = DEFAULT_MIN_DISTANCE_M,
                    "Invalid minDistance, using default"
                );
                DEFAULT_MIN_DISTANCE_M
            }
            None => DEFAULT_MIN_DISTANCE_M,
        };

        let mut max_distance_m = match raw.max_distance {
            Some(max) if max.is_finite() && max > min_distance_m => max,
            Some(max) => {
                tracing::warn!(
                    max_distance = max,
                    min_distance = min_distance_m,
                    default = DEFAULT_MAX_DISTANCE_M,
                    "maxDistance must exceed minDistance, using default"
                );
                DEFAULT_MAX_DISTANCE_M
            }
            None => DEFAULT_MAX_DISTANCE_M,
        };

        if max_distance_m <= min_distance_m {
            tracing::warn!(
                min_distance = min_distance_m,
                max_distance = max_distance_m,
                "Distance range is empty, resetting both bounds to defaults"
            );
            min_distance_m = DEFAULT_MIN_DISTANCE_M;
            max_distance_m = DEFAULT_MAX_DISTANCE_M;
        }

        let update_interval_ms = match raw.update_interval {
            Some(interval) if interval.is_finite() && interval >= 1.0 => interval.round() as u64,
            Some(interval) => {
                tracing::warn!(
                    update_interval = interval,
                    default = DEFAULT_UPDATE_INTERVAL_MS,
                    "Invalid updateInterval, using default"
                );
                DEFAULT_UPDATE_INTERVAL_MS
            }
            None => DEFAULT_UPDATE_INTERVAL_MS,
        };

        Self {
            min_distance_m,
            max_distance_m,
            update_interval_ms,
            debug: raw.debug.unwrap_or(false),
        }
    }
}

/// Settings exactly as written in the configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSettings {
    pub min_distance: Option<f64>,
    pub max_distance: Option<f64>,
    pub update_interval: Option<f64>,
    pub debug: Option<bool>,
}

impl RawSettings {
    /// Read the `settings` section of a configuration document.
    ///
    /// `null` or a missing field counts as absent. A field of the wrong JSON
    /// type is logged and also counts as absent, as does a section that is
    /// not an object.
    pub fn from_json(value: &Value) -> Self {
        let object = match value {
            Value::Object(object) => object,
            Value::Null => return Self::default(),
            other => {
                tracing::warn!(settings = %other, "Settings is not an object, using defaults");
                return Self::default();
            }
        };

        Self {
            min_distance: number_field(object, "minDistance"),
            max_distance: number_field(object, "maxDistance"),
            update_interval: number_field(object, "updateInterval")
                .or_else(|| number_field(object, "updateIntervalMs")),
            debug: bool_field(object, "debug"),
        }
    }
}

fn present<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|value| !value.is_null())
}

fn number_field(object: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = present(object, key)?;
    let number = value.as_f64();
    if number.is_none() {
        tracing::warn!(field = key, value = %value, "Setting is not a number, using default");
    }
    number
}

fn bool_field(object: &Map<String, Value>, key: &str) -> Option<bool> {
    let value = present(object, key)?;
    let flag = value.as_bool();
    if flag.is_none() {
        tracing::warn!(field = key, value = %value, "Setting is not a boolean, using default");
    }
    flag
}
