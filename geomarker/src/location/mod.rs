//! Device location state.
//!
//! The device position is either unknown or a known fix. Position sources
//! deliver [`PositionFix`] samples on success and [`PositionError`] values on
//! failure; an error never changes the stored location.
//!
//! # Design
//!
//! - "Unknown" is an explicit variant, so a fix on the equator (latitude 0.0)
//!   or the prime meridian is an ordinary valid position
//! - Altitude is optional and informational only; distance checks are 2D
//! - Each accepted fix fully replaces the previous one (no smoothing)

use std::fmt;

use thiserror::Error;

use crate::coord::{CoordError, Coordinate};

/// A single position sample from the geolocation source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Altitude in meters, when the source provides one.
    pub altitude: Option<f64>,
}

impl PositionFix {
    /// Create a fix without altitude.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
        }
    }

    /// Create a fix with altitude.
    pub fn with_altitude(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: Some(altitude),
        }
    }

    /// The 2D coordinate of this fix.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Check that latitude and longitude are usable.
    pub fn validate(&self) -> Result<(), CoordError> {
        self.coordinate().validate()
    }
}

impl fmt::Display for PositionFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)?;
        if let Some(altitude) = self.altitude {
            write!(f, " | alt {:.1}m", altitude)?;
        }
        Ok(())
    }
}

/// Current device location as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DeviceLocation {
    /// No valid fix has been received yet.
    #[default]
    Unknown,
    /// Last accepted fix.
    Known(PositionFix),
}

impl DeviceLocation {
    /// Returns true if no fix has been accepted.
    pub fn is_unknown(&self) -> bool {
        matches!(self, DeviceLocation::Unknown)
    }

    /// The current fix, if known.
    pub fn fix(&self) -> Option<&PositionFix> {
        match self {
            DeviceLocation::Unknown => None,
            DeviceLocation::Known(fix) => Some(fix),
        }
    }

    /// The current 2D coordinate, if known.
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.fix().map(PositionFix::coordinate)
    }
}

/// Classification of geolocation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionErrorKind {
    /// The user or platform denied location access.
    PermissionDenied,
    /// The position could not be determined.
    Unavailable,
    /// No position arrived within the source's timeout.
    Timeout,
}

impl PositionErrorKind {
    /// Parse a kind from its snake_case name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "permission_denied" | "permission-denied" | "denied" => {
                Some(PositionErrorKind::PermissionDenied)
            }
            "unavailable" | "position_unavailable" => Some(PositionErrorKind::Unavailable),
            "timeout" => Some(PositionErrorKind::Timeout),
            _ => None,
        }
    }
}

impl fmt::Display for PositionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionErrorKind::PermissionDenied => write!(f, "permission denied"),
            PositionErrorKind::Unavailable => write!(f, "position unavailable"),
            PositionErrorKind::Timeout => write!(f, "timeout"),
        }
    }
}

/// An error delivered on the geolocation error channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct PositionError {
    pub kind: PositionErrorKind,
    pub message: String,
}

impl PositionError {
    /// Create a new position error.
    pub fn new(kind: PositionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
