//! Core coordinate types.

use std::fmt;

use thiserror::Error;

/// Mean Earth radius in meters used for great-circle distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;

/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;

/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;

/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// A geographic position in WGS84 degrees.
///
/// Coordinates are plain values and are not validated on construction.
/// Marker data comes from external configuration, so a coordinate may hold
/// NaN or out-of-range values; call [`Coordinate::validate`] before trusting it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in degrees (-90.0 to 90.0)
    pub latitude: f64,
    /// Longitude in degrees (-180.0 to 180.0)
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both components are finite and within range.
    pub fn validate(&self) -> Result<(), CoordError> {
        if !self.latitude.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&self.latitude) {
            return Err(CoordError::InvalidLatitude(self.latitude));
        }
        if !self.longitude.is_finite() || !(MIN_LON..=MAX_LON).contains(&self.longitude) {
            return Err(CoordError::InvalidLongitude(self.longitude));
        }
        Ok(())
    }

    /// Returns true if [`Coordinate::validate`] succeeds.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Errors for invalid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordError {
    /// Latitude is NaN, infinite, or outside -90..=90.
    #[error("invalid latitude: {0}")]
    InvalidLatitude(f64),

    /// Longitude is NaN, infinite, or outside -180..=180.
    #[error("invalid longitude: {0}")]
    InvalidLongitude(f64),
}
