//! Coordinate and distance module
//!
//! Provides the geographic coordinate type and great-circle distance
//! calculations used for geofence and range checks.

mod types;

pub use types::{Coordinate, CoordError, EARTH_RADIUS_M, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Great-circle distance between two coordinates in meters.
///
/// Uses the haversine formula on a sphere of radius [`EARTH_RADIUS_M`].
/// The intermediate haversine term is clamped to `[0, 1]` so that
/// floating-point overshoot near antipodal points or the poles cannot push
/// the inverse trig functions out of their domain.
///
/// The result is symmetric, zero for identical inputs, and never negative.
/// Inputs are not validated; NaN in gives NaN out.
///
/// # Example
///
/// ```
/// use geomarker::coord::{distance, Coordinate};
///
/// let a = Coordinate::new(0.0, 0.0);
/// let b = Coordinate::new(0.0, 1.0);
/// let meters = distance(a, b);
/// assert!((meters - 111_195.0).abs() < 1.0);
/// ```
#[inline]
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let sin_d_phi = (d_phi / 2.0).sin();
    let sin_d_lambda = (d_lambda / 2.0).sin();

    let h = sin_d_phi * sin_d_phi + phi1.cos() * phi2.cos() * sin_d_lambda * sin_d_lambda;
    let h = h.clamp(0.0, 1.0);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Convenience wrapper over [`distance`] for raw latitude/longitude pairs.
#[inline]
pub fn distance_between(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    distance(Coordinate::new(lat1, lon1), Coordinate::new(lat2, lon2))
}
