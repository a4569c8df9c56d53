//! Service error types.

use thiserror::Error;

use crate::source::SourceError;

/// Errors that stop the geofence service from running.
///
/// A missing geolocation capability is not an error; it is reported through
/// the engine status and the run returns normally.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Subscribing to the position source failed.
    #[error("failed to subscribe to position source: {0}")]
    Subscribe(#[from] SourceError),
}
