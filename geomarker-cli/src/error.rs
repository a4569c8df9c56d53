//! CLI error types.

use geomarker::config::ConfigError;
use geomarker::coord::CoordError;
use geomarker::logging::LoggingError;
use geomarker::service::ServiceError;
use geomarker::source::TrackError;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("no --config given and no user config directory is available")]
    NoConfigPath,

    #[error("{0}")]
    Track(#[from] TrackError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("invalid coordinate: {0}")]
    Coordinate(#[from] CoordError),

    #[error("{0}")]
    Logging(#[from] LoggingError),

    #[error("failed to create Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("failed to set signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::NoConfigPath => 2,
            CliError::Track(_) => 3,
            CliError::Coordinate(_) => 4,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::NoConfigPath.exit_code(), 2);
        assert_eq!(
            CliError::Coordinate(CoordError::InvalidLatitude(91.0)).exit_code(),
            4
        );
        assert_eq!(
            CliError::Runtime(std::io::Error::new(std::io::ErrorKind::Other, "x")).exit_code(),
            1
        );
    }

    #[test]
    fn test_coordinate_error_display() {
        let err = CliError::from(CoordError::InvalidLongitude(200.0));
        assert!(err.to_string().starts_with("invalid coordinate:"));
    }
}
