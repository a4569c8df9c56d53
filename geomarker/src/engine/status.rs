//! Engine status types for UI and monitoring.
//!
//! This module contains [`EngineStatus`], the lifecycle state surfaced to the
//! status collaborator, and [`EngineSnapshot`], a point-in-time copy of the
//! engine's observable state for display and structured logging.

use std::fmt;

use crate::location::{DeviceLocation, PositionError};

/// Lifecycle status of the visibility engine.
///
/// The normal progression is
/// `Initializing → AwaitingFix → LoadingMarkers → Ready`. There is no
/// separate "scene loaded" step: the renderer is only handed markers on the
/// first fix, so setup completion and subscribing are both `AwaitingFix`.
/// The two error states can be entered from any point and are left again
/// when a valid fix arrives (position errors only).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EngineStatus {
    /// Engine constructed, no position subscription yet.
    #[default]
    Initializing,

    /// Subscribed to the position source, waiting for the first fix.
    AwaitingFix,

    /// First fix received, markers being handed to the renderer.
    LoadingMarkers,

    /// Markers materialized and being evaluated.
    Ready,

    /// The position source reported an error.
    PositionError(PositionError),

    /// No position source is available on this platform.
    GeolocationUnsupported,
}

/// Coarse status category, for choosing how to display a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Loading,
    Ready,
    Error,
}

impl EngineStatus {
    /// Short machine-friendly label.
    pub fn label(&self) -> &'static str {
        match self {
            EngineStatus::Initializing => "initializing",
            EngineStatus::AwaitingFix => "awaiting-fix",
            EngineStatus::LoadingMarkers => "loading-markers",
            EngineStatus::Ready => "ready",
            EngineStatus::PositionError(_) => "position-error",
            EngineStatus::GeolocationUnsupported => "geolocation-unsupported",
        }
    }

    /// Human-readable text for status displays.
    pub fn description(&self) -> String {
        match self {
            EngineStatus::Initializing => "Initializing...".to_string(),
            EngineStatus::AwaitingFix => "Getting GPS...".to_string(),
            EngineStatus::LoadingMarkers => "Loading markers...".to_string(),
            EngineStatus::Ready => "Ready".to_string(),
            EngineStatus::PositionError(e) => format!("GPS error: {}", e.message),
            EngineStatus::GeolocationUnsupported => "Geolocation not supported".to_string(),
        }
    }

    /// Display category.
    pub fn level(&self) -> StatusLevel {
        match self {
            EngineStatus::Ready => StatusLevel::Ready,
            EngineStatus::PositionError(_) | EngineStatus::GeolocationUnsupported => {
                StatusLevel::Error
            }
            _ => StatusLevel::Loading,
        }
    }

    /// Returns true for the error states.
    pub fn is_error(&self) -> bool {
        self.level() == StatusLevel::Error
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineStatus::PositionError(e) => write!(f, "{} ({})", self.label(), e),
            _ => f.write_str(self.label()),
        }
    }
}

/// Point-in-time copy of the engine's observable state.
///
/// All fields are public for easy access by UI components:
/// - `status` - Current lifecycle status
/// - `location` - Last accepted device location
/// - `marker_count` - Markers handed to the renderer (0 before first fix)
/// - `visible_count` - Markers visible after the last evaluation
/// - `evaluations` - Evaluation passes run so far
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    /// Current lifecycle status.
    pub status: EngineStatus,

    /// Last accepted device location.
    pub location: DeviceLocation,

    /// Markers materialized on the renderer.
    pub marker_count: usize,

    /// Markers visible after the last evaluation.
    pub visible_count: usize,

    /// Evaluation passes run so far.
    pub evaluations: u64,
}

impl Default for EngineSnapshot {
    fn default() -> Self {
        Self {
            status: EngineStatus::Initializing,
            location: DeviceLocation::Unknown,
            marker_count: 0,
            visible_count: 0,
            evaluations: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::PositionErrorKind;

    #[test]
    fn test_status_default() {
        assert_eq!(EngineStatus::default(), EngineStatus::Initializing);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(EngineStatus::Initializing.label(), "initializing");
        assert_eq!(EngineStatus::AwaitingFix.label(), "awaiting-fix");
        assert_eq!(EngineStatus::LoadingMarkers.label(), "loading-markers");
        assert_eq!(EngineStatus::Ready.label(), "ready");
    }

    #[test]
    fn test_status_levels() {
        let denied = EngineStatus::PositionError(PositionError::new(
            PositionErrorKind::PermissionDenied,
            "User denied Geolocation",
        ));

        assert_eq!(EngineStatus::Ready.level(), StatusLevel::Ready);
        assert_eq!(EngineStatus::AwaitingFix.level(), StatusLevel::Loading);
        assert!(denied.is_error());
        assert!(EngineStatus::GeolocationUnsupported.is_error());
        assert!(!EngineStatus::LoadingMarkers.is_error());
    }

    #[test]
    fn test_status_display_includes_error() {
        let status = EngineStatus::PositionError(PositionError::new(
            PositionErrorKind::Timeout,
            "expired",
        ));
        assert_eq!(status.to_string(), "position-error (timeout: expired)");
        assert_eq!(EngineStatus::Ready.to_string(), "ready");
    }

    #[test]
    fn test_status_description() {
        assert_eq!(EngineStatus::AwaitingFix.description(), "Getting GPS...");
        let status = EngineStatus::PositionError(PositionError::new(
            PositionErrorKind::PermissionDenied,
            "User denied Geolocation",
        ));
        assert_eq!(status.description(), "GPS error: User denied Geolocation");
    }

    #[test]
    fn test_snapshot_default() {
        let snapshot = EngineSnapshot::default();
        assert_eq!(snapshot.status, EngineStatus::Initializing);
        assert!(snapshot.location.is_unknown());
        assert_eq!(snapshot.marker_count, 0);
        assert_eq!(snapshot.visible_count, 0);
        assert_eq!(snapshot.evaluations, 0);
    }
}
