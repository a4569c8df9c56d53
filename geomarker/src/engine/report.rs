//! Evaluation results.

use crate::config::VisibilitySettings;
use crate::coord::{self, CoordError, Coordinate};
use crate::marker::MarkerDefinition;

/// Per-marker state carried between evaluations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerState {
    /// Last visibility decision.
    pub visible: bool,
    /// Distance from the device at the last evaluation, in meters.
    pub distance_m: f64,
}

/// A visibility signal sent to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityChange {
    pub id: String,
    pub visible: bool,
    pub distance_m: f64,
}

/// Distance and gate results for one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDiagnostic {
    pub id: String,
    pub distance_m: f64,
    pub geofence_radius_m: f64,
    /// `distance <= geofence radius`
    pub within_geofence: bool,
    /// `min distance <= distance <= max distance`
    pub within_range: bool,
    /// Both gates passed.
    pub visible: bool,
}

impl MarkerDiagnostic {
    /// Apply both visibility gates to a marker as seen from `origin`.
    ///
    /// Fails if the marker's position is not a valid coordinate.
    pub fn evaluate(
        marker: &MarkerDefinition,
        origin: Coordinate,
        settings: &VisibilitySettings,
    ) -> Result<Self, CoordError> {
        marker.position.validate()?;

        let distance_m = coord::distance(origin, marker.position);
        let within_geofence = distance_m <= marker.geofence_radius_m;
        let within_range = settings.in_range(distance_m);

        Ok(Self {
            id: marker.id.clone(),
            distance_m,
            geofence_radius_m: marker.geofence_radius_m,
            within_geofence,
            within_range,
            visible: within_geofence && within_range,
        })
    }
}

/// Outcome of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibilityReport {
    /// Markers visible after this pass.
    pub visible_count: usize,

    /// Markers with a valid position that were evaluated.
    pub evaluated: usize,

    /// Visibility signals emitted in this pass (new or changed markers).
    pub changes: Vec<VisibilityChange>,

    /// Markers skipped for lack of a valid position.
    pub skipped: Vec<String>,

    /// Per-marker gate results; only filled in debug mode.
    pub diagnostics: Vec<MarkerDiagnostic>,
}

impl VisibilityReport {
    /// Returns true if this pass changed nothing on the renderer.
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }

    /// The change emitted for a marker in this pass, if any.
    pub fn change_for(&self, id: &str) -> Option<&VisibilityChange> {
        self.changes.iter().find(|c| c.id == id)
    }
}
