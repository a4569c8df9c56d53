//! Collaborator traits for the visibility engine.
//!
//! The engine has no rendering or UI dependency of its own. It pushes
//! visibility signals to a [`MarkerRenderer`] and lifecycle information to a
//! [`StatusReporter`]; hosts implement these to drive a scene graph, a
//! terminal, or a test recorder.

use crate::location::PositionFix;
use crate::marker::MarkerDefinition;

use super::report::{MarkerDiagnostic, VisibilityChange};
use super::status::EngineStatus;

/// Receives marker instantiation and visibility signals.
pub trait MarkerRenderer: Send + Sync {
    /// Instantiate every marker. Called exactly once, on the first valid fix.
    fn materialize(&self, markers: &[MarkerDefinition]);

    /// Show or hide a marker.
    fn set_visibility(&self, change: &VisibilityChange);

    /// Per-marker gate results for the last pass (debug mode only).
    fn report_diagnostics(&self, _diagnostics: &[MarkerDiagnostic]) {}
}

/// Receives status and counters for display.
pub trait StatusReporter: Send + Sync {
    /// The engine status changed.
    fn status_changed(&self, status: &EngineStatus);

    /// A new position fix was accepted.
    fn location_changed(&self, _fix: &PositionFix) {}

    /// Number of markers handed to the renderer.
    fn marker_count(&self, _count: usize) {}

    /// Number of markers visible after an evaluation.
    fn visible_count(&self, _count: usize) {}
}
