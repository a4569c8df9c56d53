//! Geofenced visibility engine.
//!
//! Owns the marker set, the visibility settings and the device location, and
//! decides on each evaluation pass which markers should be shown.
//!
//! # Architecture
//!
//! ```text
//!   position fix ──► update_position ──┐
//!                                      ├──► evaluate ──► MarkerRenderer
//!   timer tick ────────────────────────┘        │
//!                                               └──────► StatusReporter
//! ```
//!
//! # Visibility gates
//!
//! A marker is visible only when both gates pass:
//!
//! - **Geofence**: distance to the device is within the marker's own radius
//! - **Range**: distance is within the global `[min, max]` distance window
//!
//! # Example
//!
//! ```
//! use geomarker::config::VisibilitySettings;
//! use geomarker::coord::Coordinate;
//! use geomarker::engine::VisibilityEngine;
//! use geomarker::location::PositionFix;
//! use geomarker::marker::MarkerDefinition;
//!
//! let marker = MarkerDefinition::new("cafe", Coordinate::new(52.2846, 5.5187));
//! let mut engine = VisibilityEngine::new(vec![marker], VisibilitySettings::default());
//! engine.begin_tracking();
//!
//! let report = engine.update_position(PositionFix::new(52.2845823, 5.518673)).unwrap();
//! assert_eq!(report.visible_count, 1);
//! ```

mod report;
mod status;
mod traits;

pub use report::{MarkerDiagnostic, MarkerState, VisibilityChange, VisibilityReport};
pub use status::{EngineSnapshot, EngineStatus, StatusLevel};
pub use traits::{MarkerRenderer, StatusReporter};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::{ConfigFile, VisibilitySettings};
use crate::location::{DeviceLocation, PositionError, PositionFix};
use crate::marker::MarkerDefinition;

/// Visibility engine.
///
/// Not thread-safe by itself; a single owner drives it from one task.
pub struct VisibilityEngine {
    /// Marker definitions, immutable after construction.
    markers: Vec<MarkerDefinition>,

    /// Global visibility settings.
    settings: VisibilitySettings,

    /// Last accepted device location.
    location: DeviceLocation,

    /// Last reported visibility per marker id.
    states: HashMap<String, MarkerState>,

    /// Markers already reported as unevaluable.
    warned_invalid: HashSet<String>,

    /// Whether markers were handed to the renderer.
    materialized: bool,

    /// Current lifecycle status.
    status: EngineStatus,

    /// Rendering collaborator.
    renderer: Option<Arc<dyn MarkerRenderer>>,

    /// UI/observability collaborator.
    reporter: Option<Arc<dyn StatusReporter>>,

    evaluations: u64,
    visible_count: usize,
}

impl std::fmt::Debug for VisibilityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityEngine")
            .field("markers", &self.markers.len())
            .field("settings", &self.settings)
            .field("location", &self.location)
            .field("materialized", &self.materialized)
            .field("status", &self.status)
            .field("has_renderer", &self.renderer.is_some())
            .field("has_reporter", &self.reporter.is_some())
            .field("evaluations", &self.evaluations)
            .finish()
    }
}

impl VisibilityEngine {
    /// Create a new engine for the given markers and settings.
    pub fn new(markers: Vec<MarkerDefinition>, settings: VisibilitySettings) -> Self {
        Self {
            markers,
            settings,
            location: DeviceLocation::Unknown,
            states: HashMap::new(),
            warned_invalid: HashSet::new(),
            materialized: false,
            status: EngineStatus::Initializing,
            renderer: None,
            reporter: None,
            evaluations: 0,
            visible_count: 0,
        }
    }

    /// Create an engine from a loaded configuration.
    pub fn from_config(config: ConfigFile) -> Self {
        Self::new(config.markers, config.settings)
    }

    /// Set the rendering collaborator.
    pub fn with_renderer(mut self, renderer: Arc<dyn MarkerRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Set the status collaborator.
    pub fn with_status_reporter(mut self, reporter: Arc<dyn StatusReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Mark the position subscription as established.
    ///
    /// Only moves `Initializing` to `AwaitingFix`; later calls are ignored.
    pub fn begin_tracking(&mut self) {
        if self.status == EngineStatus::Initializing {
            self.set_status(EngineStatus::AwaitingFix);
        }
    }

    /// Record that no position source is available.
    pub fn source_unavailable(&mut self) {
        tracing::warn!("Geolocation is not supported, markers will not be shown");
        self.set_status(EngineStatus::GeolocationUnsupported);
    }

    /// Record a position source error.
    ///
    /// The device location and marker visibility are left unchanged.
    pub fn position_error(&mut self, error: PositionError) {
        tracing::warn!(kind = ?error.kind, message = %error.message, "Position error");
        self.set_status(EngineStatus::PositionError(error));
    }

    /// Accept a new position fix and evaluate.
    ///
    /// On the first valid fix the markers are materialized. A fix with an
    /// invalid latitude or longitude is rejected and returns `None`.
    pub fn update_position(&mut self, fix: PositionFix) -> Option<VisibilityReport> {
        if let Err(e) = fix.validate() {
            tracing::warn!(error = %e, "Ignoring position fix with invalid coordinates");
            return None;
        }

        self.location = DeviceLocation::Known(fix);
        if let Some(ref reporter) = self.reporter {
            reporter.location_changed(&fix);
        }

        if !self.materialized {
            self.materialize(&fix);
        } else if self.status != EngineStatus::Ready {
            self.set_status(EngineStatus::Ready);
        }

        self.evaluate()
    }

    /// Run one evaluation pass.
    ///
    /// Returns `None` without touching any state while the location is unknown.
    pub fn evaluate(&mut self) -> Option<VisibilityReport> {
        let origin = self.location.coordinate()?;
        self.evaluations += 1;

        let mut report = VisibilityReport::default();

        for marker in &self.markers {
            let diagnostic = match MarkerDiagnostic::evaluate(marker, origin, &self.settings) {
                Ok(diagnostic) => diagnostic,
                Err(e) => {
                    if self.warned_invalid.insert(marker.id.clone()) {
                        tracing::warn!(
                            marker = %marker.id,
                            error = %e,
                            "Skipping marker without a valid position"
                        );
                    }
                    report.skipped.push(marker.id.clone());
                    continue;
                }
            };

            report.evaluated += 1;
            if diagnostic.visible {
                report.visible_count += 1;
            }

            let state = MarkerState {
                visible: diagnostic.visible,
                distance_m: diagnostic.distance_m,
            };
            let previous = self.states.insert(marker.id.clone(), state);
            if previous.map(|p| p.visible) != Some(diagnostic.visible) {
                report.changes.push(VisibilityChange {
                    id: marker.id.clone(),
                    visible: diagnostic.visible,
                    distance_m: diagnostic.distance_m,
                });
            }

            if self.settings.debug {
                report.diagnostics.push(diagnostic);
            }
        }

        self.visible_count = report.visible_count;
        self.publish(&report);

        tracing::debug!(
            evaluation = self.evaluations,
            evaluated = report.evaluated,
            visible = report.visible_count,
            changes = report.changes.len(),
            skipped = report.skipped.len(),
            "Visibility evaluated"
        );

        Some(report)
    }

    /// Current lifecycle status.
    pub fn status(&self) -> &EngineStatus {
        &self.status
    }

    /// Last accepted device location.
    pub fn location(&self) -> &DeviceLocation {
        &self.location
    }

    /// Visibility settings in effect.
    pub fn settings(&self) -> &VisibilitySettings {
        &self.settings
    }

    /// All marker definitions.
    pub fn markers(&self) -> &[MarkerDefinition] {
        &self.markers
    }

    /// Whether markers were handed to the renderer.
    pub fn is_materialized(&self) -> bool {
        self.materialized
    }

    /// Markers visible after the last evaluation.
    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    /// Evaluation passes run so far.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Last reported state of a marker, if it was ever evaluated.
    pub fn marker_state(&self, id: &str) -> Option<MarkerState> {
        self.states.get(id).copied()
    }

    /// Last reported visibility of a marker, if it was ever evaluated.
    pub fn is_visible(&self, id: &str) -> Option<bool> {
        self.states.get(id).map(|s| s.visible)
    }

    /// Point-in-time copy of the observable state.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            status: self.status.clone(),
            location: self.location,
            marker_count: if self.materialized {
                self.markers.len()
            } else {
                0
            },
            visible_count: self.visible_count,
            evaluations: self.evaluations,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn materialize(&mut self, fix: &PositionFix) {
        self.set_status(EngineStatus::LoadingMarkers);

        if let Some(ref renderer) = self.renderer {
            renderer.materialize(&self.markers);
        }
        if let Some(ref reporter) = self.reporter {
            reporter.marker_count(self.markers.len());
        }
        self.materialized = true;

        tracing::info!(
            markers = self.markers.len(),
            position = %fix,
            "First position fix, markers materialized"
        );

        self.set_status(EngineStatus::Ready);
    }

    fn publish(&self, report: &VisibilityReport) {
        if let Some(ref renderer) = self.renderer {
            for change in &report.changes {
                renderer.set_visibility(change);
            }
            if self.settings.debug {
                renderer.report_diagnostics(&report.diagnostics);
            }
        }

        if self.settings.debug {
            for d in &report.diagnostics {
                tracing::info!(
                    marker = %d.id,
                    distance_m = format_args!("{:.1}", d.distance_m),
                    geofence_m = d.geofence_radius_m,
                    within_geofence = d.within_geofence,
                    within_range = d.within_range,
                    visible = d.visible,
                    "Marker diagnostic"
                );
            }
        }

        if let Some(ref reporter) = self.reporter {
            reporter.visible_count(report.visible_count);
        }
    }

    fn set_status(&mut self, status: EngineStatus) {
        if self.status == status {
            return;
        }

        tracing::info!(from = %self.status, to = %status, "Engine status changed");
        self.status = status;

        if let Some(ref reporter) = self.reporter {
            reporter.status_changed(&self.status);
        }
    }
}
