//! Run command - replay a position track against a marker configuration.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use geomarker::engine::{
    EngineStatus, MarkerDiagnostic, MarkerRenderer, StatusReporter, VisibilityChange,
    VisibilityEngine,
};
use geomarker::location::PositionFix;
use geomarker::marker::MarkerDefinition;
use geomarker::service::{GeofenceService, ServiceSummary};
use geomarker::source::{ReplaySource, Track};
use tokio_util::sync::CancellationToken;

use super::common::{format_distance, format_position, load_config};
use crate::error::CliError;

/// Arguments for the run command.
pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub track: PathBuf,
    pub debug: bool,
}

/// Run the run command.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let (config_path, mut config) = load_config(args.config)?;
    if args.debug {
        config.settings = config.settings.with_debug(true);
    }
    let track = Track::load(&args.track)?;

    println!("GeoMarker Track Replay v{}", geomarker::VERSION);
    println!("==========================");
    println!();
    println!("Config:   {}", config_path.display());
    println!("Track:    {} ({} steps)", args.track.display(), track.len());
    println!("Markers:  {}", config.markers.len());
    println!(
        "Range:    {} - {}",
        format_distance(config.settings.min_distance_m),
        format_distance(config.settings.max_distance_m)
    );
    println!("Interval: {} ms", config.settings.update_interval_ms);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let engine = VisibilityEngine::from_config(config)
        .with_renderer(Arc::new(TerminalRenderer))
        .with_status_reporter(Arc::new(TerminalReporter::new()));
    let mut service = GeofenceService::new(engine);
    let mut source = ReplaySource::new(track);

    // Set up signal handler for graceful shutdown
    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, stopping...");
        signal_token.cancel();
    })?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(CliError::Runtime)?;

    let summary = runtime.block_on(service.run(&mut source, shutdown))?;
    print!("{}", summary_report(&summary));

    Ok(())
}

fn summary_report(summary: &ServiceSummary) -> String {
    format!(
        "\nSummary\n-------\n  Stopped:     {}\n  Fixes:       {}\n  Errors:      {}\n  \
         Evaluations: {}\n  Visible:     {}\n  Status:      {}\n",
        summary.stop_reason,
        summary.fixes,
        summary.errors,
        summary.evaluations,
        summary.visible_count,
        summary.status.description(),
    )
}

// =============================================================================
// Terminal collaborators
// =============================================================================

/// Prints materialization and visibility changes.
struct TerminalRenderer;

impl MarkerRenderer for TerminalRenderer {
    fn materialize(&self, markers: &[MarkerDefinition]) {
        println!("Loaded {} markers", markers.len());
        for marker in markers {
            println!(
                "  + {} ({}) at {}, geofence {}",
                marker.id,
                marker.kind.marker_type(),
                format_position(&marker.position),
                format_distance(marker.geofence_radius_m)
            );
        }
    }

    fn set_visibility(&self, change: &VisibilityChange) {
        println!("{}", visibility_line(change));
    }

    fn report_diagnostics(&self, diagnostics: &[MarkerDiagnostic]) {
        for d in diagnostics {
            println!("{}", diagnostic_line(d));
        }
    }
}

/// Prints status, location and the visible count when it changes.
struct TerminalReporter {
    last_visible: AtomicUsize,
}

impl TerminalReporter {
    fn new() -> Self {
        Self {
            last_visible: AtomicUsize::new(usize::MAX),
        }
    }
}

impl StatusReporter for TerminalReporter {
    fn status_changed(&self, status: &EngineStatus) {
        println!("Status: {}", status.description());
    }

    fn location_changed(&self, fix: &PositionFix) {
        println!("Location: {}", fix);
    }

    fn marker_count(&self, count: usize) {
        println!("Markers loaded: {}", count);
    }

    fn visible_count(&self, count: usize) {
        if self.last_visible.swap(count, Ordering::Relaxed) != count {
            println!("Visible markers: {}", count);
        }
    }
}

fn visibility_line(change: &VisibilityChange) -> String {
    format!(
        "  {} {} ({})",
        if change.visible { "SHOW" } else { "HIDE" },
        change.id,
        format_distance(change.distance_m)
    )
}

fn diagnostic_line(d: &MarkerDiagnostic) -> String {
    format!(
        "    {}: {} geofence={} range={} -> {}",
        d.id,
        format_distance(d.distance_m),
        if d.within_geofence { "in" } else { "out" },
        if d.within_range { "in" } else { "out" },
        if d.visible { "visible" } else { "hidden" }
    )
}
