//! Geofence service event loop.
//!
//! [`GeofenceService`] owns the [`VisibilityEngine`] and drives it from two
//! triggers on a single task:
//!
//! - position events delivered by a [`PositionSource`] subscription
//! - a periodic timer at the configured update interval
//!
//! Each trigger runs to completion before the next is handled, so the engine
//! needs no locking.
//!
//! # Example
//!
//! ```ignore
//! let engine = VisibilityEngine::from_config(config).with_renderer(renderer);
//! let mut service = GeofenceService::new(engine);
//!
//! let shutdown = CancellationToken::new();
//! let summary = service.run(&mut source, shutdown.clone()).await?;
//! println!("{} fixes, {} visible", summary.fixes, summary.visible_count);
//! ```

mod error;

pub use error::ServiceError;

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_UPDATE_INTERVAL_MS;
use crate::engine::{EngineStatus, VisibilityEngine};
use crate::source::{ErrorCallback, FixCallback, PositionEvent, PositionSource, SourceError};

/// Why the service loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The shutdown token was cancelled.
    Cancelled,
    /// The position source stopped delivering.
    SourceClosed,
    /// No position source is available.
    Unsupported,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Cancelled => write!(f, "cancelled"),
            StopReason::SourceClosed => write!(f, "source closed"),
            StopReason::Unsupported => write!(f, "geolocation unsupported"),
        }
    }
}

/// Counters and final state of one service run.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSummary {
    /// Position fixes received.
    pub fixes: u64,
    /// Position errors received.
    pub errors: u64,
    /// Timer ticks handled.
    pub ticks: u64,
    /// Evaluation passes the engine ran.
    pub evaluations: u64,
    /// Engine status when the loop stopped.
    pub status: EngineStatus,
    /// Markers visible when the loop stopped.
    pub visible_count: usize,
    pub stop_reason: StopReason,
}

/// Runs a [`VisibilityEngine`] against a position source.
#[derive(Debug)]
pub struct GeofenceService {
    engine: VisibilityEngine,
    fixes: u64,
    errors: u64,
    ticks: u64,
}

impl GeofenceService {
    pub fn new(engine: VisibilityEngine) -> Self {
        Self {
            engine,
            fixes: 0,
            errors: 0,
            ticks: 0,
        }
    }

    /// The engine being driven.
    pub fn engine(&self) -> &VisibilityEngine {
        &self.engine
    }

    /// Consume the service and return the engine.
    pub fn into_engine(self) -> VisibilityEngine {
        self.engine
    }

    /// Subscribe to `source` and run until `shutdown` is cancelled or the
    /// source stops delivering.
    ///
    /// If the source reports geolocation as unsupported, the engine status is
    /// updated and the run returns straight away.
    pub async fn run(
        &mut self,
        source: &mut dyn PositionSource,
        shutdown: CancellationToken,
    ) -> Result<ServiceSummary, ServiceError> {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();

        let fix_tx = event_tx.clone();
        let on_update: FixCallback = Box::new(move |fix| {
            let _ = fix_tx.send(PositionEvent::Fix(fix));
        });
        let on_error: ErrorCallback = Box::new(move |error| {
            let _ = event_tx.send(PositionEvent::Error(error));
        });

        let subscription = match source.subscribe(on_update, on_error) {
            Ok(subscription) => subscription,
            Err(SourceError::Unsupported) => {
                self.engine.source_unavailable();
                return Ok(self.summary(StopReason::Unsupported));
            }
            Err(e) => return Err(e.into()),
        };

        self.engine.begin_tracking();

        let interval = self.update_interval();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        info!(
            markers = self.engine.markers().len(),
            interval_ms = interval.as_millis() as u64,
            debug = self.engine.settings().debug,
            "Geofence service started"
        );

        let stop_reason = loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Geofence service shutting down");
                    break StopReason::Cancelled;
                }

                event = event_rx.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        info!("Position source closed");
                        break StopReason::SourceClosed;
                    }
                },

                _ = ticker.tick() => {
                    self.ticks += 1;
                    if self.engine.evaluate().is_none() {
                        debug!(tick = self.ticks, "Timer tick without a known position");
                    }
                }
            }
        };

        subscription.close().await;

        let summary = self.summary(stop_reason);
        info!(
            reason = %summary.stop_reason,
            fixes = summary.fixes,
            errors = summary.errors,
            evaluations = summary.evaluations,
            visible = summary.visible_count,
            status = %summary.status,
            "Geofence service stopped"
        );

        Ok(summary)
    }

    fn handle_event(&mut self, event: PositionEvent) {
        match event {
            PositionEvent::Fix(fix) => {
                self.fixes += 1;
                debug!(position = %fix, "Position fix received");
                self.engine.update_position(fix);
            }
            PositionEvent::Error(error) => {
                self.errors += 1;
                self.engine.position_error(error);
            }
        }
    }

    fn update_interval(&self) -> Duration {
        let interval = self.engine.settings().update_interval();
        if interval.is_zero() {
            warn!(
                default_ms = DEFAULT_UPDATE_INTERVAL_MS,
                "Update interval is zero, using default"
            );
            return Duration::from_millis(DEFAULT_UPDATE_INTERVAL_MS);
        }
        interval
    }

    fn summary(&self, stop_reason: StopReason) -> ServiceSummary {
        ServiceSummary {
            fixes: self.fixes,
            errors: self.errors,
            ticks: self.ticks,
            evaluations: self.engine.evaluations(),
            status: self.engine.status().clone(),
            visible_count: self.engine.visible_count(),
            stop_reason,
        }
    }
}
