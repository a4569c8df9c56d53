//! Recorded position tracks.
//!
//! A track is a JSON-lines file, one step per line. Each step is either a fix
//! or an error, with the delay to wait before delivering it:
//!
//! ```text
//! # walk past the cafe
//! {"latitude": 52.2845823, "longitude": 5.518673, "delayMs": 0}
//! {"latitude": 52.2846, "longitude": 5.5187, "altitude": 3.2, "delayMs": 1500}
//! {"error": "timeout", "message": "no signal", "delayMs": 2000}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::location::{PositionError, PositionErrorKind, PositionFix};

use super::PositionEvent;

/// Errors from loading a track.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("failed to read track {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: {reason}")]
    InvalidStep { line: usize, reason: String },
}

/// One step of a track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackStep {
    /// Delay before this step is delivered.
    pub delay: Duration,
    pub event: PositionEvent,
}

impl TrackStep {
    /// A fix delivered after `delay`.
    pub fn fix(delay: Duration, fix: PositionFix) -> Self {
        Self {
            delay,
            event: PositionEvent::Fix(fix),
        }
    }

    /// An error delivered after `delay`.
    pub fn error(delay: Duration, error: PositionError) -> Self {
        Self {
            delay,
            event: PositionEvent::Error(error),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStep {
    latitude: Option<f64>,
    longitude: Option<f64>,
    altitude: Option<f64>,
    error: Option<String>,
    message: Option<String>,
    #[serde(default)]
    delay_ms: u64,
}

/// An ordered sequence of position steps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    steps: Vec<TrackStep>,
}

impl Track {
    /// Create a track from steps.
    pub fn new(steps: Vec<TrackStep>) -> Self {
        Self { steps }
    }

    /// Load a track from a JSON-lines file.
    pub fn load(path: &Path) -> Result<Self, TrackError> {
        let contents = std::fs::read_to_string(path).map_err(|source| TrackError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let track = Self::parse(&contents)?;
        tracing::info!(path = %path.display(), steps = track.len(), "Track loaded");
        Ok(track)
    }

    /// Parse a track from JSON lines.
    pub fn parse(contents: &str) -> Result<Self, TrackError> {
        let mut steps = Vec::new();

        for (index, line) in contents.lines().enumerate() {
            let line_no = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let raw: RawStep = serde_json::from_str(trimmed).map_err(|source| TrackError::Parse {
                line: line_no,
                source,
            })?;
            steps.push(Self::step_from_raw(raw, line_no)?);
        }

        Ok(Self { steps })
    }

    /// Append a fix step.
    pub fn push_fix(&mut self, delay: Duration, fix: PositionFix) {
        self.steps.push(TrackStep::fix(delay, fix));
    }

    /// Append an error step.
    pub fn push_error(&mut self, delay: Duration, error: PositionError) {
        self.steps.push(TrackStep::error(delay, error));
    }

    pub fn steps(&self) -> &[TrackStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Sum of all step delays.
    pub fn duration(&self) -> Duration {
        self.steps.iter().map(|s| s.delay).sum()
    }

    fn step_from_raw(raw: RawStep, line: usize) -> Result<TrackStep, TrackError> {
        let delay = Duration::from_millis(raw.delay_ms);

        if let Some(name) = raw.error {
            let kind = PositionErrorKind::from_name(&name).ok_or_else(|| TrackError::InvalidStep {
                line,
                reason: format!("unknown error kind '{}'", name),
            })?;
            let message = raw.message.unwrap_or_else(|| kind.to_string());
            return Ok(TrackStep::error(delay, PositionError::new(kind, message)));
        }

        match (raw.latitude, raw.longitude) {
            (Some(latitude), Some(longitude)) => Ok(TrackStep::fix(
                delay,
                PositionFix {
                    latitude,
                    longitude,
                    altitude: raw.altitude,
                },
            )),
            _ => Err(TrackError::InvalidStep {
                line,
                reason: "expected latitude and longitude, or an error".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
# walk past the cafe
{"latitude": 52.2845823, "longitude": 5.518673, "delayMs": 0}

{"latitude": 52.2846, "longitude": 5.5187, "altitude": 3.2, "delayMs": 1500}
{"error": "timeout", "message": "no signal", "delayMs": 2000}
{"error": "permission_denied", "delayMs": 10}
"#;

    #[test]
    fn test_parse_sample_track() {
        let track = Track::parse(SAMPLE).unwrap();
        assert_eq!(track.len(), 4);
        assert_eq!(track.duration(), Duration::from_millis(3510));

        assert_eq!(
            track.steps()[0].event,
            PositionEvent::Fix(PositionFix::new(52.2845823, 5.518673))
        );
        assert_eq!(
            track.steps()[1].event,
            PositionEvent::Fix(PositionFix::with_altitude(52.2846, 5.5187, 3.2))
        );

        match &track.steps()[2].event {
            PositionEvent::Error(e) => {
                assert_eq!(e.kind, PositionErrorKind::Timeout);
                assert_eq!(e.message, "no signal");
            }
            other => panic!("expected error step, got {:?}", other),
        }

        match &track.steps()[3].event {
            PositionEvent::Error(e) => assert_eq!(e.message, "permission denied"),
            other => panic!("expected error step, got {:?}", other),
        }
    }

    #[test]
    fn test_equator_fix_parses() {
        let track = Track::parse(r#"{"latitude": 0.0, "longitude": 0.0}"#).unwrap();
        assert_eq!(track.steps()[0].delay, Duration::ZERO);
        assert_eq!(
            track.steps()[0].event,
            PositionEvent::Fix(PositionFix::new(0.0, 0.0))
        );
    }

    #[test]
    fn test_invalid_json_reports_line() {
        let err = Track::parse("{\"latitude\": 1.0, \"longitude\": 2.0}\nnot json").unwrap_err();
        assert!(matches!(err, TrackError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_missing_coordinates_rejected() {
        let err = Track::parse(r#"{"latitude": 1.0}"#).unwrap_err();
        assert!(matches!(err, TrackError::InvalidStep { line: 1, .. }));
    }

    #[test]
    fn test_unknown_error_kind_rejected() {
        let err = Track::parse(r#"{"error": "solar-flare"}"#).unwrap_err();
        assert!(err.to_string().contains("solar-flare"));
    }

    #[test]
    fn test_builder_methods() {
        let mut track = Track::default();
        assert!(track.is_empty());

        track.push_fix(Duration::from_secs(1), PositionFix::new(1.0, 2.0));
        track.push_error(
            Duration::from_secs(2),
            PositionError::new(PositionErrorKind::Unavailable, "tunnel"),
        );

        assert_eq!(track.len(), 2);
        assert_eq!(track.duration(), Duration::from_secs(3));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let track = Track::load(file.path()).unwrap();
        assert_eq!(track.len(), 4);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Track::load(&dir.path().join("none.jsonl")).unwrap_err();
        assert!(matches!(err, TrackError::ReadFailed { .. }));
    }
}
