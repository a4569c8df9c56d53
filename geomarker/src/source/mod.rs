//! Position sources.
//!
//! A [`PositionSource`] delivers position fixes and errors through two
//! callbacks until the returned [`Subscription`] is dropped or unsubscribed.
//!
//! # Sources
//!
//! - [`ReplaySource`] replays a recorded [`Track`] with its recorded delays
//! - [`ChannelSource`] forwards events pushed through a [`PositionFeed`]
//! - [`UnsupportedSource`] models a platform without geolocation
//!
//! # Example
//!
//! ```ignore
//! let mut source = ReplaySource::new(Track::load(path)?);
//! let subscription = source.subscribe(
//!     Box::new(|fix| println!("fix: {}", fix)),
//!     Box::new(|err| eprintln!("error: {}", err)),
//! )?;
//!
//! // Stop delivery
//! subscription.unsubscribe();
//! ```

mod channel;
mod replay;
pub mod track;

pub use channel::{ChannelSource, PositionFeed};
pub use replay::ReplaySource;
pub use track::{Track, TrackError, TrackStep};

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::location::{PositionError, PositionFix};

/// Callback invoked for each position fix.
pub type FixCallback = Box<dyn FnMut(PositionFix) + Send + 'static>;

/// Callback invoked for each position error.
pub type ErrorCallback = Box<dyn FnMut(PositionError) + Send + 'static>;

/// A single event from a position source.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionEvent {
    Fix(PositionFix),
    Error(PositionError),
}

/// Errors from subscribing to a position source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// No geolocation is available on this platform.
    #[error("geolocation is not supported")]
    Unsupported,

    /// The source was already subscribed and cannot deliver twice.
    #[error("position source is already subscribed")]
    AlreadySubscribed,

    /// The source needs a tokio runtime to deliver events.
    #[error("position source requires a tokio runtime: {0}")]
    NoRuntime(String),
}

/// Subscription-based geolocation interface.
pub trait PositionSource: Send {
    /// Start delivering fixes to `on_update` and errors to `on_error`.
    fn subscribe(
        &mut self,
        on_update: FixCallback,
        on_error: ErrorCallback,
    ) -> Result<Subscription, SourceError>;
}

/// Handle to an active position subscription.
///
/// Delivery stops when the subscription is unsubscribed or dropped. Once the
/// delivery task ends, both callbacks have been dropped.
pub struct Subscription {
    cancellation: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Create a subscription controlled by `cancellation`.
    pub fn new(cancellation: CancellationToken) -> Self {
        Self {
            cancellation,
            task: None,
        }
    }

    /// Attach the task that delivers events.
    pub fn with_task(mut self, task: JoinHandle<()>) -> Self {
        self.task = Some(task);
        self
    }

    /// Stop delivery.
    pub fn unsubscribe(self) {
        self.cancellation.cancel();
    }

    /// Stop delivery and wait for the delivery task to finish.
    pub async fn close(mut self) {
        self.cancellation.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Position delivery task failed");
            }
        }
    }

    /// Returns true until the subscription is cancelled or delivery ends.
    pub fn is_active(&self) -> bool {
        !self.cancellation.is_cancelled()
            && self.task.as_ref().map_or(true, |t| !t.is_finished())
    }

    /// Get the cancellation token.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.cancellation.is_cancelled())
            .field("has_task", &self.task.is_some())
            .finish()
    }
}

/// A position source for platforms without geolocation.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedSource;

impl PositionSource for UnsupportedSource {
    fn subscribe(
        &mut self,
        _on_update: FixCallback,
        _on_error: ErrorCallback,
    ) -> Result<Subscription, SourceError> {
        Err(SourceError::Unsupported)
    }
}

/// Dispatch an event to the matching callback.
pub(crate) fn dispatch(
    event: PositionEvent,
    on_update: &mut FixCallback,
    on_error: &mut ErrorCallback,
) {
    match event {
        PositionEvent::Fix(fix) => on_update(fix),
        PositionEvent::Error(error) => on_error(error),
    }
}

/// Current runtime handle, or `SourceError::NoRuntime`.
pub(crate) fn runtime() -> Result<Handle, SourceError> {
    Handle::try_current().map_err(|e| SourceError::NoRuntime(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::PositionErrorKind;

    #[test]
    fn test_unsupported_source() {
        let mut source = UnsupportedSource;
        let result = source.subscribe(Box::new(|_| {}), Box::new(|_| {}));
        assert_eq!(result.unwrap_err(), SourceError::Unsupported);
    }

    #[test]
    fn test_subscription_drop_cancels() {
        let token = CancellationToken::new();
        let subscription = Subscription::new(token.clone());
        assert!(subscription.is_active());

        drop(subscription);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_unsubscribe_cancels() {
        let token = CancellationToken::new();
        Subscription::new(token.clone()).unsubscribe();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_dispatch_routes_events() {
        let fixes = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let errors = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));

        let f = fixes.clone();
        let e = errors.clone();
        let mut on_update: FixCallback = Box::new(move |fix| f.lock().unwrap().push(fix));
        let mut on_error: ErrorCallback = Box::new(move |err| e.lock().unwrap().push(err));

        dispatch(
            PositionEvent::Fix(PositionFix::new(1.0, 2.0)),
            &mut on_update,
            &mut on_error,
        );
        dispatch(
            PositionEvent::Error(PositionError::new(PositionErrorKind::Timeout, "slow")),
            &mut on_update,
            &mut on_error,
        );

        assert_eq!(fixes.lock().unwrap().len(), 1);
        assert_eq!(errors.lock().unwrap()[0].kind, PositionErrorKind::Timeout);
    }

    #[test]
    fn test_runtime_missing_outside_tokio() {
        assert!(matches!(runtime(), Err(SourceError::NoRuntime(_))));
    }
}
