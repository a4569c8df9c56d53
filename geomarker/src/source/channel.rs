//! Host-driven position source.
//!
//! The host keeps a [`PositionFeed`] and pushes fixes and errors into it from
//! any thread, for example from a platform location callback. The matching
//! [`ChannelSource`] forwards them to its subscriber. Dropping every feed ends
//! delivery.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::location::{PositionError, PositionFix};

use super::{
    dispatch, runtime, ErrorCallback, FixCallback, PositionEvent, PositionSource, SourceError,
    Subscription,
};

/// Sending half of a [`ChannelSource`].
#[derive(Debug, Clone)]
pub struct PositionFeed {
    tx: mpsc::UnboundedSender<PositionEvent>,
}

impl PositionFeed {
    /// Push a fix. Returns false once the source is gone.
    pub fn send_fix(&self, fix: PositionFix) -> bool {
        self.tx.send(PositionEvent::Fix(fix)).is_ok()
    }

    /// Push an error. Returns false once the source is gone.
    pub fn send_error(&self, error: PositionError) -> bool {
        self.tx.send(PositionEvent::Error(error)).is_ok()
    }
}

/// Position source fed through a channel.
///
/// Can be subscribed once.
#[derive(Debug)]
pub struct ChannelSource {
    rx: Option<mpsc::UnboundedReceiver<PositionEvent>>,
}

impl ChannelSource {
    /// Create a source and the feed that drives it.
    pub fn new() -> (Self, PositionFeed) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx: Some(rx) }, PositionFeed { tx })
    }
}

impl PositionSource for ChannelSource {
    fn subscribe(
        &mut self,
        mut on_update: FixCallback,
        mut on_error: ErrorCallback,
    ) -> Result<Subscription, SourceError> {
        let handle = runtime()?;
        let mut rx = self.rx.take().ok_or(SourceError::AlreadySubscribed)?;
        let cancellation = CancellationToken::new();
        let token = cancellation.clone();

        let task = handle.spawn(async move {
            loop {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => break,

                    event = rx.recv() => match event {
                        Some(event) => dispatch(event, &mut on_update, &mut on_error),
                        None => {
                            debug!("Position feed closed");
                            break;
                        }
                    },
                }
            }
        });

        Ok(Subscription::new(cancellation).with_task(task))
    }
}
