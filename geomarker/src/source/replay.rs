//! Replay of recorded tracks.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::track::Track;
use super::{dispatch, runtime, ErrorCallback, FixCallback, PositionSource, SourceError, Subscription};

/// Replays a [`Track`], waiting each step's delay before delivering it.
///
/// Every subscription replays the whole track from the start. Delivery ends
/// after the last step, which drops both callbacks.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    track: Track,
}

impl ReplaySource {
    pub fn new(track: Track) -> Self {
        Self { track }
    }

    pub fn track(&self) -> &Track {
        &self.track
    }
}

impl PositionSource for ReplaySource {
    fn subscribe(
        &mut self,
        mut on_update: FixCallback,
        mut on_error: ErrorCallback,
    ) -> Result<Subscription, SourceError> {
        let handle = runtime()?;
        let cancellation = CancellationToken::new();
        let token = cancellation.clone();
        let steps = self.track.steps().to_vec();

        let task = handle.spawn(async move {
            for (index, step) in steps.into_iter().enumerate() {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => {
                        debug!(step = index, "Track replay cancelled");
                        return;
                    }

                    _ = tokio::time::sleep(step.delay) => {}
                }

                dispatch(step.event, &mut on_update, &mut on_error);
            }
            debug!("Track replay finished");
        });

        Ok(Subscription::new(cancellation).with_task(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{PositionError, PositionErrorKind, PositionFix};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn sample_track() -> Track {
        let mut track = Track::default();
        track.push_fix(Duration::from_millis(100), PositionFix::new(1.0, 2.0));
        track.push_error(
            Duration::from_millis(100),
            PositionError::new(PositionErrorKind::Timeout, "slow"),
        );
        track.push_fix(Duration::from_millis(100), PositionFix::new(1.5, 2.0));
        track
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_delivers_in_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let fixes = events.clone();
        let errors = events.clone();

        let mut source = ReplaySource::new(sample_track());
        let subscription = source
            .subscribe(
                Box::new(move |fix| fixes.lock().unwrap().push(format!("fix {}", fix.latitude))),
                Box::new(move |err| errors.lock().unwrap().push(format!("error {}", err.kind))),
            )
            .unwrap();

        subscription.close_after(Duration::from_millis(350)).await;

        assert_eq!(
            *events.lock().unwrap(),
            vec!["fix 1", "error timeout", "fix 1.5"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe_stops_delivery() {
        let count = Arc::new(Mutex::new(0));
        let c = count.clone();

        let mut source = ReplaySource::new(sample_track());
        let subscription = source
            .subscribe(Box::new(move |_| *c.lock().unwrap() += 1), Box::new(|_| {}))
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        subscription.close().await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resubscribe_replays_from_start() {
        let count = Arc::new(Mutex::new(0));
        let mut source = ReplaySource::new(sample_track());

        for _ in 0..2 {
            let c = count.clone();
            let subscription = source
                .subscribe(Box::new(move |_| *c.lock().unwrap() += 1), Box::new(|_| {}))
                .unwrap();
            subscription.close_after(Duration::from_secs(1)).await;
        }

        assert_eq!(*count.lock().unwrap(), 4);
    }

    impl Subscription {
        async fn close_after(self, delay: Duration) {
            tokio::time::sleep(delay).await;
            self.close().await;
        }
    }
}
