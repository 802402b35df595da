//! Background polling task.
//!
//! Runs one fetch cycle immediately and then on a fixed cadence, publishing
//! each outcome to a [`ReadingStore`]. The task stops when its
//! [`CancellationToken`] is cancelled, including in the middle of a fetch.

use smarthub_core::ReadingSnapshot;
use smarthub_fetch::UsageSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::reading_store::{ReadingReader, ReadingStore};

/// Drives a [`UsageSource`] and publishes snapshots.
pub struct Poller<S> {
    source: S,
    store: ReadingStore,
    interval: Duration,
}

impl<S: UsageSource> Poller<S> {
    /// Creates a poller with an empty store.
    pub fn new(source: S, interval: Duration) -> Self {
        let store = ReadingStore::new(source.identity());
        Self {
            source,
            store,
            interval,
        }
    }

    /// Returns a reader for the published snapshots.
    pub fn reader(&self) -> ReadingReader {
        self.store.reader()
    }

    /// Time between cycles.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs one fetch cycle and publishes its outcome.
    pub async fn refresh(&mut self) -> Arc<ReadingSnapshot> {
        let account = self.store.identity().unique_id();
        debug!(account = %account, "Refreshing readings");

        match self.source.fetch_latest().await {
            Ok(readings) => {
                info!(
                    account = %account,
                    readings = readings.map_or(0, |r| r.iter().count()),
                    "Refresh succeeded"
                );
                self.store.record_success(readings)
            }
            Err(e) => {
                warn!(
                    account = %account,
                    error = %e,
                    transient = e.is_transient(),
                    "Refresh failed"
                );
                self.store.record_failure(e.to_string())
            }
        }
    }

    /// Polls until `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(interval_secs = self.interval.as_secs(), "Starting poller");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = self.refresh() => {}
            }
        }

        info!("Poller stopped");
    }
}

impl<S: UsageSource + 'static> Poller<S> {
    /// Runs the poller on the current Tokio runtime.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use smarthub_core::{AccountIdentity, ReadingKind, ReadingSet};
    use smarthub_fetch::FetchError;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;
    use tokio::time::Instant;

    type Outcome = Result<Option<ReadingSet>, FetchError>;

    struct ScriptedSource {
        script: VecDeque<Outcome>,
        calls: Arc<AtomicUsize>,
        delay: Duration,
        started: Option<oneshot::Sender<()>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Outcome>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let source = Self {
                script: script.into(),
                calls: Arc::clone(&calls),
                delay: Duration::ZERO,
                started: None,
            };
            (source, calls)
        }
    }

    #[async_trait]
    impl UsageSource for ScriptedSource {
        fn identity(&self) -> AccountIdentity {
            AccountIdentity {
                email: "user@example.com".to_string(),
                host: "myutility.smarthub.coop".to_string(),
                account_id: "12345".to_string(),
            }
        }

        async fn fetch_latest(&mut self) -> Outcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(started) = self.started.take() {
                let _ = started.send(());
            }
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.script.pop_front().unwrap_or(Ok(None))
        }
    }

    fn usage(value: f64) -> ReadingSet {
        ReadingSet {
            usage: Some(value),
            ..ReadingSet::default()
        }
    }

    #[tokio::test]
    async fn test_refresh_publishes_success() {
        let (source, calls) = ScriptedSource::new(vec![Ok(Some(usage(10.0)))]);
        let mut poller = Poller::new(source, Duration::from_secs(60));
        let reader = poller.reader();

        let snapshot = poller.refresh().await;

        assert!(snapshot.last_update_success);
        assert_eq!(reader.sensor(ReadingKind::Usage).value(), Some(10.0));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_publishes_failure() {
        let (source, _) = ScriptedSource::new(vec![
            Ok(Some(usage(10.0))),
            Err(FetchError::StillPending { attempts: 5 }),
        ]);
        let mut poller = Poller::new(source, Duration::from_secs(60));
        let reader = poller.reader();

        poller.refresh().await;
        let snapshot = poller.refresh().await;

        assert!(!snapshot.last_update_success);
        assert!(snapshot.error.as_deref().unwrap().contains("still pending"));
        assert!(!reader.sensor(ReadingKind::Usage).available());
        assert_eq!(snapshot.value(ReadingKind::Usage), Some(10.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_on_interval() {
        let (source, calls) = ScriptedSource::new(vec![
            Ok(Some(usage(1.0))),
            Err(FetchError::Http { status: 500 }),
            Ok(Some(usage(3.0))),
        ]);
        let poller = Poller::new(source, Duration::from_secs(60));
        let mut reader = poller.reader();
        let cancel = CancellationToken::new();
        let start = Instant::now();
        let handle = poller.spawn(cancel.clone());

        let first = reader.changed().await.unwrap();
        assert!(first.last_update_success);
        assert!(start.elapsed() < Duration::from_secs(1));

        let second = reader.changed().await.unwrap();
        assert!(!second.last_update_success);
        assert!(start.elapsed() >= Duration::from_secs(60));

        let third = reader.changed().await.unwrap();
        assert_eq!(third.value(ReadingKind::Usage), Some(3.0));
        assert!(start.elapsed() >= Duration::from_secs(120));

        cancel.cancel();
        handle.await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_fetch() {
        let (mut source, calls) = ScriptedSource::new(vec![Ok(Some(usage(1.0)))]);
        let (started_tx, started_rx) = oneshot::channel();
        source.delay = Duration::from_secs(3600);
        source.started = Some(started_tx);

        let poller = Poller::new(source, Duration::from_secs(60));
        let reader = poller.reader();
        let cancel = CancellationToken::new();
        let handle = poller.spawn(cancel.clone());

        started_rx.await.unwrap();
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(reader.latest().is_none());
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let (source, calls) = ScriptedSource::new(vec![]);
        let poller = Poller::new(source, Duration::from_secs(60));
        let cancel = CancellationToken::new();
        cancel.cancel();

        poller.run(cancel).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
