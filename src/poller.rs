//! Background status polling for in-progress scans.
//!
//! One `StatusPoller` runs per open scan view. It fetches the status
//! record once immediately, then every five seconds for as long as the
//! last observed status is non-terminal. The hosting view reads the
//! latest record through a watch channel; dropping the poller cancels
//! the loop before another can be started for a different scan.

use std::sync::Arc;

use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::models::ScanStatus;

/// Fixed poll period. Five seconds keeps the view fresh without
/// hammering the API.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Fetch seam for the poller, so tests can script status sequences
/// without a server.
pub trait StatusFetch: Send + Sync {
    fn fetch_status(&self, scan_uuid: &str) -> BoxFuture<'static, Result<ScanStatus>>;
}

impl StatusFetch for ApiClient {
    fn fetch_status(&self, scan_uuid: &str) -> BoxFuture<'static, Result<ScanStatus>> {
        let client = self.clone();
        let scan_uuid = scan_uuid.to_string();
        async move { client.fetch_scan_status(&scan_uuid).await }.boxed()
    }
}

/// Handle to one polling loop. Owns the timer: dropping this cancels
/// the token and aborts the task, so no orphaned timer can keep firing
/// against a stale scan id.
pub struct StatusPoller {
    scan_uuid: String,
    status_rx: watch::Receiver<Option<ScanStatus>>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl StatusPoller {
    /// Start polling the given scan. Issues the first fetch right away;
    /// interval ticks begin one period later.
    pub fn spawn(fetcher: Arc<dyn StatusFetch>, scan_uuid: impl Into<String>) -> Self {
        let scan_uuid = scan_uuid.into();
        let (status_tx, status_rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(poll_loop(
            fetcher,
            scan_uuid.clone(),
            status_tx,
            cancel.clone(),
        ));

        Self {
            scan_uuid,
            status_rx,
            cancel,
            handle,
        }
    }

    pub fn scan_uuid(&self) -> &str {
        &self.scan_uuid
    }

    /// Latest fetched record. Stays available after the loop has
    /// stopped; a terminal snapshot is never cleared.
    pub fn status(&self) -> Option<ScanStatus> {
        self.status_rx.borrow().clone()
    }

    /// True once the loop has exited (terminal status observed).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

async fn poll_loop(
    fetcher: Arc<dyn StatusFetch>,
    scan_uuid: String,
    status_tx: watch::Sender<Option<ScanStatus>>,
    cancel: CancellationToken,
) {
    // Immediate fetch on spawn, before any interval tick.
    tokio::select! {
        _ = cancel.cancelled() => return,
        _ = fetch_once(fetcher.as_ref(), &scan_uuid, &status_tx) => {}
    }

    // First tick lands one period after the immediate fetch.
    let mut ticker = interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                // The terminal check reads the current record at tick
                // time, not a snapshot captured when the timer was
                // created.
                let finished = status_tx
                    .borrow()
                    .as_ref()
                    .is_some_and(|s| s.status.is_terminal());
                if finished {
                    debug!(scan = %scan_uuid, "Scan reached a terminal state, polling stopped");
                    break;
                }
                fetch_once(fetcher.as_ref(), &scan_uuid, &status_tx).await;
            }
        }
    }
}

async fn fetch_once(
    fetcher: &dyn StatusFetch,
    scan_uuid: &str,
    status_tx: &watch::Sender<Option<ScanStatus>>,
) {
    match fetcher.fetch_status(scan_uuid).await {
        Ok(status) => {
            status_tx.send_replace(Some(status));
        }
        Err(e) => {
            // Keep the previous record and stay on schedule.
            warn!(scan = %scan_uuid, error = %e, "Status fetch failed, retrying next tick");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScanState;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns one scripted status per call, repeating the last entry,
    /// and counts calls.
    struct ScriptedFetch {
        calls: AtomicUsize,
        script: Vec<ScanState>,
    }

    impl ScriptedFetch {
        fn new(script: Vec<ScanState>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                script,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl StatusFetch for ScriptedFetch {
        fn fetch_status(&self, _scan_uuid: &str) -> BoxFuture<'static, Result<ScanStatus>> {
            let i = self.calls.fetch_add(1, Ordering::SeqCst);
            let state = *self
                .script
                .get(i)
                .or_else(|| self.script.last())
                .unwrap_or(&ScanState::Unknown);
            async move {
                Ok(ScanStatus {
                    status: state,
                    scan_type: Some("full".to_string()),
                    total_urls: Some(10),
                    created_at: None,
                })
            }
            .boxed()
        }
    }

    /// Fetch that always fails, for the retry-on-schedule path.
    struct FailingFetch {
        calls: AtomicUsize,
    }

    impl StatusFetch for FailingFetch {
        fn fetch_status(&self, _scan_uuid: &str) -> BoxFuture<'static, Result<ScanStatus>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(anyhow::anyhow!("connection refused")) }.boxed()
        }
    }

    /// Let spawned tasks run until they are parked on timers again.
    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    async fn tick(duration: Duration) {
        tokio::time::advance(duration).await;
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_once_immediately_on_spawn() {
        let fetcher = ScriptedFetch::new(vec![ScanState::Running]);
        let _poller = StatusPoller::spawn(fetcher.clone(), "scan-1");
        settle().await;
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_while_running_then_stops_after_completed() {
        let fetcher = ScriptedFetch::new(vec![
            ScanState::Running,
            ScanState::Running,
            ScanState::Completed,
        ]);
        let poller = StatusPoller::spawn(fetcher.clone(), "scan-1");
        settle().await;
        assert_eq!(fetcher.calls(), 1);

        tick(POLL_INTERVAL).await;
        assert_eq!(fetcher.calls(), 2);

        tick(POLL_INTERVAL).await;
        assert_eq!(fetcher.calls(), 3);

        // completed was observed: the next tick stops the loop without
        // fetching, and later ticks never fire.
        tick(POLL_INTERVAL).await;
        assert_eq!(fetcher.calls(), 3);
        assert!(poller.is_finished());

        tick(POLL_INTERVAL).await;
        tick(POLL_INTERVAL).await;
        assert_eq!(fetcher.calls(), 3);

        // The terminal snapshot stays visible.
        let last = poller.status().expect("last record should remain");
        assert_eq!(last.status, ScanState::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_then_failed_sequence_fetch_times() {
        // Statuses [queued, running, running, failed] observed at
        // t = 0, 5, 10, 15 seconds; nothing after 15.
        let fetcher = ScriptedFetch::new(vec![
            ScanState::Queued,
            ScanState::Running,
            ScanState::Running,
            ScanState::Failed,
        ]);
        let poller = StatusPoller::spawn(fetcher.clone(), "scan-1");
        settle().await;
        assert_eq!(fetcher.calls(), 1); // t=0

        tick(POLL_INTERVAL).await;
        assert_eq!(fetcher.calls(), 2); // t=5

        tick(POLL_INTERVAL).await;
        assert_eq!(fetcher.calls(), 3); // t=10

        tick(POLL_INTERVAL).await;
        assert_eq!(fetcher.calls(), 4); // t=15

        for _ in 0..4 {
            tick(POLL_INTERVAL).await;
        }
        assert_eq!(fetcher.calls(), 4);

        let last = poller.status().expect("last record should remain");
        assert_eq!(last.status, ScanState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_on_first_fetch_never_ticks() {
        let fetcher = ScriptedFetch::new(vec![ScanState::Completed]);
        let poller = StatusPoller::spawn(fetcher.clone(), "scan-1");
        settle().await;
        assert_eq!(fetcher.calls(), 1);

        tick(POLL_INTERVAL).await;
        tick(POLL_INTERVAL).await;
        assert_eq!(fetcher.calls(), 1);
        assert!(poller.is_finished());
        assert_eq!(
            poller.status().map(|s| s.status),
            Some(ScanState::Completed)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timer() {
        let fetcher = ScriptedFetch::new(vec![ScanState::Running]);
        let poller = StatusPoller::spawn(fetcher.clone(), "scan-1");
        settle().await;
        assert_eq!(fetcher.calls(), 1);

        drop(poller);
        settle().await;

        // Advancing well past several periods produces no further fetches.
        for _ in 0..5 {
            tick(POLL_INTERVAL).await;
        }
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failures_keep_schedule_and_record() {
        let fetcher = Arc::new(FailingFetch {
            calls: AtomicUsize::new(0),
        });
        let poller = StatusPoller::spawn(fetcher.clone(), "scan-1");
        settle().await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(poller.status().is_none());

        tick(POLL_INTERVAL).await;
        tick(POLL_INTERVAL).await;
        // No backoff, no cap: one attempt per tick.
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
        assert!(poller.status().is_none());
        assert!(!poller.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_replacing_poller_switches_scans_cleanly() {
        let first = ScriptedFetch::new(vec![ScanState::Running]);
        let second = ScriptedFetch::new(vec![ScanState::Running]);

        let poller = StatusPoller::spawn(first.clone(), "scan-1");
        settle().await;
        assert_eq!(first.calls(), 1);

        // Switching scan ids: the old loop is cancelled before the new
        // one starts.
        drop(poller);
        let poller = StatusPoller::spawn(second.clone(), "scan-2");
        settle().await;
        assert_eq!(second.calls(), 1);
        assert_eq!(poller.scan_uuid(), "scan-2");

        tick(POLL_INTERVAL).await;
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 2);
    }
}
