//! Background eviction of abandoned OAuth states.

use std::time::Duration;

use chrono::Utc;
use log::*;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::PendingStateCache;
use crate::error::{sweeper_error, Error, ErrorKind, SweeperErrorKind};

/// How often the sweeper evicts expired states by default.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Owned background task that periodically calls [`PendingStateCache::sweep`].
///
/// The task runs until [`stop`](Self::stop) is called or the sweeper is dropped.
pub struct StateSweeper {
    cache: PendingStateCache,
    interval: Duration,
    cancellation_token: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl StateSweeper {
    pub fn new(cache: PendingStateCache, interval: Duration) -> Self {
        Self {
            cache,
            interval,
            cancellation_token: CancellationToken::new(),
            task_handle: None,
        }
    }

    /// Spawn the sweep loop on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the sweeper is already running.
    pub fn start(&mut self) -> Result<(), Error> {
        if self.is_running() {
            return Err(sweeper_error(
                SweeperErrorKind::AlreadyRunning,
                "State sweeper already running",
            ));
        }

        info!(
            "Starting OAuth state sweeper (interval: {}s, max age: {}s)",
            self.interval.as_secs(),
            self.cache.ttl().num_seconds()
        );

        // Fresh token so the sweeper can be restarted after a stop
        self.cancellation_token = CancellationToken::new();

        let cache = self.cache.clone();
        let interval = self.interval;
        let cancel = self.cancellation_token.clone();

        self.task_handle = Some(tokio::spawn(async move {
            Self::sweep_loop(cache, interval, cancel).await;
        }));

        Ok(())
    }

    /// Cancel the sweep loop and wait for it to finish.
    ///
    /// Stopping a sweeper that is not running is a no-op.
    pub async fn stop(&mut self) -> Result<(), Error> {
        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.take() {
            handle.await.map_err(|e| {
                warn!("OAuth state sweeper task failed: {e}");
                Error {
                    source: Some(Box::new(e)),
                    error_kind: ErrorKind::Sweeper(SweeperErrorKind::JoinFailed),
                }
            })?;
            info!("OAuth state sweeper stopped");
        }

        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.task_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    async fn sweep_loop(cache: PendingStateCache, interval: Duration, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("OAuth state sweep loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    let removed = cache.sweep(Utc::now());
                    if removed > 0 {
                        debug!("Evicted {removed} expired OAuth states, {} pending", cache.len());
                    }
                }
            }
        }
    }
}

impl Drop for StateSweeper {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[tokio::test]
    async fn test_sweeper_evicts_expired_states() {
        let cache = PendingStateCache::new();
        let stale = Utc::now() - ChronoDuration::minutes(11);
        cache.begin_at("http://a".to_string(), "127.0.0.1".to_string(), stale);
        let fresh = cache.begin("http://b".to_string(), "127.0.0.1".to_string());

        let mut sweeper = StateSweeper::new(cache.clone(), Duration::from_millis(20));
        sweeper.start().unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        sweeper.stop().await.unwrap();

        assert_eq!(cache.len(), 1);
        assert!(cache.consume(&fresh).is_some());
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let mut sweeper = StateSweeper::new(PendingStateCache::new(), DEFAULT_SWEEP_INTERVAL);
        sweeper.start().unwrap();

        let err = sweeper.start().unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Sweeper(SweeperErrorKind::AlreadyRunning)
        );

        sweeper.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_then_restart() {
        let mut sweeper = StateSweeper::new(PendingStateCache::new(), DEFAULT_SWEEP_INTERVAL);
        sweeper.start().unwrap();
        assert!(sweeper.is_running());

        sweeper.stop().await.unwrap();
        assert!(!sweeper.is_running());

        sweeper.start().unwrap();
        assert!(sweeper.is_running());
        sweeper.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let mut sweeper = StateSweeper::new(PendingStateCache::new(), DEFAULT_SWEEP_INTERVAL);
        assert!(sweeper.stop().await.is_ok());
    }
}
