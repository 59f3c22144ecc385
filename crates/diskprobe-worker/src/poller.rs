//! Poller: turns a [`PathTask`] into a byte count and reschedules it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use diskprobe_core::{LogLevel, MeasurementError, MeasurementSource, PathTask};

use crate::backoff::BackoffPolicy;

pub type PendingSender = mpsc::UnboundedSender<PathTask>;

#[derive(Clone)]
pub struct Poller {
    source: Arc<dyn MeasurementSource>,
    timeout: Duration,
}

impl Poller {
    pub fn new(source: Arc<dyn MeasurementSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Measure `task.path`, bounded by the configured timeout.
    ///
    /// On success the task's error streak is reset; on failure it grows by one
    /// and the error is returned for logging. Failures never escape the task.
    #[tracing::instrument(
        skip(self, task),
        fields(path = %task.path(), source = %self.source.name())
    )]
    pub async fn poll(&self, task: &mut PathTask) -> Result<u64, MeasurementError> {
        let result = match tokio::time::timeout(self.timeout, self.source.measure(task.path())).await
        {
            Ok(result) => result,
            Err(_) => Err(MeasurementError::Timeout(self.timeout)),
        };

        match result {
            Ok(bytes) => {
                task.record_success();
                Ok(bytes)
            }
            Err(e) => {
                task.record_failure();
                log_poll_failure(task, &e);
                Err(e)
            }
        }
    }
}

fn log_poll_failure(task: &PathTask, e: &MeasurementError) {
    let consecutive_errors = task.consecutive_error_count();
    match e.log_level() {
        LogLevel::Warn => tracing::warn!(
            error = %e,
            error_code = e.error_code(),
            consecutive_errors,
            "Disk usage measurement failed"
        ),
        LogLevel::Error => tracing::error!(
            error = %e,
            error_code = e.error_code(),
            consecutive_errors,
            "Disk usage measurement failed"
        ),
    }
}

/// Wait out the backoff delay for `task`, then hand it back to `pending`.
///
/// Returns without resubmitting if `shutdown` fires first or the pending
/// queue is closed.
pub async fn schedule_next(
    task: PathTask,
    policy: BackoffPolicy,
    pending: PendingSender,
    shutdown: CancellationToken,
) {
    let delay = policy.delay_for(task.consecutive_error_count());
    tracing::debug!(
        path = %task.path(),
        consecutive_errors = task.consecutive_error_count(),
        delay_secs = delay.as_secs(),
        "Scheduling next poll"
    );

    tokio::select! {
        _ = shutdown.cancelled() => {}
        _ = tokio::time::sleep(delay) => {
            if let Err(e) = pending.send(task) {
                tracing::warn!(path = %e.0.path(), "Pending queue closed, dropping task");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSource(u64);

    #[async_trait]
    impl MeasurementSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn measure(&self, _path: &str) -> Result<u64, MeasurementError> {
            Ok(self.0)
        }
    }

    struct FailingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MeasurementSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn measure(&self, _path: &str) -> Result<u64, MeasurementError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(MeasurementError::Unavailable("test".to_string()))
        }
    }

    struct StalledSource;

    #[async_trait]
    impl MeasurementSource for StalledSource {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn measure(&self, _path: &str) -> Result<u64, MeasurementError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_poll_success_resets_errors() {
        let poller = Poller::new(Arc::new(FixedSource(4096)), Duration::from_secs(5));
        let mut task = PathTask::new("/mnt/storage");
        task.record_failure();
        task.record_failure();

        assert_eq!(poller.poll(&mut task).await.unwrap(), 4096);
        assert_eq!(task.consecutive_error_count(), 0);
    }

    #[tokio::test]
    async fn test_poll_failure_increments_errors() {
        let source = Arc::new(FailingSource {
            calls: AtomicUsize::new(0),
        });
        let poller = Poller::new(source.clone(), Duration::from_secs(5));
        let mut task = PathTask::new("/mnt/storage");

        for expected in 1..=3 {
            assert!(poller.poll(&mut task).await.is_err());
            assert_eq!(task.consecutive_error_count(), expected);
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_times_out_stalled_source() {
        let timeout = Duration::from_secs(30);
        let poller = Poller::new(Arc::new(StalledSource), timeout);
        let mut task = PathTask::new("/mnt/storage");

        let err = poller.poll(&mut task).await.unwrap_err();
        assert!(matches!(err, MeasurementError::Timeout(t) if t == timeout));
        assert_eq!(task.consecutive_error_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_next_waits_backoff_delay() {
        let policy = BackoffPolicy::new(Duration::from_secs(60), Duration::from_secs(10));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut task = PathTask::new("/mnt/storage");
        task.record_failure();
        task.record_failure();

        let start = tokio::time::Instant::now();
        tokio::spawn(schedule_next(task, policy, tx, CancellationToken::new()));

        let task = rx.recv().await.expect("task resubmitted");
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(80), "resubmitted after {elapsed:?}");
        assert!(elapsed < Duration::from_secs(81), "resubmitted after {elapsed:?}");
        assert_eq!(task.consecutive_error_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_next_stops_on_shutdown() {
        let policy = BackoffPolicy::new(Duration::from_secs(60), Duration::from_secs(10));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(schedule_next(
            PathTask::new("/mnt/storage"),
            policy,
            tx,
            shutdown.clone(),
        ));
        shutdown.cancel();
        handle.await.unwrap();

        assert!(rx.recv().await.is_none());
    }
}
