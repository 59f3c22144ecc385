//! Poll coordinator: queues, worker pool and backoff sleepers.
//!
//! ```text
//! seed ─► pending ─► worker(poll) ─┬─► measurements ─► state monitor
//!            ▲                     └─► complete ─► dispatcher
//!            └──────── sleeper(backoff) ◄───────────────┘
//! ```
//!
//! Both queues are unbounded. The pipeline has no natural end; it runs until
//! the shutdown token is cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use diskprobe_core::{Config, Measurement, MeasurementSource, PathTask};

use crate::backoff::BackoffPolicy;
use crate::poller::{schedule_next, PendingSender, Poller};
use crate::store::{spawn_state_monitor, DiskStatus, StatusSender};

type PendingReceiver = Arc<Mutex<mpsc::UnboundedReceiver<PathTask>>>;

pub struct PollCoordinator {
    source: Arc<dyn MeasurementSource>,
    pollers: usize,
    policy: BackoffPolicy,
    measure_timeout: Duration,
    status_interval: Duration,
}

impl PollCoordinator {
    pub fn new(source: Arc<dyn MeasurementSource>, config: &Config) -> Self {
        Self {
            source,
            pollers: config.pollers(),
            policy: BackoffPolicy::from_config(config),
            measure_timeout: config.measure_timeout(),
            status_interval: config.status_interval(),
        }
    }

    /// Start the state monitor, the workers and the dispatcher, then seed one
    /// task per path.
    pub fn spawn<I, P>(self, paths: I, shutdown: CancellationToken) -> PipelineHandle
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let (status_tx, status, monitor) =
            spawn_state_monitor(self.status_interval, shutdown.clone());
        let (pending_tx, pending_rx) = mpsc::unbounded_channel::<PathTask>();
        let (complete_tx, complete_rx) = mpsc::unbounded_channel::<PathTask>();
        let pending_rx: PendingReceiver = Arc::new(Mutex::new(pending_rx));

        tracing::info!(
            pollers = self.pollers,
            source = %self.source.name(),
            poll_interval_secs = self.policy.base_interval().as_secs(),
            measure_timeout_secs = self.measure_timeout.as_secs(),
            "Poll coordinator started"
        );

        let poller = Poller::new(self.source, self.measure_timeout);
        let mut tasks = Vec::with_capacity(self.pollers + 2);
        tasks.push(monitor);

        for worker_id in 0..self.pollers {
            tasks.push(tokio::spawn(run_worker(
                worker_id,
                poller.clone(),
                pending_rx.clone(),
                status_tx.clone(),
                complete_tx.clone(),
                shutdown.clone(),
            )));
        }

        tasks.push(tokio::spawn(dispatch_completed(
            complete_rx,
            self.policy,
            pending_tx.clone(),
            shutdown.clone(),
        )));

        for path in paths {
            let task = PathTask::new(path);
            tracing::info!(path = %task.path(), "Seeding path task");
            if let Err(e) = pending_tx.send(task) {
                tracing::error!(path = %e.0.path(), "Pending queue closed before seeding");
            }
        }

        PipelineHandle {
            status,
            shutdown,
            tasks,
        }
    }
}

/// Running pipeline: read access to the state and a way to stop it.
pub struct PipelineHandle {
    status: DiskStatus,
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl PipelineHandle {
    pub fn status(&self) -> DiskStatus {
        self.status.clone()
    }

    /// Cancel the pipeline and wait for the monitor, workers and dispatcher.
    /// Backoff sleepers observe the same token and exit on their own.
    pub async fn shutdown(self) {
        tracing::info!("Shutting down poll pipeline");
        self.shutdown.cancel();
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Pipeline task ended abnormally");
            }
        }
        tracing::info!("Poll pipeline stopped");
    }
}

async fn run_worker(
    worker_id: usize,
    poller: Poller,
    pending: PendingReceiver,
    status_tx: StatusSender,
    complete_tx: mpsc::UnboundedSender<PathTask>,
    shutdown: CancellationToken,
) {
    tracing::debug!(worker_id, "Poller worker started");

    loop {
        let next = tokio::select! {
            _ = shutdown.cancelled() => break,
            task = recv_pending(&pending) => task,
        };
        let Some(mut task) = next else {
            break;
        };

        let result = tokio::select! {
            _ = shutdown.cancelled() => break,
            result = poller.poll(&mut task) => result,
        };

        if let Ok(bytes) = result {
            tracing::debug!(worker_id, path = %task.path(), bytes, "Disk usage measured");
            if status_tx.send(Measurement::new(task.path(), bytes)).is_err() {
                tracing::warn!(worker_id, "State monitor closed, stopping worker");
                break;
            }
        }

        if complete_tx.send(task).is_err() {
            tracing::warn!(worker_id, "Complete queue closed, stopping worker");
            break;
        }
    }

    tracing::debug!(worker_id, "Poller worker stopped");
}

async fn recv_pending(pending: &Mutex<mpsc::UnboundedReceiver<PathTask>>) -> Option<PathTask> {
    pending.lock().await.recv().await
}

async fn dispatch_completed(
    mut complete: mpsc::UnboundedReceiver<PathTask>,
    policy: BackoffPolicy,
    pending: PendingSender,
    shutdown: CancellationToken,
) {
    loop {
        let task = tokio::select! {
            _ = shutdown.cancelled() => break,
            task = complete.recv() => match task {
                Some(task) => task,
                None => break,
            },
        };
        tokio::spawn(schedule_next(
            task,
            policy,
            pending.clone(),
            shutdown.clone(),
        ));
    }
}
