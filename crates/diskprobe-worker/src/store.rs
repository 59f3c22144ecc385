//! Disk state table.
//!
//! The table is written by exactly one task, the state monitor loop spawned by
//! [`spawn_state_monitor`]. Everything else gets a [`DiskStatus`] handle, which
//! can only read. Writes hold the exclusive lock for a single map insert.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use diskprobe_core::Measurement;

/// Sending half of the state monitor's update channel.
pub type StatusSender = mpsc::UnboundedSender<Measurement>;

/// Read handle on the last known bytes per path.
#[derive(Clone, Default)]
pub struct DiskStatus {
    table: Arc<RwLock<HashMap<String, u64>>>,
}

impl DiskStatus {
    /// Last measured bytes for `path`, or `None` if nothing was recorded yet.
    pub async fn get(&self, path: &str) -> Option<u64> {
        self.table.read().await.get(path).copied()
    }

    /// Consistent copy of the whole table, ordered by path.
    pub async fn snapshot(&self) -> BTreeMap<String, u64> {
        self.table
            .read()
            .await
            .iter()
            .map(|(path, bytes)| (path.clone(), *bytes))
            .collect()
    }

    /// Number of paths with a recorded measurement.
    pub async fn len(&self) -> usize {
        self.table.read().await.len()
    }

    /// True until the first measurement has been applied.
    pub async fn is_empty(&self) -> bool {
        self.table.read().await.is_empty()
    }

    async fn apply(&self, measurement: Measurement) {
        let Measurement { path, bytes } = measurement;
        self.table.write().await.insert(path, bytes);
    }
}

/// Spawn the state monitor loop.
///
/// The loop upserts every received [`Measurement`] and logs a snapshot of the
/// table every `status_interval`. Both triggers are handled one at a time in
/// the order they are received. It stops when `shutdown` is cancelled or when
/// every [`StatusSender`] has been dropped.
pub fn spawn_state_monitor(
    status_interval: Duration,
    shutdown: CancellationToken,
) -> (StatusSender, DiskStatus, JoinHandle<()>) {
    spawn_state_monitor_with_sink(status_interval, shutdown, log_snapshot)
}

/// Like [`spawn_state_monitor`], with every tick's snapshot handed to `sink`.
pub(crate) fn spawn_state_monitor_with_sink<F>(
    status_interval: Duration,
    shutdown: CancellationToken,
    sink: F,
) -> (StatusSender, DiskStatus, JoinHandle<()>)
where
    F: FnMut(&BTreeMap<String, u64>) + Send + 'static,
{
    let (updates_tx, updates_rx) = mpsc::unbounded_channel();
    let status = DiskStatus::default();

    let handle = tokio::spawn(run_state_monitor(
        status.clone(),
        updates_rx,
        status_interval,
        shutdown,
        sink,
    ));

    (updates_tx, status, handle)
}

async fn run_state_monitor<F>(
    status: DiskStatus,
    mut updates: mpsc::UnboundedReceiver<Measurement>,
    status_interval: Duration,
    shutdown: CancellationToken,
    mut sink: F,
) where
    F: FnMut(&BTreeMap<String, u64>) + Send + 'static,
{
    let mut ticker = interval_at(Instant::now() + status_interval, status_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        status_interval_secs = status_interval.as_secs(),
        "State monitor started"
    );

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("State monitor shutting down");
                break;
            }
            _ = ticker.tick() => {
                let snapshot = status.snapshot().await;
                sink(&snapshot);
            }
            update = updates.recv() => match update {
                Some(measurement) => {
                    tracing::debug!(
                        path = %measurement.path,
                        bytes = measurement.bytes,
                        "Applying measurement"
                    );
                    status.apply(measurement).await;
                }
                None => {
                    tracing::info!("All measurement senders dropped, state monitor stopping");
                    break;
                }
            },
        }
    }
}

fn log_snapshot(snapshot: &BTreeMap<String, u64>) {
    tracing::info!(paths = snapshot.len(), "Current state");
    for (path, bytes) in snapshot {
        tracing::info!(path = %path, bytes = *bytes, "Disk usage");
    }
}
