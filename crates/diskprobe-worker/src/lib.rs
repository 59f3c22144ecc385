//! Diskprobe polling pipeline.
//!
//! - [`store`]: the single-writer disk state table and its read handle
//! - [`backoff`]: linear error backoff between polls
//! - [`poller`]: one measurement per task, bounded by a timeout
//! - [`coordinator`]: wires queues, workers, sleepers and the store together

pub mod backoff;
pub mod coordinator;
pub mod poller;
pub mod store;

pub use backoff::BackoffPolicy;
pub use coordinator::{PipelineHandle, PollCoordinator};
pub use poller::{schedule_next, Poller};
pub use store::{spawn_state_monitor, DiskStatus, StatusSender};
