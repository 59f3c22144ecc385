//! Application state shared with HTTP handlers.

use diskprobe_core::Config;
use diskprobe_worker::DiskStatus;

/// Immutable configuration plus a read handle on the disk state table.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub status: DiskStatus,
}

impl AppState {
    pub fn new(config: Config, status: DiskStatus) -> Self {
        Self { config, status }
    }
}
