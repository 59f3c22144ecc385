//! Measurement source trait for poller workers.
//!
//! Implementations report how many bytes are used under a filesystem path.
//! How the bytes are counted (external tool, syscall, library) is up to the
//! implementation; the poller bounds every call with a timeout.

use async_trait::async_trait;

use crate::error::MeasurementError;

#[async_trait]
pub trait MeasurementSource: Send + Sync {
    /// Short name used in logs (e.g. "du").
    fn name(&self) -> &str;

    /// Returns the total bytes used under `path`.
    async fn measure(&self, path: &str) -> Result<u64, MeasurementError>;
}
