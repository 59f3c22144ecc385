//! Diskprobe Infrastructure Library
//!
//! This crate provides the infrastructure components used by the probe:
//! - Telemetry initialization (tracing subscriber)
//! - Disk usage measurement backed by `du`

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "capacity")]
pub mod capacity;

// Re-export commonly used types
#[cfg(feature = "observability-basic")]
pub use telemetry::init_telemetry;

#[cfg(feature = "capacity")]
pub use capacity::DuMeasurementSource;
