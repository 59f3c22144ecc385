//! Telemetry initialization
//!
//! Installs the global tracing subscriber.

mod init_basic;

pub use init_basic::init_telemetry;
