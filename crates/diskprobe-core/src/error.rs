//! Error types module
//!
//! `MeasurementError` covers everything that can go wrong while asking a
//! measurement source for the disk usage of a path. All of its variants are
//! retryable: the poller records them against the task and backs off.
//! `ConfigError` is reported once at startup.

use std::io;
use std::num::ParseIntError;
use std::time::Duration;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Warning level - for recoverable issues like a slow or failing tool
    Warn,
    /// Error level - for failures that usually need an operator
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum MeasurementError {
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    ToolFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("Malformed measurement output: {0:?}")]
    MalformedOutput(String),

    #[error("Invalid byte count {value:?}: {source}")]
    InvalidByteCount {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Measurement timed out after {0:?}")]
    Timeout(Duration),

    #[error("Measurement source unavailable: {0}")]
    Unavailable(String),
}

impl MeasurementError {
    /// Machine-readable error code (e.g., "MEASUREMENT_TIMEOUT")
    pub fn error_code(&self) -> &'static str {
        match self {
            MeasurementError::Spawn { .. } => "MEASUREMENT_SPAWN_FAILED",
            MeasurementError::ToolFailed { .. } => "MEASUREMENT_TOOL_FAILED",
            MeasurementError::MalformedOutput(_) => "MEASUREMENT_MALFORMED_OUTPUT",
            MeasurementError::InvalidByteCount { .. } => "MEASUREMENT_INVALID_BYTE_COUNT",
            MeasurementError::Timeout(_) => "MEASUREMENT_TIMEOUT",
            MeasurementError::Unavailable(_) => "MEASUREMENT_UNAVAILABLE",
        }
    }

    /// Whether the poller should retry after this error. Every measurement
    /// failure is retryable; persistent ones only grow the backoff delay.
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// Log level for this error
    pub fn log_level(&self) -> LogLevel {
        match self {
            // A missing binary or garbage output will not fix itself.
            MeasurementError::Spawn { .. }
            | MeasurementError::MalformedOutput(_)
            | MeasurementError::InvalidByteCount { .. } => LogLevel::Error,
            MeasurementError::ToolFailed { .. }
            | MeasurementError::Timeout(_)
            | MeasurementError::Unavailable(_) => LogLevel::Warn,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {field} {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Invalid listen address {addr:?}: {reason}")]
    InvalidListenAddr { addr: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
