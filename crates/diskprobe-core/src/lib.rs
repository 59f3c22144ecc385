//! Diskprobe Core Library
//!
//! This crate provides the configuration, error types, domain models and the
//! measurement source seam shared by all diskprobe components.

pub mod config;
pub mod error;
pub mod measurement_source;
pub mod models;

// Re-export commonly used types
pub use config::{Config, LogFormat, ProbeConfig};
pub use error::{ConfigError, LogLevel, MeasurementError};
pub use measurement_source::MeasurementSource;
pub use models::{Measurement, PathTask};
