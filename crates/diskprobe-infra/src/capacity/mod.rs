//! Disk usage measurement
//!
//! This module provides the `du`-backed measurement source used in production.

pub use du::DuMeasurementSource;

mod du;
