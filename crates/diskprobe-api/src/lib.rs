//! Diskprobe API Library
//!
//! This crate provides the HTTP threshold endpoint and application setup.

pub mod handlers;
pub mod setup;
pub mod state;

pub use handlers::threshold::ThresholdStatus;
pub use state::AppState;
