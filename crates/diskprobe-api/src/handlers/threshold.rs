//! Threshold check handler (`GET /`).

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::state::AppState;

/// Classification of the configured path's last known disk usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThresholdStatus {
    /// No usable measurement recorded yet.
    NotCached,
    /// Usage above the threshold and no override set.
    OverThreshold { bytes: u64, threshold: u64 },
    /// Usage within the threshold, or override set.
    Ok {
        path: String,
        bytes: u64,
        override_enabled: bool,
    },
}

impl ThresholdStatus {
    /// A stored zero is treated like a missing entry.
    pub fn classify(
        path: &str,
        bytes: Option<u64>,
        threshold: u64,
        override_enabled: bool,
    ) -> Self {
        match bytes {
            None | Some(0) => ThresholdStatus::NotCached,
            Some(bytes) if bytes > threshold && !override_enabled => {
                ThresholdStatus::OverThreshold { bytes, threshold }
            }
            Some(bytes) => ThresholdStatus::Ok {
                path: path.to_string(),
                bytes,
                override_enabled,
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ThresholdStatus::NotCached => StatusCode::SERVICE_UNAVAILABLE,
            ThresholdStatus::OverThreshold { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ThresholdStatus::Ok { .. } => StatusCode::OK,
        }
    }

    pub fn body(&self) -> String {
        match self {
            ThresholdStatus::NotCached => "Disk status not cached yet".to_string(),
            ThresholdStatus::OverThreshold { bytes, threshold } => {
                format!("ERROR: Bytes exceed threshold ({}/{})", bytes, threshold)
            }
            ThresholdStatus::Ok {
                path,
                bytes,
                override_enabled,
            } => format!(
                "OK: {} is {} bytes; override set to {}\n",
                path, bytes, override_enabled
            ),
        }
    }
}

impl IntoResponse for ThresholdStatus {
    fn into_response(self) -> Response {
        (self.status_code(), self.body()).into_response()
    }
}

/// Report whether the configured path is within its disk usage threshold.
pub async fn threshold_check(State(state): State<Arc<AppState>>) -> ThresholdStatus {
    let path = state.config.target_path();
    let bytes = state.status.get(path).await;

    let status = ThresholdStatus::classify(
        path,
        bytes,
        state.config.threshold_bytes(),
        state.config.override_enabled(),
    );

    if let ThresholdStatus::OverThreshold { bytes, threshold } = &status {
        tracing::warn!(path = %path, bytes, threshold, "Disk usage exceeds threshold");
    }

    status
}
