//! Test helpers: build configs, seeded state tables and test servers.
//!
//! Run from workspace root: `cargo test -p diskprobe-api`.

#![allow(dead_code)] // Each test binary uses a different subset of helpers

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use diskprobe_api::setup::routes::build_router;
use diskprobe_api::AppState;
use diskprobe_core::{Config, Measurement, MeasurementError, MeasurementSource};
use diskprobe_worker::{spawn_state_monitor, DiskStatus};
use tokio_util::sync::CancellationToken;

pub const TEST_PATH: &str = "/mnt/storage";
pub const TEST_THRESHOLD: u64 = 1_000_000;

pub fn test_config(override_enabled: bool) -> Config {
    let threshold = TEST_THRESHOLD.to_string();
    let mut args = vec![
        "diskprobe",
        "--path",
        TEST_PATH,
        "--threshold",
        threshold.as_str(),
        "--addr",
        "127.0.0.1:0",
    ];
    if override_enabled {
        args.push("--override");
    }
    Config::from_args(args).expect("valid test config")
}

/// Run measurements through a real state monitor and return its read handle.
pub async fn seeded_status(entries: &[(&str, u64)]) -> DiskStatus {
    let (tx, status, handle) =
        spawn_state_monitor(Duration::from_secs(60), CancellationToken::new());
    for (path, bytes) in entries {
        tx.send(Measurement::new(*path, *bytes))
            .expect("state monitor running");
    }
    drop(tx);
    handle.await.expect("state monitor finished");
    status
}

pub fn test_server(config: Config, status: DiskStatus) -> TestServer {
    let router = build_router(Arc::new(AppState::new(config, status)));
    TestServer::new(router).expect("test server")
}

/// Always reports the same byte count.
pub struct FixedSource(pub u64);

#[async_trait]
impl MeasurementSource for FixedSource {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn measure(&self, _path: &str) -> Result<u64, MeasurementError> {
        Ok(self.0)
    }
}

/// Never succeeds.
pub struct BrokenSource;

#[async_trait]
impl MeasurementSource for BrokenSource {
    fn name(&self) -> &str {
        "broken"
    }

    async fn measure(&self, _path: &str) -> Result<u64, MeasurementError> {
        Err(MeasurementError::MalformedOutput("garbage".to_string()))
    }
}
