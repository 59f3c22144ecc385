//! Application setup: poll pipeline, state and router.

pub mod routes;
pub mod server;

use std::sync::Arc;

use axum::Router;
use diskprobe_core::{Config, MeasurementSource};
use diskprobe_infra::DuMeasurementSource;
use diskprobe_worker::{PipelineHandle, PollCoordinator};
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

/// Start the `du`-backed pipeline for the configured path and build the router.
pub fn initialize_app(config: Config, shutdown: CancellationToken) -> (PipelineHandle, Router) {
    initialize_app_with_source(config, Arc::new(DuMeasurementSource::default()), shutdown)
}

/// Same as [`initialize_app`] with an explicit measurement source.
pub fn initialize_app_with_source(
    config: Config,
    source: Arc<dyn MeasurementSource>,
    shutdown: CancellationToken,
) -> (PipelineHandle, Router) {
    let pipeline =
        PollCoordinator::new(source, &config).spawn([config.target_path()], shutdown);

    let state = Arc::new(AppState::new(config, pipeline.status()));
    let router = routes::build_router(state);

    (pipeline, router)
}
