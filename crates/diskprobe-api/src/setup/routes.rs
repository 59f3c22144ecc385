use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::threshold::threshold_check;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(threshold_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
