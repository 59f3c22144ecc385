//! Server startup and graceful shutdown

use anyhow::{Context, Result};
use axum::Router;
use diskprobe_core::Config;
use tokio_util::sync::CancellationToken;

/// Start the server with graceful shutdown.
///
/// `shutdown` is cancelled once a termination signal arrives, so the poll
/// pipeline stops together with the HTTP server.
pub async fn start_server(config: &Config, app: Router, shutdown: CancellationToken) -> Result<()> {
    let addr = config.listen_addr();
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        path = %config.target_path(),
        threshold_bytes = config.threshold_bytes(),
        override_enabled = config.override_enabled(),
        pollers = config.pollers(),
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    Ok(())
}

/// Signal handler for graceful shutdown
///
/// Resolves on Ctrl+C (SIGINT), SIGTERM, or when `shutdown` is cancelled
/// elsewhere, and cancels `shutdown` in every case.
///
/// # Panics
/// - Panics if Ctrl+C signal handler cannot be installed (unrecoverable system error)
/// - On Unix systems, panics if SIGTERM signal handler cannot be installed (unrecoverable system error)
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
        _ = shutdown.cancelled() => {
            tracing::info!("Shutdown requested");
        },
    }

    tracing::info!("Shutting down gracefully...");
    shutdown.cancel();
}
