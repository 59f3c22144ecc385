use diskprobe_api::setup;
use diskprobe_core::Config;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::load()?;

    diskprobe_infra::init_telemetry(config.log_format())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Start the poll pipeline and build the router
    let shutdown = CancellationToken::new();
    let (pipeline, router) = setup::initialize_app(config.clone(), shutdown.clone());

    // Serve until Ctrl+C / SIGTERM, then stop the pipeline
    let served = setup::server::start_server(&config, router, shutdown).await;
    pipeline.shutdown().await;
    served
}
