//! Used-Car Pricer - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, ServiceConfig};
use metrics_exporter_prometheus::PrometheusBuilder;
use price_pipeline::PredictionPipeline;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::load()?;
    init_logging(config.log_json)?;

    info!("=== Used-Car Pricer v{} ===", env!("CARGO_PKG_VERSION"));

    // No artifacts, no server
    let pipeline = PredictionPipeline::load(&config.artifact_path).with_context(|| {
        format!("cannot load artifacts from {}", config.artifact_path.display())
    })?;

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;

    run_server(config, pipeline, Some(metrics)).await?;

    Ok(())
}
