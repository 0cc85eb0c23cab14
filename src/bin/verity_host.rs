//! Native-messaging host the browser extension launches.
//!
//! Reads `detectMisinformation` requests from stdin, verifies each quote,
//! and writes one response per request to stdout. All tracing output goes
//! to stderr (and optionally a log file) so stdout stays a clean protocol
//! channel.

use std::time::Duration;

use verity::bridge::run_stdio_bridge;
use verity::config::VerityConfig;
use verity::logging::init_tracing;
use verity::pipeline::VerificationPipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging is not up yet, so configuration errors go straight to stderr.
    let config = VerityConfig::load().map_err(|e| {
        eprintln!("verity-host: {e}");
        anyhow::anyhow!("invalid configuration: {e}")
    })?;

    let _log_guard = init_tracing(&config.logging)
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        framing = ?config.bridge.framing,
        searches = config.query_configs().len(),
        summarize = config.pipeline.summarize,
        "verity-host starting"
    );

    let pipeline = VerificationPipeline::from_config(&config).map_err(|e| {
        tracing::error!(error = %e, "failed to build verification pipeline");
        anyhow::anyhow!("startup failed: {e}")
    })?;

    let deadline = Duration::from_secs(config.pipeline.request_timeout_seconds);
    run_stdio_bridge(pipeline, config.bridge.framing, deadline)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "verity-host exited with error");
            anyhow::anyhow!("verity-host failed: {e}")
        })?;

    tracing::info!("verity-host shut down cleanly");
    Ok(())
}
