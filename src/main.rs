mod config;
mod market_data;
mod persistence;
mod pipeline;
mod telemetry;

use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use market_data::adapters::GmxTickerClient;
use persistence::SnapshotStore;
use pipeline::sink::TracingSink;
use pipeline::traits::PipelineOutcome;

/// Exit status when the run never got to fetching.
const STARTUP_FAILURE: u8 = 3;

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::from_env();
    init_tracing(
        config
            .as_ref()
            .map_or(config::DEFAULT_LOG_LEVEL, |c| c.log_level.as_str()),
    );

    let outcome = match config {
        Ok(config) => run(config).await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            error!(error = %format!("{err:#}"), "gmx-price-snapshot failed to start");
            ExitCode::from(STARTUP_FAILURE)
        }
    }
}

async fn run(config: Config) -> Result<PipelineOutcome> {
    let metrics = telemetry::init_metrics().context("failed to install metrics recorder")?;

    let source = GmxTickerClient::new(
        config.feed_url.as_str(),
        config.request_timeout,
        config.price_policy,
    )
    .context("failed to build ticker client")?;
    let store = SnapshotStore::new(config.output_path);

    info!(
        network = %config.network,
        feed_url = %config.feed_url,
        output = %store.path().display(),
        policy = ?config.price_policy,
        "gmx-price-snapshot starting"
    );

    let outcome = pipeline::run_pipeline(&source, &store, &TracingSink).await;

    match &outcome {
        PipelineOutcome::Persisted(report) => info!(
            path = %report.path.display(),
            bytes = report.bytes,
            "run finished"
        ),
        PipelineOutcome::FetchFailed(err) => {
            warn!(error = %err, "run finished without a snapshot")
        }
        PipelineOutcome::PersistFailed(err) => {
            warn!(error = %err, "run finished without saving the snapshot")
        }
    }
    debug!(metrics = %telemetry::render_metrics(&metrics), "run metrics");

    Ok(outcome)
}
