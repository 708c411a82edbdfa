//! nats-loadgen - Synthetic NATS workload generator

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use loadgen_core::{final_summary, signals::wait_for_shutdown_signal, OrchestratorBuilder};
use loadgen_nats::NatsBroker;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    if cli.generate_config {
        println!("{}", cli::sample_config_json()?);
        return Ok(());
    }

    let config = cli.load_config()?;

    // RUST_LOG wins over --verbose
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli::default_log_filter(config.verbose))),
        )
        .init();

    config.validate().context("invalid configuration")?;

    tracing::info!(
        url = %config.nats_url,
        publishers = config.total_publishers(),
        "nats-loadgen starting..."
    );

    let broker = Arc::new(NatsBroker::connect(&config.nats_url).await?);

    let orchestrator = OrchestratorBuilder::new()
        .broker(broker.clone())
        .grace_period(cli.grace_period())
        .build()?;

    let stats = match cli.run_duration() {
        Some(duration) => {
            let shutdown = orchestrator.shutdown_signal();
            let signal_handle = tokio::spawn(async move {
                if wait_for_shutdown_signal().await.is_ok() {
                    tracing::info!("Received termination signal, shutting down...");
                    shutdown.fire();
                }
            });
            let result = orchestrator.run_with_timeout(&config, duration).await;
            signal_handle.abort();
            result?
        }
        None => orchestrator.run_with_signal_handling(&config).await?,
    };

    println!("{}", final_summary(&stats));

    if let Err(e) = broker.flush().await {
        tracing::warn!(error = %e, "Failed to flush pending publishes");
    }

    Ok(())
}
