//! computest-sim
//!
//! Runs the simulated compute API. Configuration comes from
//! `COMPUTEST_SIM_*` environment variables; see [`SimConfig::from_env`].

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use computest_sim::{api, AppState, SimConfig};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "computest-sim", version, about = "Simulated compute servers API")]
struct Args {
    /// Log output format.
    #[arg(long, value_enum, default_value = "text", env = "COMPUTEST_SIM_LOG_FORMAT")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = SimConfig::from_env().context("invalid simulator configuration")?;

    // Prefer RUST_LOG, fall back to COMPUTEST_SIM_LOG_LEVEL
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into());
    let registry = tracing_subscriber::registry().with(filter);
    match args.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    info!(
        listen_addr = %config.listen_addr,
        max_microversion = %config.max_microversion,
        hosts = ?config.hosts,
        "Starting compute simulator"
    );
    for identity in &config.identities {
        info!(
            token = %identity.token,
            project_id = %identity.project_id,
            admin = identity.admin,
            "Seeded credential"
        );
    }
    info!(images = ?config.images, "Seeded images");

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    let app = api::create_router(AppState::new(config));

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Received shutdown signal");
        })
        .await;

    match result {
        Ok(()) => info!("Simulator shutdown complete"),
        Err(e) => {
            error!(error = %e, "Server error");
            return Err(e.into());
        }
    }
    Ok(())
}
