//! # Pushgate
//!
//! Authenticated receiver for pub/sub push notifications.
//!
//! Configuration comes from the environment; see [`GatewayConfig::from_env`]
//! and [`TelemetryConfig::from_env`] for the recognised variables.

use anyhow::{Context, Result};
use pg_02_push_gateway::{GatewayConfig, PushGatewayService};
use pg_runtime::build_receiver;
use pg_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    let _guard = init_telemetry(&telemetry).context("failed to initialise telemetry")?;

    let config = GatewayConfig::from_env().context("invalid configuration")?;
    config.validate().context("invalid configuration")?;

    let receiver = build_receiver(&config)
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to construct adapters")?;

    let mut gateway = PushGatewayService::new(config, receiver)?;
    let addr = gateway.start().await?;

    info!(%addr, "Pushgate is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    gateway.shutdown().await?;
    Ok(())
}
