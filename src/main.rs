//! # Relay Gateway
//!
//! Multi-provider relay gateway with OpenAI-compatible streaming endpoints.
//!
//! ## Usage
//!
//! ```bash
//! # Start with default configuration
//! relay-gateway
//!
//! # Start with custom config file
//! relay-gateway --config /path/to/config.yaml
//!
//! # Start with environment overrides
//! GATEWAY_PORT=9000 relay-gateway
//! ```

use anyhow::Context;
use clap::Parser;
use gateway_accounts::SqlAccountStore;
use gateway_config::load_config;
use gateway_providers::{ChannelTable, ProviderRegistry};
use gateway_server::{AppState, ReqwestUpstream, Server};
use gateway_telemetry::{init_tracing, TracingConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "relay-gateway", version, about)]
struct Args {
    /// Configuration file (YAML or TOML)
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen host, overrides the configuration
    #[arg(long)]
    host: Option<String>,

    /// Listen port, overrides the configuration
    #[arg(short, long)]
    port: Option<u16>,
}

/// Application entry point
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())
        .await
        .context("failed to load configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate().context("invalid configuration")?;

    init_tracing(
        &TracingConfig::default()
            .with_log_level(&config.telemetry.log_level)
            .with_json(config.telemetry.json)
            .with_source_location(config.telemetry.source_location),
    )?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting relay gateway"
    );

    let accounts = SqlAccountStore::connect(&config.database)
        .await
        .context("failed to open account store")?;

    let providers = ProviderRegistry::builtin();
    let channels = ChannelTable::from_config(&config.channels, &providers)
        .context("invalid channel configuration")?;
    info!(
        providers = providers.len(),
        channels = channels.len(),
        "Provider registry initialized"
    );

    let upstream = ReqwestUpstream::new(config.server.upstream_timeout)?;

    let state = AppState::builder()
        .accounts(Arc::new(accounts))
        .providers(providers)
        .channels(channels)
        .upstream(Arc::new(upstream))
        .billing(config.billing.clone())
        .build()?;

    Server::new(config.server.clone(), state).run().await?;
    Ok(())
}
