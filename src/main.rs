//! Solana JSON-RPC forwarding relay.
//!
//! Accepts JSON-RPC POSTs and relays them to a configured provider endpoint,
//! or, when none is configured, to a fixed sequence of public endpoints tried
//! in order. Upstream responses pass through verbatim, error statuses
//! included; only when every target fails to respond does the relay answer
//! with a 502 error envelope.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rpc_relay::config::{loader, validation, RelayConfig};
use rpc_relay::http::HttpServer;
use rpc_relay::lifecycle::{signals, Shutdown};
use rpc_relay::observability::metrics;

#[derive(Parser, Debug)]
#[command(name = "rpc-relay", about = "Solana JSON-RPC forwarding relay")]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rpc_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("rpc-relay v0.1.0 starting");

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => loader::load_config(path)?,
        None => RelayConfig::default(),
    };
    loader::apply_env_overrides(&mut config);
    if let Some(listen) = args.listen {
        config.listener.bind_address = listen;
    }
    validation::validate_config(&config).map_err(loader::ConfigError::Validation)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        provider_configured = config.upstream.provider_url.is_some(),
        fallback_count = config.upstream.fallback_urls.len(),
        attempt_timeout_ms = config.upstream.attempt_timeout_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::watch_signals(&shutdown).await;
    });

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
