//! RetailCRM gateway binary.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use crm_gateway::config::load_config;
use crm_gateway::observability::{logging, metrics};
use crm_gateway::{CrmClient, HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "crm-gateway", version, about = "HTTP gateway for the RetailCRM API")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!("crm-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        crm_base_url = %config.crm.base_url(),
        rate_limit_enabled = config.rate_limit.enabled,
        max_retries = config.retries.max_retries,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let client = Arc::new(CrmClient::from_config(&config)?);

    // Credentials and reachability check; the gateway still starts on failure.
    match client.probe().await {
        Ok(()) => tracing::info!("CRM API reachable"),
        Err(e) => tracing::warn!(error = %e, "CRM API probe failed"),
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    shutdown.trigger_on_signal();
    HttpServer::new(client.clone()).run(listener, stop).await?;

    drop(client);
    tracing::info!("Shutdown complete");
    Ok(())
}
