//! SEO metadata edge proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────────────┐
//!                 │                         SEO PROXY                            │
//!  Client request │  ┌─────────┐   ┌────────────┐   ┌──────────────┐              │
//!  ───────────────┼─▶│  http   │──▶│  routing   │──▶│   metadata   │──────────────┼──▶ Metadata API
//!                 │  │ server  │   │ classifier │   │    client    │              │
//!                 │  └────┬────┘   └────────────┘   └──────────────┘              │
//!                 │       │                                                       │
//!                 │       ▼                                                       │
//!                 │  ┌─────────┐   ┌────────────┐   ┌──────────────┐              │
//!  ◀──────────────┼──│response │◀──│  rewrite / │◀──│    origin    │◀─────────────┼─── Origin site
//!  Client response│  │         │   │ page_data  │   │    client    │              │
//!                 │  └─────────┘   └────────────┘   └──────────────┘              │
//!                 │                                                               │
//!                 │  config · observability (tracing, metrics) · lifecycle        │
//!                 └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use seo_proxy::config::{load_config, ProxyConfig};
use seo_proxy::http::HttpServer;
use seo_proxy::lifecycle::Shutdown;
use seo_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "seo-proxy")]
#[command(about = "Edge proxy that injects per-page SEO metadata", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init_logging(&config.observability);

    if cli.check {
        tracing::info!(rules = config.rules.len(), "Configuration is valid");
        return Ok(());
    }

    tracing::info!("seo-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        origin = %config.origin.domain_source,
        rules = config.rules.len(),
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
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
