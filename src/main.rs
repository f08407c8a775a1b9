//! Service bootstrap binary.
//!
//! # Architecture Overview
//!
//! ```text
//!   config.toml ──▶ ServiceConfig ──▶ ServiceBuilder
//!                                        │ register
//!                                        ▼
//!                ┌──────────────────────────────────────────────┐
//!                │                  Service                      │
//!                │                                               │
//!                │  logger ◀── injected ── http ── /health       │
//!                │     ▲                                         │
//!                │     └────── injected ── tcp ── ConnectionPool │
//!                │                                               │
//!                │  init ──▶ run (concurrent) ──▶ stop (deadline)│
//!                └──────────────────────────────────────────────┘
//!                                        ▲
//!                         SIGINT / SIGTERM
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use service_bootstrap::components::{HttpServer, TcpClient, TracingLogger};
use service_bootstrap::config::loader::load_config;
use service_bootstrap::observability::{logging, metrics};
use service_bootstrap::{ServiceBuilder, ServiceConfig};

#[derive(Parser)]
#[command(name = "service-bootstrap")]
#[command(about = "Run a service assembled from built-in components", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init_logging(&config.observability)?;

    tracing::info!(
        service = %config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        "Starting"
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

    let service = ServiceBuilder::from_config(&config)
        .register("logger", Arc::new(TracingLogger::new(&config.service.name)))
        .register("http", Arc::new(HttpServer::new(&config.service.name, &config.server)))
        .register("tcp", Arc::new(TcpClient::new(&config.client)))
        .build()?;

    service.serve().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
