//! Backend API service for the shell applications.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request      ┌──────────────────────────────────────────┐
//!     ────────────────────┼─▶ TraceLayer → request context → timeout │
//!                         │        │                                 │
//!                         │        ▼                                 │
//!                         │   /health  /sum  (JSON 404 otherwise)    │
//!     Client Response     │        │                                 │
//!     ◀───────────────────┼────────┘                                 │
//!                         │                                          │
//!                         │   config · observability · shutdown      │
//!                         └──────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use spa_shell::config::{self, ShellConfig};
use spa_shell::observability::{logging, metrics};
use spa_shell::{ApiServer, Shutdown};

#[derive(Parser)]
#[command(name = "shell-api")]
#[command(about = "Health and arithmetic API for the shell applications", long_about = None)]
struct Cli {
    /// TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config: ShellConfig = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::loader::default_config()?,
    };

    logging::init_tracing(&config.observability.log_level);
    tracing::info!("shell-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.api.bind_address,
        request_timeout_secs = config.api.request_timeout_secs,
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

    let listener = TcpListener::bind(&config.api.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "API listening");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    ApiServer::new(config.api).run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
