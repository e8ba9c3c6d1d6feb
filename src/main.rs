//! Transparent HTTP reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ timing ─▶ proxy handler ─▶ upstream client ┼──▶ Upstream
//!                           │   (clock)   (headers - Host,   (pooled,      │     Origin
//!                           │             cookies, body)     no redirects) │
//!     Client Response       │                                              │
//!     ◀─────────────────────┼── timing ◀── relay (status as-is, framing   ◀┼───
//!                           │  (access     headers stripped, streamed)     │
//!                           │   line)                                      │
//!                           └────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use passthrough_proxy::config::{self, ProxyConfig};
use passthrough_proxy::lifecycle::{signals, startup, Shutdown};
use passthrough_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "passthrough-proxy")]
#[command(about = "Transparent HTTP reverse proxy to a single upstream origin", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Upstream base URL, overrides `upstream.base_url`.
    #[arg(short, long)]
    upstream: Option<String>,

    /// Runtime worker threads, overrides `listener.workers`.
    #[arg(short, long)]
    workers: Option<usize>,
}

impl Cli {
    fn into_config(self) -> Result<ProxyConfig, config::ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(upstream) = self.upstream {
            config.upstream.base_url = upstream;
        }
        if let Some(workers) = self.workers {
            config.listener.workers = workers;
        }

        config::validate_config(&config).map_err(config::ConfigError::Validation)?;
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init_logging(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        workers = config.listener.workers,
        upstream = %config.upstream.base_url,
        "Configuration loaded"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.listener.workers)
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        if config.observability.metrics_enabled {
            match config.observability.metrics_address.parse() {
                Ok(addr) => {
                    if let Err(e) = metrics::init_metrics(addr) {
                        tracing::error!(error = %e, "Failed to start metrics endpoint");
                    }
                }
                Err(e) => tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    error = %e,
                    "Failed to parse metrics address"
                ),
            }
        }

        let shutdown = Arc::new(Shutdown::new());
        signals::spawn_signal_listener(shutdown.clone());

        startup::run(config, &shutdown).await
    })?;

    tracing::info!("Shutdown complete");
    Ok(())
}
