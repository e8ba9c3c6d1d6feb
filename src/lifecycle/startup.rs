//! Startup orchestration.
//!
//! Order: upstream client → listener → serve. The client is acquired first
//! and released on every exit path, including a failed bind.

use tokio::net::TcpListener;

use crate::config::ProxyConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::upstream::{UpstreamClient, UpstreamError};

/// Fatal error while bringing the proxy up or serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to create upstream client: {0}")]
    Client(#[from] UpstreamError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Bring the proxy up and serve until `shutdown` fires.
pub async fn run(config: ProxyConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    let client = UpstreamClient::new(&config.upstream)?;

    let outcome = serve(&config, client.clone(), shutdown).await;

    client.close();
    outcome
}

async fn serve(config: &ProxyConfig, client: UpstreamClient, shutdown: &Shutdown) -> Result<(), StartupError> {
    let address = &config.listener.bind_address;
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    let local_addr = listener.local_addr().map_err(StartupError::Serve)?;
    tracing::info!(
        address = %local_addr,
        upstream = %client.base_url(),
        "Listening for connections"
    );

    let server = HttpServer::new(config, client);
    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}
