//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with a catch-all proxy handler
//! - Wire up middleware (tracing span, timing/access log)
//! - Inject the shared upstream client into every handler
//! - Serve until shutdown, draining in-flight requests

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::middleware::track_timing;
use crate::http::{request, response};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::upstream::UpstreamClient;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: UpstreamClient,
    pub max_body_bytes: usize,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server forwarding through `client`.
    pub fn new(config: &ProxyConfig, client: UpstreamClient) -> Self {
        let state = AppState {
            client,
            max_body_bytes: config.limits.max_body_bytes,
        };

        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(middleware::from_fn(track_timing))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }))
    }

    /// The fully layered router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, mut shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.recv().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all proxy handler.
///
/// Buffers the inbound body, forwards to the upstream and streams the
/// answer back. Upstream failures become 502.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    match forward(&state, request).await {
        Ok(response) => response,
        Err(e) => {
            match &e {
                ProxyError::Upstream(upstream) => {
                    tracing::error!(error = %e, kind = upstream.kind(), "Upstream error");
                    metrics::record_upstream_error(upstream.kind());
                }
                ProxyError::BodyTooLarge(_) | ProxyError::InboundBody(_) => {
                    tracing::warn!(error = %e, "Rejecting inbound request");
                }
            }
            e.into_response()
        }
    }
}

async fn forward(state: &AppState, request: Request<Body>) -> Result<Response, ProxyError> {
    let outbound = request::into_outbound(request, state.max_body_bytes).await?;

    tracing::debug!(
        method = %outbound.method,
        path = %outbound.path_and_query,
        body_bytes = outbound.body.len(),
        "Proxying request"
    );

    let upstream = state.client.send(outbound).await?;
    Ok(response::relay(upstream))
}
