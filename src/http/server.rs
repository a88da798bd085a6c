//! HTTP server setup and request handling.
//!
//! # Responsibilities
//! - Create Axum Router with the relay handler
//! - Wire up middleware (tracing, timeout, request ID, CORS origin header)
//! - Bind server to listener with graceful shutdown
//! - Map Forwarder outcomes onto client responses

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::forward::{Forwarder, UpstreamResponse};
use crate::observability::metrics;

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
    pub max_body_bytes: usize,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let forwarder = Arc::new(Forwarder::new(config.upstream.clone())?);

        let state = AppState {
            forwarder,
            max_body_bytes: config.listener.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        // Every response path carries the wildcard allow-origin header, the
        // preflight short-circuit and the 502 envelope included.
        Router::new()
            .route("/", any(relay_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
    }

    /// Run the server, accepting connections on the given listener until the
    /// shutdown signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

/// Main relay handler.
///
/// OPTIONS preflights and non-POST methods are answered locally; only POST
/// bodies reach the forwarder.
async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    if method == Method::OPTIONS {
        metrics::record_request("OPTIONS", StatusCode::NO_CONTENT.as_u16(), start);
        return preflight_response();
    }

    if method != Method::POST {
        tracing::debug!(request_id = %request_id, method = %method, "Method not allowed");
        metrics::record_request(method.as_str(), StatusCode::METHOD_NOT_ALLOWED.as_u16(), start);
        return (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response();
    }

    let bytes = match axum::body::to_bytes(request.into_body(), state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
            metrics::record_request("POST", StatusCode::PAYLOAD_TOO_LARGE.as_u16(), start);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large").into_response();
        }
    };

    // An absent body still has to be a JSON-RPC request from the upstream's
    // point of view.
    let payload = if bytes.is_empty() {
        Bytes::from_static(b"{}")
    } else {
        bytes
    };

    tracing::debug!(
        request_id = %request_id,
        payload_bytes = payload.len(),
        "Relaying request"
    );

    match state.forwarder.forward(payload).await {
        Ok(upstream) => {
            metrics::record_request("POST", upstream.status.as_u16(), start);
            relay_response(upstream)
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "All upstream targets failed");
            metrics::record_request("POST", StatusCode::BAD_GATEWAY.as_u16(), start);
            (StatusCode::BAD_GATEWAY, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

/// Relay a completed upstream response verbatim: its status, its body, and
/// its content type, defaulting to JSON only when the upstream sent none.
fn relay_response(upstream: UpstreamResponse) -> Response {
    let content_type = upstream
        .content_type
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    response
}

/// CORS preflight short-circuit; never touches the forwarder.
fn preflight_response() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}
