//! HTTP relay in front of the gesture classifier.
//!
//! Browsers and other local clients talk to this relay instead of the
//! classifier directly. It forwards prediction requests unchanged and
//! reports upstream failures in a uniform JSON shape.
//!
//! # Architecture
//!
//! ```text
//! client ──→ POST /api/predict ──→ relay ──→ classifier /api/predict
//!        ←── JSON probabilities ←──       ←──
//! ```

use crate::classifier::ClassifierConfig;
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
    /// Classifier the relay forwards to
    pub upstream: ClassifierConfig,
}

impl ServerConfig {
    pub fn new(port: u16, upstream: ClassifierConfig) -> Self {
        Self { port, upstream }
    }
}

/// Shared server state
pub struct ServerState {
    upstream: ClassifierConfig,
    http_client: reqwest::Client,
}

impl ServerState {
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.upstream.timeout)
            .build()?;

        Ok(Self {
            upstream: config.upstream.clone(),
            http_client,
        })
    }
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Relay status response
#[derive(Serialize)]
pub struct RelayStatus {
    pub status: String,
    pub message: String,
    pub upstream: String,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/predict
async fn relay_status(State(state): State<Arc<ServerState>>) -> Json<RelayStatus> {
    Json(RelayStatus {
        status: "ok".to_string(),
        message: "Predict API is running".to_string(),
        upstream: state.upstream.base_url.clone(),
    })
}

/// POST /api/predict
///
/// Forwards the body to the classifier and passes its answer back.
async fn predict(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let url = state.upstream.predict_url();

    let response = match state.http_client.post(&url).json(&body).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Failed to reach classifier at {}: {}", url, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to connect to ISL recognition service",
                    "details": e.to_string(),
                })),
            );
        }
    };

    let status = response.status();
    if !status.is_success() {
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::warn!("Classifier returned {}: {}", status, text);
        let status =
            StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({ "error": format!("ISL API error: {text}") })));
    }

    match response.json::<Value>().await {
        Ok(data) => (StatusCode::OK, Json(data)),
        Err(e) => {
            tracing::error!("Classifier sent an unreadable body: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to connect to ISL recognition service",
                    "details": e.to_string(),
                })),
            )
        }
    }
}

/// Build the relay router.
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/predict", get(relay_status).post(predict))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(
    config: ServerConfig,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let state = Arc::new(ServerState::new(&config)?);
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!(
        "Classifier relay listening on http://{} (upstream {})",
        actual_addr,
        config.upstream.base_url
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Server shutdown signal received");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}
