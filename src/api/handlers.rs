//! HTTP API handlers.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::error;

use crate::insight::{RequestMeta, Telemetry};
use crate::metrics;
use crate::store::ContentStore;

/// Application state shared with handlers.
///
/// Both members are read-only after startup; cloning the state only bumps
/// reference counts.
#[derive(Clone)]
pub struct AppState {
    /// Content store backing the health check.
    pub store: Arc<dyn ContentStore>,
    /// Write-once telemetry state.
    pub telemetry: Arc<Telemetry>,
}

impl AppState {
    /// Create new app state.
    pub fn new(store: Arc<dyn ContentStore>, telemetry: Arc<Telemetry>) -> Self {
        Self { store, telemetry }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
    /// Number of authors in the store.
    pub authors: i64,
    /// Number of posts in the store.
    pub posts: i64,
}

/// Health check handler: queries the store counts and drives one
/// best-effort telemetry emission.
///
/// The emitted duration covers only the store query; telemetry transport
/// cost never lands on the request path.
pub async fn health(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();

    let counts = match state.store.counts().await {
        Ok(counts) => counts,
        Err(err) => {
            error!(error = %err, "health check store query failed");
            metrics::inc_health_failures();
            state
                .telemetry
                .emit_error("Database query failed", &err, "/health");
            // Opaque body: internal detail stays out of the response.
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
        }
    };

    let duration_ms = metrics::elapsed_ms(start);
    metrics::record_health_latency(duration_ms);

    let mut metadata = Map::new();
    metadata.insert("authors".to_string(), Value::from(counts.authors));
    metadata.insert("posts".to_string(), Value::from(counts.posts));

    state.telemetry.emit_success(
        "/health",
        "GET",
        200,
        duration_ms,
        "Health check completed",
        metadata,
        &request_meta(connect_info, &headers),
    );

    Json(HealthResponse {
        status: "ok",
        authors: counts.authors,
        posts: counts.posts,
    })
    .into_response()
}

/// Root handler: fixed plaintext version banner.
pub async fn home() -> &'static str {
    concat!("Blog Engine v", env!("CARGO_PKG_VERSION"))
}

/// Pull origin address and user-agent out of the request.
fn request_meta(connect_info: Option<ConnectInfo<SocketAddr>>, headers: &HeaderMap) -> RequestMeta {
    RequestMeta {
        remote_addr: connect_info.map(|ConnectInfo(addr)| addr.to_string()),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(|agent| agent.to_string()),
    }
}
