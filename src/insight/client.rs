//! HTTP client for the Insight observability sidecar.
//!
//! Every operation is one request/response exchange awaited by the caller;
//! the fire-and-forget behavior lives in the dispatch layer, not here, which
//! keeps this client reusable and independently testable.

use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::InsightError;

/// Log severity accepted by the sidecar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Diagnostic detail.
    Debug,
    /// Normal operation.
    Info,
    /// Degraded but serving.
    Warn,
    /// Request-path failure.
    Error,
}

/// Log entry payload for `POST /logs`.
#[derive(Debug, Clone, Serialize)]
pub struct LogRequest {
    /// Emitting service name.
    pub service_name: String,
    /// Severity level.
    pub log_level: LogLevel,
    /// Human-readable message.
    pub message: String,
    /// Trace correlation ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Span correlation ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    /// Free-form context fields.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

/// Performance metric payload for `POST /metrics`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricRequest {
    /// Emitting service name.
    pub service_name: String,
    /// Request path.
    pub path: String,
    /// HTTP method.
    pub method: String,
    /// Response status code.
    pub status_code: u16,
    /// Request duration in milliseconds.
    pub duration_ms: f64,
    /// Runtime descriptor of the emitting client.
    pub source: MetricSource,
    /// Deployment environment tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Request correlation ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Fixed descriptor identifying this client's runtime.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSource {
    /// Implementation language.
    pub language: &'static str,
    /// HTTP framework.
    pub framework: &'static str,
    /// Crate version.
    pub version: &'static str,
}

impl MetricSource {
    fn current() -> Self {
        Self {
            language: "rust",
            framework: "axum",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Insight sidecar API client.
///
/// Holds only immutable configuration after construction, so it is safely
/// shared by reference across detached telemetry tasks without locks.
#[derive(Debug, Clone)]
pub struct InsightClient {
    /// HTTP client for sidecar requests.
    http: reqwest::Client,
    /// Sidecar base URL.
    base_url: String,
    /// Credential for the X-API-Key header.
    api_key: String,
    /// Environment tag attached to metrics.
    environment: String,
}

impl InsightClient {
    /// Create a new Insight client with tuned HTTP settings.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
        environment: impl Into<String>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            // Fast connection establishment
            .connect_timeout(Duration::from_millis(500))
            // TCP_NODELAY for low-latency (disable Nagle's algorithm)
            .tcp_nodelay(true)
            // Keep connections alive for reuse across emissions
            .tcp_keepalive(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .expect("failed to create HTTP client");

        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            environment: environment.into(),
        }
    }

    /// Get the sidecar base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a log entry to the sidecar.
    pub async fn send_log(
        &self,
        service_name: &str,
        level: LogLevel,
        message: &str,
        metadata: Map<String, Value>,
    ) -> Result<(), InsightError> {
        self.send_log_with_trace(service_name, level, message, None, None, metadata)
            .await
    }

    /// Send a log entry with trace correlation.
    pub async fn send_log_with_trace(
        &self,
        service_name: &str,
        level: LogLevel,
        message: &str,
        trace_id: Option<String>,
        span_id: Option<String>,
        metadata: Map<String, Value>,
    ) -> Result<(), InsightError> {
        let log = LogRequest {
            service_name: service_name.to_string(),
            log_level: level,
            message: message.to_string(),
            trace_id,
            span_id,
            metadata,
        };

        self.post_json("/logs", &log).await
    }

    /// Send a performance metric to the sidecar.
    pub async fn send_metric(
        &self,
        service_name: &str,
        path: &str,
        method: &str,
        status_code: u16,
        duration_ms: f64,
    ) -> Result<(), InsightError> {
        let metric = MetricRequest {
            service_name: service_name.to_string(),
            path: path.to_string(),
            method: method.to_string(),
            status_code,
            duration_ms,
            source: MetricSource::current(),
            environment: Some(self.environment.clone()),
            request_id: None,
        };

        self.post_json("/metrics", &metric).await
    }

    /// Check if the sidecar is reachable. Success requires exactly 200.
    pub async fn health(&self) -> Result<(), InsightError> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(InsightError::ServerRejected(status.as_u16()));
        }

        Ok(())
    }

    /// POST a JSON payload to the sidecar; success is any 2xx status.
    async fn post_json<T: Serialize>(
        &self,
        endpoint: &str,
        payload: &T,
    ) -> Result<(), InsightError> {
        let body = serde_json::to_vec(payload)?;

        let response = self
            .http
            .post(format!("{}{}", self.base_url, endpoint))
            .header("X-API-Key", self.api_key.as_str())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InsightError::ServerRejected(status.as_u16()));
        }

        Ok(())
    }
}
