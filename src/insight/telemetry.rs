//! Telemetry state and fire-and-forget dispatch.
//!
//! [`Telemetry`] is built exactly once during startup and never written
//! afterwards, which is what makes unsynchronized reads from concurrently
//! handled requests safe. The emit entry points are total: they return
//! immediately, spawn a detached task owning copies of every input, and
//! discard transport errors after recording them locally. A telemetry
//! failure must never become a request failure.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::config::Config;
use crate::metrics;

use super::client::{InsightClient, LogLevel};

/// Service name reported to the sidecar.
pub const SERVICE_NAME: &str = "blog-service";

/// Request context attached to success emissions.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    /// Client origin address.
    pub remote_addr: Option<String>,
    /// Client user-agent string.
    pub user_agent: Option<String>,
}

/// Immutable-after-init telemetry state.
///
/// `client` is `Some` iff the enable flag, sidecar configuration, and the
/// startup health probe all checked out. Shared via `Arc` across request
/// handlers; no locks needed.
#[derive(Debug, Clone)]
pub struct Telemetry {
    enabled: bool,
    client: Option<Arc<InsightClient>>,
}

impl Telemetry {
    /// Telemetry in the off state. Every emit call is a no-op.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            client: None,
        }
    }

    /// Telemetry backed by an already-probed client. Used by `init` and by
    /// tests that manage the probe themselves.
    pub fn with_client(client: InsightClient) -> Self {
        Self {
            enabled: true,
            client: Some(Arc::new(client)),
        }
    }

    /// Build the process-wide telemetry state. Runs exactly once, before
    /// any request is served; this is the sole writer of the state.
    ///
    /// Missing configuration or a failed sidecar probe disables telemetry
    /// with a local warning instead of failing startup. The warning goes to
    /// local logs only; routing it through the pipeline itself would create
    /// a startup dependency cycle.
    pub async fn init(config: &Config) -> Self {
        let (url, key) = match config.insight_target() {
            Some(target) => target,
            None => {
                if config.enable_observability {
                    warn!("Insight configuration missing, telemetry disabled");
                }
                return Self::disabled();
            }
        };

        let client = InsightClient::new(
            url,
            key,
            Duration::from_millis(config.insight_timeout_ms),
            config.environment.clone(),
        );

        match client.health().await {
            Ok(()) => {
                info!(url, "Insight sidecar connected, telemetry enabled");
                Self::with_client(client)
            }
            Err(e) => {
                warn!(url, error = %e, "Insight sidecar not available, telemetry disabled");
                Self::disabled()
            }
        }
    }

    /// Whether emissions will be scheduled.
    pub fn is_enabled(&self) -> bool {
        self.enabled && self.client.is_some()
    }

    /// Schedule a success emission: one INFO log then one request metric.
    ///
    /// Returns immediately. The spawned task owns `metadata` (augmented with
    /// the request origin and user-agent before the spawn) and copies of all
    /// other inputs, so the originating request can complete independently.
    #[allow(clippy::too_many_arguments)]
    pub fn emit_success(
        &self,
        path: &str,
        method: &str,
        status_code: u16,
        duration_ms: f64,
        message: &str,
        mut metadata: Map<String, Value>,
        request: &RequestMeta,
    ) {
        let client = match self.active_client() {
            Some(client) => client,
            None => return,
        };

        if let Some(addr) = &request.remote_addr {
            metadata.insert("user_ip".to_string(), Value::String(addr.clone()));
        }
        if let Some(agent) = &request.user_agent {
            metadata.insert("user_agent".to_string(), Value::String(agent.clone()));
        }

        let path = path.to_string();
        let method = method.to_string();
        let message = message.to_string();

        metrics::inc_telemetry_spawned();
        tokio::spawn(async move {
            let start = Instant::now();
            record_outcome(
                client
                    .send_log(SERVICE_NAME, LogLevel::Info, &message, metadata)
                    .await,
                "/logs",
                start,
            );

            let start = Instant::now();
            record_outcome(
                client
                    .send_metric(SERVICE_NAME, &path, &method, status_code, duration_ms)
                    .await,
                "/metrics",
                start,
            );
        });
    }

    /// Schedule one ERROR log emission for a failed request.
    ///
    /// Same contract as [`emit_success`](Self::emit_success): never blocks,
    /// never retries, never surfaces a failure to the caller.
    pub fn emit_error(&self, message: &str, error: &dyn std::fmt::Display, endpoint: &str) {
        let client = match self.active_client() {
            Some(client) => client,
            None => return,
        };

        let mut metadata = Map::new();
        metadata.insert("error".to_string(), Value::String(error.to_string()));
        metadata.insert("endpoint".to_string(), Value::String(endpoint.to_string()));

        let message = message.to_string();

        metrics::inc_telemetry_spawned();
        tokio::spawn(async move {
            let start = Instant::now();
            record_outcome(
                client
                    .send_log(SERVICE_NAME, LogLevel::Error, &message, metadata)
                    .await,
                "/logs",
                start,
            );
        });
    }

    fn active_client(&self) -> Option<Arc<InsightClient>> {
        if !self.enabled {
            return None;
        }
        self.client.clone()
    }
}

/// Record a transport outcome to local diagnostics and discard it.
///
/// This is the single point allowed to consume an `InsightError`.
fn record_outcome(
    result: Result<(), crate::error::InsightError>,
    endpoint: &'static str,
    start: Instant,
) {
    metrics::record_sidecar_latency(start, endpoint);
    match result {
        Ok(()) => metrics::inc_telemetry_sent(),
        Err(e) => {
            warn!(endpoint, error = %e, "telemetry delivery failed, event dropped");
            metrics::inc_telemetry_dropped();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            enable_observability: false,
            insight_url: None,
            insight_api_key: None,
            insight_timeout_ms: 500,
            environment: "test".to_string(),
            db_user: "blog".to_string(),
            db_password: "secret".to_string(),
            db_host: "localhost".to_string(),
            db_port: 5432,
            db_name: "blog_engine".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
        }
    }

    #[test]
    fn disabled_emits_are_noops() {
        // No runtime needed: the guard short-circuits before any spawn.
        let telemetry = Telemetry::disabled();
        assert!(!telemetry.is_enabled());

        telemetry.emit_success(
            "/health",
            "GET",
            200,
            1.0,
            "Health check completed",
            Map::new(),
            &RequestMeta::default(),
        );
        telemetry.emit_error("Database query failed", &"boom", "/health");
    }

    #[tokio::test]
    async fn init_is_disabled_when_flag_off() {
        let telemetry = Telemetry::init(&test_config()).await;
        assert!(!telemetry.is_enabled());
    }

    #[tokio::test]
    async fn init_is_disabled_when_credential_missing() {
        let config = Config {
            enable_observability: true,
            insight_url: Some("http://localhost:9000".to_string()),
            insight_api_key: None,
            ..test_config()
        };

        let telemetry = Telemetry::init(&config).await;
        assert!(!telemetry.is_enabled());
    }

    #[tokio::test]
    async fn init_is_disabled_when_probe_fails() {
        // Nothing listens on port 1; the probe fails and telemetry is
        // downgraded even though the enable flag was set.
        let config = Config {
            enable_observability: true,
            insight_url: Some("http://127.0.0.1:1".to_string()),
            insight_api_key: Some("test-key".to_string()),
            ..test_config()
        };

        let telemetry = Telemetry::init(&config).await;
        assert!(!telemetry.is_enabled());
    }
}
