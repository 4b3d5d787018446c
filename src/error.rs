//! Unified error types for the blog engine.

use thiserror::Error;

/// Top-level error type for the blog engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Persistent store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Insight sidecar transport error.
    #[error("insight error: {0}")]
    Insight(#[from] InsightError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistent store errors.
///
/// Surfaced to HTTP clients only as an opaque 500; the detail stays in
/// local logs and the best-effort error-log emission.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A count query failed.
    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// Could not establish the connection pool at startup.
    #[error("database connection failed: {0}")]
    Connect(sqlx::Error),

    /// The store backend is unavailable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Insight sidecar transport errors.
///
/// Raised only inside [`crate::insight::InsightClient`]. The dispatch layer
/// in [`crate::insight::Telemetry`] is the single place allowed to consume
/// and discard these.
#[derive(Error, Debug)]
pub enum InsightError {
    /// Payload serialization failed before the request was sent.
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    /// The HTTP exchange could not complete (connect, timeout, transfer).
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The sidecar answered with a non-2xx status.
    #[error("sidecar rejected request with status {0}")]
    ServerRejected(u16),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, EngineError>;
