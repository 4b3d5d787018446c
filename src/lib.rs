//! Blog engine liveness service with best-effort Insight telemetry.
//!
//! The service exposes a `/health` endpoint backed by a Postgres content
//! store and reports request logs and latency metrics to an external
//! observability sidecar ("Insight") over a fire-and-forget pipeline.
//! Telemetry never adds latency or failure risk to the request path: it is
//! disabled silently when misconfigured or unreachable at startup, and every
//! emission runs in a detached task whose transport errors are recorded
//! locally and discarded.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`insight`]: Sidecar transport client and telemetry dispatch
//! - [`store`]: Content store seam (Postgres + mock)
//! - [`api`]: HTTP routes and handlers
//! - [`metrics`]: Local process diagnostics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod insight;
pub mod metrics;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{EngineError, Result};
