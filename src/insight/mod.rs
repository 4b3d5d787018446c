//! Insight observability sidecar integration.

pub mod client;
pub mod telemetry;

pub use client::{InsightClient, LogLevel, LogRequest, MetricRequest, MetricSource};
pub use telemetry::{RequestMeta, Telemetry, SERVICE_NAME};
