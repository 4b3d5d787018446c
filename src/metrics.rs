//! Local process diagnostics for the telemetry pipeline.
//!
//! Transport errors are discarded at the dispatch layer; these counters and
//! histograms are where that discard gets recorded, alongside request-path
//! latency. Exposed in Prometheus format at `/metrics`.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

// === Metric Name Constants ===

/// Telemetry emissions scheduled counter metric name.
pub const METRIC_TELEMETRY_SPAWNED: &str = "telemetry_emissions_spawned_total";
/// Telemetry events delivered counter metric name.
pub const METRIC_TELEMETRY_SENT: &str = "telemetry_events_sent_total";
/// Telemetry events dropped counter metric name.
pub const METRIC_TELEMETRY_DROPPED: &str = "telemetry_events_dropped_total";
/// Sidecar round-trip latency metric name.
pub const METRIC_SIDECAR_LATENCY: &str = "insight_request_latency_ms";
/// Health check store-query latency metric name.
pub const METRIC_HEALTH_LATENCY: &str = "health_check_latency_ms";
/// Health check failures counter metric name.
pub const METRIC_HEALTH_FAILURES: &str = "health_check_failures_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(
        METRIC_TELEMETRY_SPAWNED,
        "Total number of detached telemetry emissions scheduled"
    );
    describe_counter!(
        METRIC_TELEMETRY_SENT,
        "Total number of telemetry events accepted by the Insight sidecar"
    );
    describe_counter!(
        METRIC_TELEMETRY_DROPPED,
        "Total number of telemetry events discarded after a transport error"
    );
    describe_histogram!(
        METRIC_SIDECAR_LATENCY,
        "Insight sidecar round-trip latency in milliseconds"
    );
    describe_histogram!(
        METRIC_HEALTH_LATENCY,
        "Health check store-query latency in milliseconds"
    );
    describe_counter!(
        METRIC_HEALTH_FAILURES,
        "Total number of health checks that failed at the store"
    );

    debug!("Metrics initialized");
}

/// Milliseconds elapsed since `start`.
pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Increment the scheduled-emissions counter.
pub fn inc_telemetry_spawned() {
    counter!(METRIC_TELEMETRY_SPAWNED).increment(1);
}

/// Increment the delivered-events counter.
pub fn inc_telemetry_sent() {
    counter!(METRIC_TELEMETRY_SENT).increment(1);
}

/// Increment the dropped-events counter.
pub fn inc_telemetry_dropped() {
    counter!(METRIC_TELEMETRY_DROPPED).increment(1);
}

/// Record one sidecar round trip.
pub fn record_sidecar_latency(start: Instant, endpoint: &'static str) {
    histogram!(METRIC_SIDECAR_LATENCY, "endpoint" => endpoint).record(elapsed_ms(start));
}

/// Record the store-query portion of a health check.
pub fn record_health_latency(duration_ms: f64) {
    histogram!(METRIC_HEALTH_LATENCY).record(duration_ms);
}

/// Increment the health check failure counter.
pub fn inc_health_failures() {
    counter!(METRIC_HEALTH_FAILURES).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn elapsed_ms_measures_time() {
        let start = Instant::now();
        sleep(Duration::from_millis(10));
        let elapsed = elapsed_ms(start);
        assert!(elapsed >= 9.0); // Allow some tolerance
    }
}
