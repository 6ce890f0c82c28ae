//! Receiver metric vocabulary on top of [`MetricRegistry`].
//!
//! Every family is described once at construction with its help text, and
//! unlabeled families are materialized at zero so the first scrape lists them.
//! Recording never fails for callers: the names, kinds and buckets here are
//! fixed, so a registry error can only be a bug and is logged instead.

use std::sync::Arc;
use std::time::{Duration, Instant};

use quakewatch_core::error::Result;

use super::registry::{MetricKind, MetricRegistry};

pub const REQUESTS_TOTAL: &str = "quakewatch_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "quakewatch_request_duration_seconds";
pub const ACTIVE_CONNECTIONS: &str = "quakewatch_active_connections";
pub const DATA_POINTS_PROCESSED_TOTAL: &str = "quakewatch_data_points_processed_total";
pub const API_CALLS_TOTAL: &str = "quakewatch_api_calls_total";
pub const ERRORS_TOTAL: &str = "quakewatch_errors_total";
pub const EARTHQUAKES_TOTAL: &str = "quakewatch_earthquakes_total";
pub const EARTHQUAKE_MAGNITUDE: &str = "quakewatch_earthquake_magnitude";

/// Default latency buckets (seconds).
pub const DURATION_BUCKETS: [f64; 14] = [
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Magnitude buckets 0..=10, step 1.
pub const MAGNITUDE_BUCKETS: [f64; 11] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];

const VOCABULARY: [(&str, MetricKind, &str); 8] = [
    (REQUESTS_TOTAL, MetricKind::Counter, "Total number of requests"),
    (REQUEST_DURATION_SECONDS, MetricKind::Histogram, "Request duration in seconds"),
    (ACTIVE_CONNECTIONS, MetricKind::Gauge, "Number of active connections"),
    (DATA_POINTS_PROCESSED_TOTAL, MetricKind::Counter, "Total number of data points processed"),
    (API_CALLS_TOTAL, MetricKind::Counter, "Total number of API calls"),
    (ERRORS_TOTAL, MetricKind::Counter, "Total number of errors"),
    (EARTHQUAKES_TOTAL, MetricKind::Counter, "Total number of earthquakes processed"),
    (EARTHQUAKE_MAGNITUDE, MetricKind::Histogram, "Earthquake magnitude distribution"),
];

pub struct ReceiverMetrics {
    registry: MetricRegistry,
}

impl ReceiverMetrics {
    pub fn new() -> Self {
        Self::with_registry(MetricRegistry::new())
    }

    /// Wrap an existing registry (it must not already hold these names with other kinds).
    pub fn with_registry(registry: MetricRegistry) -> Self {
        let metrics = Self { registry };
        for (name, kind, help) in VOCABULARY {
            metrics.record(metrics.registry.describe(name, kind, help));
        }
        metrics.record(metrics.registry.set_gauge(ACTIVE_CONNECTIONS, &[], 0.0));
        metrics.record(metrics.registry.increment_counter(DATA_POINTS_PROCESSED_TOTAL, &[], 0.0));
        metrics.record(metrics.registry.increment_counter(EARTHQUAKES_TOTAL, &[], 0.0));
        metrics.record(metrics.registry.init_histogram(EARTHQUAKE_MAGNITUDE, &[], &MAGNITUDE_BUCKETS));
        metrics
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    pub fn increment_request_count(&self, method: &str, endpoint: &str, status: &str) {
        self.record(self.registry.inc_counter(
            REQUESTS_TOTAL,
            &[("method", method), ("endpoint", endpoint), ("status", status)],
        ));
    }

    pub fn observe_request_duration(&self, method: &str, endpoint: &str, elapsed: Duration) {
        self.record(self.registry.observe_histogram(
            REQUEST_DURATION_SECONDS,
            &[("method", method), ("endpoint", endpoint)],
            elapsed.as_secs_f64(),
            &DURATION_BUCKETS,
        ));
    }

    pub fn set_active_connections(&self, count: i64) {
        self.record(self.registry.set_gauge(ACTIVE_CONNECTIONS, &[], count as f64));
    }

    fn add_active_connections(&self, delta: i64) {
        self.record(self.registry.add_gauge(ACTIVE_CONNECTIONS, &[], delta as f64));
    }

    pub fn increment_data_points_processed(&self, count: u64) {
        self.record(self.registry.increment_counter(
            DATA_POINTS_PROCESSED_TOTAL,
            &[],
            count as f64,
        ));
    }

    pub fn increment_api_calls(&self, api_name: &str) {
        self.record(self.registry.inc_counter(API_CALLS_TOTAL, &[("api_name", api_name)]));
    }

    pub fn increment_error_count(&self, error_type: &str) {
        self.record(self.registry.inc_counter(ERRORS_TOTAL, &[("error_type", error_type)]));
    }

    pub fn increment_earthquake_count(&self) {
        self.record(self.registry.inc_counter(EARTHQUAKES_TOTAL, &[]));
    }

    pub fn record_earthquake_magnitude(&self, magnitude: f64) {
        self.record(self.registry.observe_histogram(
            EARTHQUAKE_MAGNITUDE,
            &[],
            magnitude,
            &MAGNITUDE_BUCKETS,
        ));
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.registry.render()
    }

    fn record(&self, res: Result<()>) {
        if let Err(e) = res {
            tracing::warn!(error = %e, "metric update rejected");
        }
    }
}

impl Default for ReceiverMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped request measurement.
///
/// Counts the request as an active connection while alive. On drop it records
/// the duration histogram, the request counter (with the status set through
/// [`RequestTimer::set_status`], `"500"` if none was set) and releases the
/// active connection.
pub struct RequestTimer {
    metrics: Arc<ReceiverMetrics>,
    method: &'static str,
    endpoint: &'static str,
    started: Instant,
    status: Option<u16>,
}

impl RequestTimer {
    /// Start timing one request against `metrics`.
    pub fn start(
        metrics: &Arc<ReceiverMetrics>,
        method: &'static str,
        endpoint: &'static str,
    ) -> Self {
        metrics.add_active_connections(1);
        Self {
            metrics: Arc::clone(metrics),
            method,
            endpoint,
            started: Instant::now(),
            status: None,
        }
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        let status = self.status.unwrap_or(500).to_string();
        self.metrics
            .observe_request_duration(self.method, self.endpoint, elapsed);
        self.metrics
            .increment_request_count(self.method, self.endpoint, &status);
        self.metrics.add_active_connections(-1);
    }
}
