//! Lightweight in-process metrics.
//!
//! Metrics are kept in an explicit [`registry::MetricRegistry`] owned by the
//! application state and rendered by the `/metrics` handler in Prometheus text
//! format. No process-wide singletons.

pub mod metrics;
pub mod registry;

pub use metrics::{ReceiverMetrics, RequestTimer};
pub use registry::{MetricKind, MetricRegistry};
