//! Prometheus metrics adapters.

mod prometheus_dispatch;

pub use prometheus_dispatch::PrometheusDispatchMetrics;
