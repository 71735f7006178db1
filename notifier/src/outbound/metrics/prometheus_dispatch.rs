//! Prometheus adapter for dispatch outcome counters.

use async_trait::async_trait;
use prometheus::{IntCounterVec, Opts, Registry};

use crate::domain::ports::{DispatchMetrics, DispatchMetricsError, DispatchRecord};

/// Prometheus-backed recorder for dispatch outcomes.
pub struct PrometheusDispatchMetrics {
    notifications_total: IntCounterVec,
}

impl PrometheusDispatchMetrics {
    /// Create and register counters with the provided registry.
    ///
    /// # Errors
    ///
    /// Returns an error when Prometheus rejects metric registration.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let notifications_total = IntCounterVec::new(
            Opts::new(
                "notifications_dispatched_total",
                "Push notification dispatches by kind and outcome",
            ),
            &["kind", "outcome"],
        )?;
        registry.register(Box::new(notifications_total.clone()))?;
        Ok(Self {
            notifications_total,
        })
    }
}

#[async_trait]
impl DispatchMetrics for PrometheusDispatchMetrics {
    async fn record(&self, record: &DispatchRecord) -> Result<(), DispatchMetricsError> {
        self.notifications_total
            .get_metric_with_label_values(&[record.kind.as_str(), record.outcome.as_str()])
            .map_err(|error| DispatchMetricsError::export(error.to_string()))?
            .inc();
        Ok(())
    }
}
