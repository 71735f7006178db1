//! Domain port surface for dispatch outcome counters.
//!
//! Keeps delivery observability at the domain boundary so adapters can export
//! counters without the dispatcher knowing about the metrics backend.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{DispatchResult, NotificationKind};

define_port_error! {
    /// Errors exposed when recording dispatch metrics.
    pub enum DispatchMetricsError {
        /// Metric exporter rejected the write.
        Export {
            /// Exporter error text.
            message: String,
        } => "dispatch metrics exporter failed: {message}",
    }
}

/// Outcome label recorded for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcomeLabel {
    /// The transport accepted the envelope.
    Sent,
    /// No transport was configured.
    Skipped,
    /// The transport failed or timed out.
    Failed,
}

impl DispatchOutcomeLabel {
    /// Stable lowercase label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl From<&DispatchResult> for DispatchOutcomeLabel {
    fn from(result: &DispatchResult) -> Self {
        match result {
            DispatchResult::Sent => Self::Sent,
            DispatchResult::Skipped { .. } => Self::Skipped,
            DispatchResult::Failed { .. } => Self::Failed,
        }
    }
}

/// Metrics payload for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchRecord {
    /// Kind of notification dispatched.
    pub kind: NotificationKind,
    /// Classified outcome.
    pub outcome: DispatchOutcomeLabel,
}

/// Metrics recording port for dispatch outcomes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DispatchMetrics: Send + Sync {
    /// Record one classified dispatch.
    ///
    /// ```rust
    /// use notifier::domain::NotificationKind;
    /// use notifier::domain::ports::{
    ///     DispatchMetrics, DispatchOutcomeLabel, DispatchRecord, NoOpDispatchMetrics,
    /// };
    ///
    /// # async fn demo() {
    /// let metrics = NoOpDispatchMetrics;
    /// let record = DispatchRecord {
    ///     kind: NotificationKind::NewOrder,
    ///     outcome: DispatchOutcomeLabel::Sent,
    /// };
    /// assert!(metrics.record(&record).await.is_ok());
    /// # }
    /// ```
    async fn record(&self, record: &DispatchRecord) -> Result<(), DispatchMetricsError>;
}

/// No-op implementation used when metrics are disabled or in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpDispatchMetrics;

#[async_trait]
impl DispatchMetrics for NoOpDispatchMetrics {
    async fn record(&self, _record: &DispatchRecord) -> Result<(), DispatchMetricsError> {
        Ok(())
    }
}
