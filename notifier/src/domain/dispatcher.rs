//! Delivery of one envelope through an optional transport.
//!
//! The dispatcher never returns an error: a missing transport becomes
//! [`DispatchResult::Skipped`] and any transport failure or deadline expiry
//! becomes [`DispatchResult::Failed`]. Notification delivery is a side channel
//! to the caller's business operation and must not abort it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use super::NotificationEnvelope;
use super::NotificationKind;
use crate::domain::ports::{
    DispatchMetrics, DispatchOutcomeLabel, DispatchRecord, NoOpDispatchMetrics, Transport,
};

/// Reason attached to [`DispatchResult::Skipped`] when no transport exists.
pub const TRANSPORT_UNAVAILABLE_REASON: &str = "transport unavailable";
/// Reason attached to [`DispatchResult::Failed`] when the deadline expires.
pub const TIMEOUT_REASON: &str = "timeout";

const DEFAULT_SEND_DEADLINE: Duration = Duration::from_secs(10);

/// Classified outcome of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum DispatchResult {
    /// The transport accepted the envelope.
    Sent,
    /// No transport was configured; nothing was attempted.
    Skipped {
        /// Why delivery was skipped.
        reason: String,
    },
    /// The transport call failed or exceeded the deadline.
    Failed {
        /// Underlying failure message.
        reason: String,
    },
}

impl DispatchResult {
    /// Whether the envelope was handed to the provider.
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }

    /// Reason for a skipped or failed dispatch.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Sent => None,
            Self::Skipped { reason } | Self::Failed { reason } => Some(reason.as_str()),
        }
    }

    fn skipped() -> Self {
        Self::Skipped {
            reason: TRANSPORT_UNAVAILABLE_REASON.to_owned(),
        }
    }

    fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

/// Dispatcher tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Upper bound on one transport call; `None` defers to the transport.
    pub send_deadline: Option<Duration>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            send_deadline: Some(DEFAULT_SEND_DEADLINE),
        }
    }
}

/// Classifies transport outcomes for single envelopes.
///
/// Holds no per-call state, so one instance may serve concurrent dispatches.
pub struct Dispatcher {
    metrics: Arc<dyn DispatchMetrics>,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Build a dispatcher that discards metrics.
    #[must_use]
    pub fn new(config: DispatcherConfig) -> Self {
        Self::with_metrics(Arc::new(NoOpDispatchMetrics), config)
    }

    /// Build a dispatcher reporting every outcome to `metrics`.
    #[must_use]
    pub fn with_metrics(metrics: Arc<dyn DispatchMetrics>, config: DispatcherConfig) -> Self {
        Self { metrics, config }
    }

    /// Attempt delivery of `envelope` exactly once.
    ///
    /// # Examples
    /// ```
    /// use notifier::domain::{build_user_envelope, DispatchResult, Dispatcher, DispatcherConfig};
    ///
    /// # async fn demo() {
    /// let dispatcher = Dispatcher::new(DispatcherConfig::default());
    /// let envelope = build_user_envelope("Rohan", "rohan@example.com").expect("valid user");
    /// let result = dispatcher.dispatch(&envelope, None).await;
    /// assert_eq!(result.reason(), Some("transport unavailable"));
    /// # }
    /// ```
    pub async fn dispatch(
        &self,
        envelope: &NotificationEnvelope,
        transport: Option<&dyn Transport>,
    ) -> DispatchResult {
        let result = match transport {
            Some(transport) => self.send_once(envelope, transport).await,
            None => {
                warn!(
                    kind = %envelope.kind(),
                    topic = envelope.topic(),
                    "push transport not configured; notification skipped"
                );
                DispatchResult::skipped()
            }
        };
        self.record_outcome(envelope.kind(), &result).await;
        result
    }

    async fn send_once(
        &self,
        envelope: &NotificationEnvelope,
        transport: &dyn Transport,
    ) -> DispatchResult {
        let outcome = match self.config.send_deadline {
            Some(deadline) => {
                match tokio::time::timeout(deadline, transport.send(envelope)).await {
                    Ok(outcome) => outcome,
                    Err(_elapsed) => {
                        error!(
                            kind = %envelope.kind(),
                            topic = envelope.topic(),
                            deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                            "push notification timed out"
                        );
                        return DispatchResult::failed(TIMEOUT_REASON);
                    }
                }
            }
            None => transport.send(envelope).await,
        };

        match outcome {
            Ok(()) => {
                info!(
                    kind = %envelope.kind(),
                    topic = envelope.topic(),
                    "push notification sent"
                );
                DispatchResult::Sent
            }
            Err(failure) => {
                error!(
                    kind = %envelope.kind(),
                    topic = envelope.topic(),
                    failure = failure.label(),
                    reason = failure.reason(),
                    "push notification failed"
                );
                DispatchResult::failed(failure.reason())
            }
        }
    }

    async fn record_outcome(&self, kind: NotificationKind, result: &DispatchResult) {
        let record = DispatchRecord {
            kind,
            outcome: DispatchOutcomeLabel::from(result),
        };
        // Exporter failures must not change the dispatch outcome.
        if let Err(export_error) = self.metrics.record(&record).await {
            warn!(error = %export_error, "failed to record dispatch metrics");
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
