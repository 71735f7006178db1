//! Unit tests for dispatch outcome classification.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockall::predicate::always;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::build_user_envelope;
use crate::domain::ports::{
    DispatchMetricsError, MockDispatchMetrics, MockTransport, TransportError,
};

#[fixture]
fn envelope() -> NotificationEnvelope {
    build_user_envelope("Rohan", "rohan@example.com").expect("valid user")
}

fn dispatcher() -> Dispatcher {
    Dispatcher::new(DispatcherConfig::default())
}

#[rstest]
#[tokio::test]
async fn missing_transport_is_skipped(envelope: NotificationEnvelope) {
    let result = dispatcher().dispatch(&envelope, None).await;

    assert_eq!(
        result,
        DispatchResult::Skipped {
            reason: "transport unavailable".to_owned()
        }
    );
    assert!(!result.is_sent());
}

#[rstest]
#[tokio::test]
async fn successful_send_is_sent(envelope: NotificationEnvelope) {
    let mut transport = MockTransport::new();
    transport
        .expect_send()
        .withf(|sent| sent.topic() == "admin_new_users")
        .times(1)
        .returning(|_| Ok(()));

    let result = dispatcher().dispatch(&envelope, Some(&transport)).await;

    assert_eq!(result, DispatchResult::Sent);
    assert_eq!(result.reason(), None);
}

#[rstest]
#[tokio::test]
async fn transport_failure_preserves_reason(envelope: NotificationEnvelope) {
    let mut transport = MockTransport::new();
    transport
        .expect_send()
        .times(1)
        .returning(|_| Err(TransportError::network("network down")));

    let result = dispatcher().dispatch(&envelope, Some(&transport)).await;

    assert_eq!(
        result,
        DispatchResult::Failed {
            reason: "network down".to_owned()
        }
    );
}

#[rstest]
#[case::unauthorized(TransportError::unauthorized("token expired"), "token expired")]
#[case::rate_limited(TransportError::rate_limited("quota exceeded"), "quota exceeded")]
#[case::rejected(TransportError::rejected("invalid topic"), "invalid topic")]
#[case::timeout(TransportError::timeout("read timed out"), "read timed out")]
#[tokio::test]
async fn every_transport_error_becomes_failed(
    envelope: NotificationEnvelope,
    #[case] failure: TransportError,
    #[case] reason: &str,
) {
    let mut transport = MockTransport::new();
    transport
        .expect_send()
        .times(1)
        .returning(move |_| Err(failure.clone()));

    let result = dispatcher().dispatch(&envelope, Some(&transport)).await;

    assert_eq!(result.reason(), Some(reason));
    assert!(matches!(result, DispatchResult::Failed { .. }));
}

#[rstest]
#[tokio::test]
async fn repeated_dispatch_sends_each_time(envelope: NotificationEnvelope) {
    let mut transport = MockTransport::new();
    transport.expect_send().times(2).returning(|_| Ok(()));
    let dispatcher = dispatcher();

    let first = dispatcher.dispatch(&envelope, Some(&transport)).await;
    let second = dispatcher.dispatch(&envelope, Some(&transport)).await;

    assert_eq!(first, DispatchResult::Sent);
    assert_eq!(second, DispatchResult::Sent);
}

struct StalledTransport;

#[async_trait]
impl Transport for StalledTransport {
    async fn send(&self, _envelope: &NotificationEnvelope) -> Result<(), TransportError> {
        tokio::time::sleep(Duration::from_secs(3_600)).await;
        Ok(())
    }
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn deadline_expiry_is_failed_timeout(envelope: NotificationEnvelope) {
    let dispatcher = Dispatcher::new(DispatcherConfig {
        send_deadline: Some(Duration::from_millis(250)),
    });

    let result = dispatcher.dispatch(&envelope, Some(&StalledTransport)).await;

    assert_eq!(
        result,
        DispatchResult::Failed {
            reason: "timeout".to_owned()
        }
    );
}

#[rstest]
#[case::sent(Ok(()), DispatchOutcomeLabel::Sent)]
#[case::failed(Err(TransportError::network("down")), DispatchOutcomeLabel::Failed)]
#[tokio::test]
async fn outcomes_are_recorded_once(
    envelope: NotificationEnvelope,
    #[case] send_result: Result<(), TransportError>,
    #[case] expected: DispatchOutcomeLabel,
) {
    let mut transport = MockTransport::new();
    transport
        .expect_send()
        .times(1)
        .returning(move |_| send_result.clone());
    let mut metrics = MockDispatchMetrics::new();
    metrics
        .expect_record()
        .withf(move |record| {
            record.outcome == expected && record.kind == NotificationKind::NewUser
        })
        .times(1)
        .returning(|_| Ok(()));
    let dispatcher = Dispatcher::with_metrics(Arc::new(metrics), DispatcherConfig::default());

    let _result = dispatcher.dispatch(&envelope, Some(&transport)).await;
}

#[rstest]
#[tokio::test]
async fn skipped_outcome_is_recorded(envelope: NotificationEnvelope) {
    let mut metrics = MockDispatchMetrics::new();
    metrics
        .expect_record()
        .withf(|record| record.outcome == DispatchOutcomeLabel::Skipped)
        .times(1)
        .returning(|_| Ok(()));
    let dispatcher = Dispatcher::with_metrics(Arc::new(metrics), DispatcherConfig::default());

    let result = dispatcher.dispatch(&envelope, None).await;

    assert!(matches!(result, DispatchResult::Skipped { .. }));
}

#[rstest]
#[tokio::test]
async fn metrics_failures_do_not_change_outcome(envelope: NotificationEnvelope) {
    let mut transport = MockTransport::new();
    transport.expect_send().times(1).returning(|_| Ok(()));
    let mut metrics = MockDispatchMetrics::new();
    metrics
        .expect_record()
        .with(always())
        .times(1)
        .returning(|_| Err(DispatchMetricsError::export("registry offline")));
    let dispatcher = Dispatcher::with_metrics(Arc::new(metrics), DispatcherConfig::default());

    let result = dispatcher.dispatch(&envelope, Some(&transport)).await;

    assert_eq!(result, DispatchResult::Sent);
}

#[rstest]
#[tokio::test]
async fn no_deadline_defers_to_transport(envelope: NotificationEnvelope) {
    let mut transport = MockTransport::new();
    transport.expect_send().times(1).returning(|_| Ok(()));
    let dispatcher = Dispatcher::new(DispatcherConfig {
        send_deadline: None,
    });

    let result = dispatcher.dispatch(&envelope, Some(&transport)).await;

    assert_eq!(result, DispatchResult::Sent);
}
