//! Test doubles shared by unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests and behind the `test-support` feature.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::NotificationEnvelope;
use crate::domain::ports::{Transport, TransportError};

/// Transport double that records every envelope and replays scripted results.
///
/// Once the script is exhausted every send succeeds.
///
/// # Examples
///
/// ```rust
/// use notifier::domain::build_user_envelope;
/// use notifier::domain::ports::{Transport, TransportError};
/// use notifier::test_support::RecordingTransport;
///
/// # async fn demo() {
/// let transport = RecordingTransport::scripted([Err(TransportError::network("down"))]);
/// let envelope = build_user_envelope("Rohan", "rohan@example.com").expect("valid user");
/// assert!(transport.send(&envelope).await.is_err());
/// assert!(transport.send(&envelope).await.is_ok());
/// assert_eq!(transport.sent().len(), 2);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct RecordingTransport {
    script: Mutex<VecDeque<Result<(), TransportError>>>,
    sent: Mutex<Vec<NotificationEnvelope>>,
}

impl RecordingTransport {
    /// Transport whose sends always succeed.
    #[must_use]
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// Transport replaying `script` in order before succeeding.
    #[must_use]
    pub fn scripted(script: impl IntoIterator<Item = Result<(), TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Envelopes handed to this transport, in call order.
    ///
    /// # Panics
    ///
    /// Panics when a previous holder of the record lock panicked.
    #[must_use]
    pub fn sent(&self) -> Vec<NotificationEnvelope> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| panic!("sent envelopes lock poisoned: {poisoned}"))
            .clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, envelope: &NotificationEnvelope) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| panic!("sent envelopes lock poisoned: {poisoned}"))
            .push(envelope.clone());
        self.script
            .lock()
            .unwrap_or_else(|poisoned| panic!("transport script lock poisoned: {poisoned}"))
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

/// Clock frozen at a chosen instant until a test advances it.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock reading `now` until advanced.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward by `seconds`.
    ///
    /// # Panics
    ///
    /// Panics when a previous holder of the clock lock panicked.
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}
