//! Notification dispatch domain.
//!
//! Purpose: build provider-neutral notification envelopes from validated
//! business inputs and deliver them through an optional transport port with
//! explicit, non-throwing outcome classification.
//!
//! Public surface:
//! - Envelope builders (`build_order_envelope`, `build_user_envelope`) and
//!   their validated value types.
//! - `Dispatcher` and `DispatchResult` for single-attempt delivery.
//! - `NotificationService` exposing `notify_new_order` / `notify_new_user`.
//! - `ports` describing the transport and metrics boundaries.

mod amount;
mod dispatcher;
mod envelope;
mod notification_service;
pub mod ports;

pub use self::amount::{AMOUNT_MAX_FRACTION_DIGITS, Amount};
pub use self::dispatcher::{
    DispatchResult, Dispatcher, DispatcherConfig, TIMEOUT_REASON, TRANSPORT_UNAVAILABLE_REASON,
};
pub use self::envelope::{
    DATA_EMAIL, DATA_ORDER_ID, DATA_TYPE, EmailAddress, EnvelopeValidationError, NEW_USER_TOPIC,
    NotificationEnvelope, NotificationKind, ORDER_TOPIC, OrderId, PersonName,
    build_order_envelope, build_user_envelope,
};
pub use self::notification_service::NotificationService;
