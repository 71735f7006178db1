//! Public entry points composing the envelope builders with the dispatcher.

use std::fmt;
use std::sync::Arc;

use super::{
    Amount, DispatchResult, Dispatcher, EnvelopeValidationError, build_order_envelope,
    build_user_envelope,
};
use crate::domain::ports::Transport;

/// Admin notification service used by the host application.
///
/// The transport is optional: a service built without one reports every
/// notification as skipped, which lets the host run without push credentials.
pub struct NotificationService {
    transport: Option<Arc<dyn Transport>>,
    dispatcher: Dispatcher,
}

impl NotificationService {
    /// Compose a service from an optional transport and a dispatcher.
    #[must_use]
    pub fn new(transport: Option<Arc<dyn Transport>>, dispatcher: Dispatcher) -> Self {
        Self {
            transport,
            dispatcher,
        }
    }

    /// Whether a transport is configured.
    #[must_use]
    pub const fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    /// Announce a new order on the `admin_orders` topic.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeValidationError`] for invalid inputs. Delivery
    /// problems are reported through the returned [`DispatchResult`].
    pub async fn notify_new_order(
        &self,
        order_id: impl fmt::Display,
        amount: Amount,
        customer_name: &str,
    ) -> Result<DispatchResult, EnvelopeValidationError> {
        let envelope = build_order_envelope(order_id, amount, customer_name)?;
        Ok(self
            .dispatcher
            .dispatch(&envelope, self.transport.as_deref())
            .await)
    }

    /// Announce a newly registered user on the `admin_new_users` topic.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeValidationError`] for invalid inputs. Delivery
    /// problems are reported through the returned [`DispatchResult`].
    pub async fn notify_new_user(
        &self,
        user_name: &str,
        user_email: &str,
    ) -> Result<DispatchResult, EnvelopeValidationError> {
        let envelope = build_user_envelope(user_name, user_email)?;
        Ok(self
            .dispatcher
            .dispatch(&envelope, self.transport.as_deref())
            .await)
    }
}
