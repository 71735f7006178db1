//! Domain port for handing envelopes to a push-delivery provider.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::NotificationEnvelope;

define_port_error! {
    /// Errors surfaced by a transport adapter while delivering an envelope.
    pub enum TransportError {
        /// The provider could not be reached or the connection failed.
        Network {
            /// Provider or client message.
            message: String,
        } => "{message}",
        /// The provider did not answer within the adapter's deadline.
        Timeout {
            /// Provider or client message.
            message: String,
        } => "{message}",
        /// The provider rejected the credentials presented by the adapter.
        Unauthorized {
            /// Provider or client message.
            message: String,
        } => "{message}",
        /// The provider throttled the request.
        RateLimited {
            /// Provider or client message.
            message: String,
        } => "{message}",
        /// The provider refused the message as invalid.
        Rejected {
            /// Provider or client message.
            message: String,
        } => "{message}",
    }
}

impl TransportError {
    /// Underlying provider or network message, without decoration.
    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Self::Network { message }
            | Self::Timeout { message }
            | Self::Unauthorized { message }
            | Self::RateLimited { message }
            | Self::Rejected { message } => message.as_str(),
        }
    }
}

/// Capability for delivering one envelope to its topic.
///
/// Implementations perform exactly one outbound call per `send` and never
/// retry on their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `envelope` to the provider.
    async fn send(&self, envelope: &NotificationEnvelope) -> Result<(), TransportError>;
}
