//! Reqwest-backed FCM transport adapter.
//!
//! This adapter owns transport details only: bearer authentication, request
//! serialisation, and mapping HTTP failures onto [`TransportError`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::{ErrorResponseDto, SendRequestDto};
use super::token::{AccessTokenError, AccessTokenSource};
use crate::domain::NotificationEnvelope;
use crate::domain::ports::{Transport, TransportError};

const DEFAULT_USER_AGENT: &str = "notifier-fcm-transport/0.1";

/// Errors raised while constructing the adapter.
#[derive(Debug, thiserror::Error)]
pub enum FcmTransportBuildError {
    /// The send URL could not be derived from the endpoint and project.
    #[error("invalid FCM send URL: {0}")]
    Url(#[from] url::ParseError),
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// FCM HTTP v1 adapter posting one message per envelope.
pub struct FcmHttpTransport {
    client: Client,
    send_url: Url,
    tokens: Arc<dyn AccessTokenSource>,
}

impl FcmHttpTransport {
    /// Build an adapter for `project_id` against `endpoint`.
    /// ```rust,ignore
    /// let transport = FcmHttpTransport::new(&endpoint, "shop-admin", tokens, timeout)?;
    /// ```
    /// # Errors
    ///
    /// Returns an error when the send URL is invalid or the reqwest client
    /// cannot be constructed.
    pub fn new(
        endpoint: &Url,
        project_id: &str,
        tokens: Arc<dyn AccessTokenSource>,
        timeout: Duration,
    ) -> Result<Self, FcmTransportBuildError> {
        let send_url = send_url(endpoint, project_id)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            send_url,
            tokens,
        })
    }

    /// URL receiving `messages:send` requests.
    #[must_use]
    pub const fn send_url(&self) -> &Url {
        &self.send_url
    }
}

#[async_trait]
impl Transport for FcmHttpTransport {
    async fn send(&self, envelope: &NotificationEnvelope) -> Result<(), TransportError> {
        let token = self
            .tokens
            .access_token()
            .await
            .map_err(map_token_error)?;

        let response = self
            .client
            .post(self.send_url.clone())
            .bearer_auth(token.expose())
            .json(&SendRequestDto::from_envelope(envelope))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), topic = envelope.topic(), "FCM accepted message");
            return Ok(());
        }

        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(status, body.as_ref()))
    }
}

fn send_url(endpoint: &Url, project_id: &str) -> Result<Url, url::ParseError> {
    let base = endpoint.as_str().trim_end_matches('/');
    Url::parse(&format!("{base}/v1/projects/{project_id}/messages:send"))
}

fn map_token_error(error: AccessTokenError) -> TransportError {
    match error {
        AccessTokenError::Request { .. } => TransportError::network(error.to_string()),
        AccessTokenError::Status { .. } | AccessTokenError::Decode { .. } => {
            TransportError::unauthorized(error.to_string())
        }
    }
}

fn map_transport_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::timeout(error.to_string())
    } else {
        TransportError::network(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> TransportError {
    let detail = serde_json::from_slice::<ErrorResponseDto>(body)
        .ok()
        .and_then(|decoded| decoded.summary())
        .unwrap_or_else(|| body_preview(body));
    let message = if detail.is_empty() {
        format!("FCM returned status {}", status.as_u16())
    } else {
        format!("FCM returned status {}: {detail}", status.as_u16())
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TransportError::unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => TransportError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            TransportError::timeout(message)
        }
        _ if status.is_client_error() => TransportError::rejected(message),
        _ => TransportError::network(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
