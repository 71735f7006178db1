//! Wire DTOs for the FCM HTTP v1 `messages:send` endpoint.
//!
//! Requests borrow from the envelope so encoding never copies the payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::NotificationEnvelope;

#[derive(Debug, Serialize)]
pub(super) struct SendRequestDto<'a> {
    pub(super) message: MessageDto<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct MessageDto<'a> {
    pub(super) topic: &'a str,
    pub(super) notification: NotificationDto<'a>,
    pub(super) data: &'a BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(super) struct NotificationDto<'a> {
    pub(super) title: &'a str,
    pub(super) body: &'a str,
}

impl<'a> SendRequestDto<'a> {
    pub(super) fn from_envelope(envelope: &'a NotificationEnvelope) -> Self {
        Self {
            message: MessageDto {
                topic: envelope.topic(),
                notification: NotificationDto {
                    title: envelope.title(),
                    body: envelope.body(),
                },
                data: envelope.data(),
            },
        }
    }
}

/// Google API error body: `{"error": {"code": 404, "message": "...", "status": "NOT_FOUND"}}`.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorResponseDto {
    pub(super) error: ErrorDetailDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorDetailDto {
    #[serde(default)]
    pub(super) message: Option<String>,
    #[serde(default)]
    pub(super) status: Option<String>,
}

impl ErrorResponseDto {
    /// Provider message prefixed with its status name when both are present.
    pub(super) fn summary(&self) -> Option<String> {
        let message = self
            .error
            .message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())?;
        Some(match self.error.status.as_deref() {
            Some(status) if !status.is_empty() => format!("{status}: {message}"),
            _ => message.to_owned(),
        })
    }
}
