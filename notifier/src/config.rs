//! Dispatch tuning loaded via OrthoConfig.
//!
//! Only non-secret knobs live here. Provider credentials are read separately
//! by the FCM adapter so they never pass through layered configuration files.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::DispatcherConfig;

/// Default Firebase Cloud Messaging API base URL.
pub const DEFAULT_FCM_ENDPOINT: &str = "https://fcm.googleapis.com/";
/// Default GCE metadata server token URL.
pub const DEFAULT_METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Errors raised when configured values cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A URL setting could not be parsed.
    #[error("invalid URL for {name}='{value}': {message}")]
    InvalidUrl {
        /// Setting name as seen in the environment.
        name: &'static str,
        /// Rejected value.
        value: String,
        /// Parser diagnostic.
        message: String,
    },
}

/// Configuration values controlling notification dispatch.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "NOTIFIER")]
pub struct DispatchSettings {
    /// Deadline for one provider call in milliseconds; `0` disables it.
    #[ortho_config(default = 10_000)]
    pub timeout_ms: u64,
    /// Override for the FCM API base URL.
    pub fcm_endpoint: Option<String>,
    /// Override for the metadata server token URL.
    pub metadata_token_url: Option<String>,
}

impl DispatchSettings {
    /// Deadline applied to each transport call, or `None` when disabled.
    #[must_use]
    pub const fn send_deadline(&self) -> Option<Duration> {
        match self.timeout_ms {
            0 => None,
            millis => Some(Duration::from_millis(millis)),
        }
    }

    /// Dispatcher configuration derived from these settings.
    #[must_use]
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            send_deadline: self.send_deadline(),
        }
    }

    /// Configured FCM API base URL, falling back to the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] when the override is not a URL.
    pub fn fcm_endpoint(&self) -> Result<Url, SettingsError> {
        parse_url(
            "NOTIFIER_FCM_ENDPOINT",
            self.fcm_endpoint.as_deref().unwrap_or(DEFAULT_FCM_ENDPOINT),
        )
    }

    /// Configured metadata token URL, falling back to the GCE default.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] when the override is not a URL.
    pub fn metadata_token_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "NOTIFIER_METADATA_TOKEN_URL",
            self.metadata_token_url
                .as_deref()
                .unwrap_or(DEFAULT_METADATA_TOKEN_URL),
        )
    }
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, SettingsError> {
    Url::parse(value).map_err(|error| SettingsError::InvalidUrl {
        name,
        value: value.to_owned(),
        message: error.to_string(),
    })
}
