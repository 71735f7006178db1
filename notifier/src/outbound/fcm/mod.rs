//! Firebase Cloud Messaging transport.
//!
//! Wiring lives here: credentials and settings are turned into an optional
//! [`Transport`]. Absent or broken credentials disable push delivery instead
//! of failing startup, so the host keeps serving orders and registrations.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use mockable::{Clock, DefaultClock, Env};
use tracing::{error, info, warn};

use crate::config::DispatchSettings;
use crate::domain::ports::Transport;

mod credentials;
mod dto;
mod http_transport;
mod token;

pub use credentials::{
    ACCESS_TOKEN_ENV, CredentialsError, FcmCredentials, SERVICE_ACCOUNT_ENV,
    fcm_credentials_from_env,
};
pub use http_transport::{FcmHttpTransport, FcmTransportBuildError};
pub use token::{
    AccessTokenError, AccessTokenSource, BearerToken, MetadataServerTokenSource,
    StaticAccessToken,
};

/// HTTP client timeout used when the dispatcher deadline is disabled.
const FALLBACK_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

static SHARED_TRANSPORT: OnceLock<Option<Arc<dyn Transport>>> = OnceLock::new();

/// Return the process-wide FCM transport, initialising it on first use.
///
/// Initialisation runs at most once; later calls return the same handle (or
/// the same absence) whatever arguments they pass.
pub fn shared_transport<E: Env>(
    env: &E,
    settings: &DispatchSettings,
) -> Option<Arc<dyn Transport>> {
    SHARED_TRANSPORT
        .get_or_init(|| build_transport(env, settings, Arc::new(DefaultClock)))
        .clone()
}

/// Build an FCM transport from the environment, or `None` when push delivery
/// cannot be configured.
pub fn build_transport<E: Env>(
    env: &E,
    settings: &DispatchSettings,
    clock: Arc<dyn Clock>,
) -> Option<Arc<dyn Transport>> {
    let credentials = match fcm_credentials_from_env(env) {
        Ok(credentials) => credentials,
        Err(error) => {
            warn!(error = %error, "FCM service account not configured; push notifications disabled");
            return None;
        }
    };

    let endpoint = match settings.fcm_endpoint() {
        Ok(endpoint) => endpoint,
        Err(error) => {
            error!(error = %error, "push notifications disabled");
            return None;
        }
    };
    let http_timeout = settings.send_deadline().unwrap_or(FALLBACK_HTTP_TIMEOUT);

    let tokens = token_source(credentials.access_token.clone(), settings, http_timeout, clock)?;

    match FcmHttpTransport::new(&endpoint, &credentials.project_id, tokens, http_timeout) {
        Ok(transport) => {
            info!(
                project_id = %credentials.project_id,
                client_email = credentials.client_email.as_deref().unwrap_or("unknown"),
                send_url = %transport.send_url(),
                "FCM transport initialised"
            );
            Some(Arc::new(transport))
        }
        Err(error) => {
            error!(error = %error, "failed to build FCM transport; push notifications disabled");
            None
        }
    }
}

fn token_source(
    static_token: Option<BearerToken>,
    settings: &DispatchSettings,
    http_timeout: Duration,
    clock: Arc<dyn Clock>,
) -> Option<Arc<dyn AccessTokenSource>> {
    if let Some(token) = static_token {
        return Some(Arc::new(StaticAccessToken::new(token)));
    }

    let token_url = match settings.metadata_token_url() {
        Ok(url) => url,
        Err(error) => {
            error!(error = %error, "push notifications disabled");
            return None;
        }
    };
    match MetadataServerTokenSource::new(token_url, http_timeout, clock) {
        Ok(source) => Some(Arc::new(source)),
        Err(error) => {
            error!(error = %error, "failed to build metadata token client; push notifications disabled");
            None
        }
    }
}
