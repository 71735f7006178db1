//! FCM credential loading from the process environment.
//!
//! `FIREBASE_SERVICE_ACCOUNT` carries the service-account JSON document; only
//! the identifying fields are retained and the raw text is wiped after
//! parsing. `FCM_ACCESS_TOKEN` optionally supplies a ready-made bearer token;
//! without it the adapter asks the metadata server.

use mockable::Env;
use serde::Deserialize;
use zeroize::Zeroizing;

use super::token::BearerToken;

/// Variable holding the service-account JSON document.
pub const SERVICE_ACCOUNT_ENV: &str = "FIREBASE_SERVICE_ACCOUNT";
/// Variable holding an optional static bearer token.
pub const ACCESS_TOKEN_ENV: &str = "FCM_ACCESS_TOKEN";

/// Identity needed to address the FCM project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FcmCredentials {
    /// Firebase project identifier used in the send URL.
    pub project_id: String,
    /// Service-account principal, kept for diagnostics.
    pub client_email: Option<String>,
    /// Static bearer token, when the operator supplied one.
    pub access_token: Option<BearerToken>,
}

/// Errors raised while reading FCM credentials.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsError {
    /// A required environment variable is missing or blank.
    #[error("{name} env variable missing")]
    MissingEnv {
        /// Variable name.
        name: &'static str,
    },
    /// The service-account document is not valid JSON.
    #[error("{name} is not valid service-account JSON: {message}")]
    InvalidJson {
        /// Variable name.
        name: &'static str,
        /// Parser diagnostic.
        message: String,
    },
    /// A required service-account field is absent or blank.
    #[error("service account is missing '{field}'")]
    MissingField {
        /// JSON field name.
        field: &'static str,
    },
    /// The project id contains characters not allowed in a URL path segment.
    #[error("service account project_id '{value}' is invalid")]
    InvalidProjectId {
        /// Rejected project id.
        value: String,
    },
}

#[derive(Deserialize)]
struct ServiceAccountDto {
    project_id: Option<String>,
    client_email: Option<String>,
}

/// Read FCM credentials from `env`.
///
/// # Examples
///
/// ```rust
/// use mockable::MockEnv;
/// use notifier::outbound::fcm::fcm_credentials_from_env;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "FIREBASE_SERVICE_ACCOUNT" => Some(r#"{"project_id":"shop-admin"}"#.to_owned()),
///     _ => None,
/// });
///
/// let credentials = fcm_credentials_from_env(&env).expect("credentials");
/// assert_eq!(credentials.project_id, "shop-admin");
/// ```
///
/// # Errors
///
/// Returns [`CredentialsError`] when the service account is missing, is not
/// JSON, or lacks a usable `project_id`.
pub fn fcm_credentials_from_env<E: Env>(env: &E) -> Result<FcmCredentials, CredentialsError> {
    let raw = env
        .string(SERVICE_ACCOUNT_ENV)
        .map(Zeroizing::new)
        .filter(|raw| !raw.trim().is_empty())
        .ok_or(CredentialsError::MissingEnv {
            name: SERVICE_ACCOUNT_ENV,
        })?;

    let account: ServiceAccountDto =
        serde_json::from_str(raw.as_str()).map_err(|error| CredentialsError::InvalidJson {
            name: SERVICE_ACCOUNT_ENV,
            message: error.to_string(),
        })?;

    let project_id = account
        .project_id
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or(CredentialsError::MissingField {
            field: "project_id",
        })?;
    if !is_valid_project_id(&project_id) {
        return Err(CredentialsError::InvalidProjectId { value: project_id });
    }

    let access_token = env
        .string(ACCESS_TOKEN_ENV)
        .and_then(BearerToken::new);

    Ok(FcmCredentials {
        project_id,
        client_email: account.client_email,
        access_token,
    })
}

fn is_valid_project_id(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}
