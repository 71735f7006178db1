//! OAuth bearer tokens for the FCM HTTP v1 API.
//!
//! Two sources exist: an operator-supplied static token, and the GCE metadata
//! server, whose tokens are cached until shortly before they expire.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;
use zeroize::Zeroizing;

/// Tokens are refreshed this long before the server-reported expiry.
const EXPIRY_MARGIN_SECONDS: i64 = 60;
/// Upper bound on honoured token lifetimes.
const MAX_LIFETIME_SECONDS: i64 = 86_400;
const METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";
const METADATA_FLAVOR: &str = "Google";

/// Bearer token whose backing memory is wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    /// Wrap a raw token, returning `None` when it is blank.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = Zeroizing::new(raw.into());
        if raw.trim().is_empty() {
            return None;
        }
        Some(Self(Zeroizing::new(raw.trim().to_owned())))
    }

    /// Token text for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Errors raised while obtaining an access token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessTokenError {
    /// The token endpoint could not be reached.
    #[error("token request failed: {message}")]
    Request {
        /// Client error text.
        message: String,
    },
    /// The token endpoint answered with a non-success status.
    #[error("token endpoint returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
    /// The token response body could not be decoded.
    #[error("token response could not be decoded: {message}")]
    Decode {
        /// Decoder diagnostic.
        message: String,
    },
}

/// Supplier of bearer tokens for provider calls.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    /// Return a token valid for at least the next request.
    async fn access_token(&self) -> Result<BearerToken, AccessTokenError>;
}

/// Operator-provided token used verbatim.
#[derive(Debug, Clone)]
pub struct StaticAccessToken {
    token: BearerToken,
}

impl StaticAccessToken {
    /// Serve `token` for every request.
    #[must_use]
    pub const fn new(token: BearerToken) -> Self {
        Self { token }
    }
}

#[async_trait]
impl AccessTokenSource for StaticAccessToken {
    async fn access_token(&self) -> Result<BearerToken, AccessTokenError> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct MetadataTokenDto {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    token: BearerToken,
    refresh_at: DateTime<Utc>,
}

impl CachedToken {
    fn issued(token: BearerToken, now: DateTime<Utc>, expires_in_seconds: i64) -> Self {
        let usable = expires_in_seconds.clamp(0, MAX_LIFETIME_SECONDS) - EXPIRY_MARGIN_SECONDS;
        let refresh_at = now + TimeDelta::seconds(usable.max(0));
        Self { token, refresh_at }
    }

    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.refresh_at
    }
}

/// Token source backed by the GCE metadata server.
///
/// Concurrent callers share one refresh; the cache is guarded by an async
/// mutex held across the request.
pub struct MetadataServerTokenSource {
    client: Client,
    token_url: Url,
    clock: Arc<dyn Clock>,
    cached: Mutex<Option<CachedToken>>,
}

impl MetadataServerTokenSource {
    /// Build a source requesting tokens from `token_url`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        token_url: Url,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            token_url,
            clock,
            cached: Mutex::new(None),
        })
    }

    async fn fetch(&self) -> Result<MetadataTokenDto, AccessTokenError> {
        let response = self
            .client
            .get(self.token_url.clone())
            .header(METADATA_FLAVOR_HEADER, METADATA_FLAVOR)
            .send()
            .await
            .map_err(|error| AccessTokenError::Request {
                message: error.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(AccessTokenError::Status {
                status: status.as_u16(),
            });
        }
        let body = response
            .bytes()
            .await
            .map_err(|error| AccessTokenError::Request {
                message: error.to_string(),
            })?;
        decode_metadata_token(body.as_ref())
    }
}

#[async_trait]
impl AccessTokenSource for MetadataServerTokenSource {
    async fn access_token(&self) -> Result<BearerToken, AccessTokenError> {
        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref().filter(|entry| entry.is_fresh(self.clock.utc())) {
            return Ok(entry.token.clone());
        }

        let dto = self.fetch().await?;
        let token = BearerToken::new(dto.access_token).ok_or_else(|| AccessTokenError::Decode {
            message: "access_token is empty".to_owned(),
        })?;
        let entry = CachedToken::issued(token.clone(), self.clock.utc(), dto.expires_in);
        debug!(refresh_at = %entry.refresh_at, "cached metadata server access token");
        *cached = Some(entry);
        Ok(token)
    }
}

fn decode_metadata_token(body: &[u8]) -> Result<MetadataTokenDto, AccessTokenError> {
    serde_json::from_slice(body).map_err(|error| AccessTokenError::Decode {
        message: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    //! Coverage for token wrapping, decoding and cache freshness.

    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_760_000_000 + seconds, 0)
            .single()
            .expect("valid timestamp")
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("   ")]
    fn blank_tokens_are_rejected(#[case] raw: &str) {
        assert!(BearerToken::new(raw).is_none());
    }

    #[test]
    fn tokens_are_trimmed_and_redacted() {
        let token = BearerToken::new(" ya29.secret \n").expect("token");
        assert_eq!(token.expose(), "ya29.secret");
        assert_eq!(format!("{token:?}"), "BearerToken(<redacted>)");
    }

    #[tokio::test]
    async fn static_source_returns_configured_token() {
        let source = StaticAccessToken::new(BearerToken::new("ya29.static").expect("token"));
        let token = source.access_token().await.expect("static token");
        assert_eq!(token.expose(), "ya29.static");
    }

    #[test]
    fn decodes_metadata_response() {
        let body = br#"{"access_token":"ya29.meta","expires_in":3599,"token_type":"Bearer"}"#;
        let dto = decode_metadata_token(body).expect("decodes");
        assert_eq!(dto.access_token, "ya29.meta");
        assert_eq!(dto.expires_in, 3_599);
    }

    #[test]
    fn rejects_malformed_metadata_response() {
        let error = decode_metadata_token(b"<html>").expect_err("must fail");
        assert!(matches!(error, AccessTokenError::Decode { .. }));
    }

    #[rstest]
    #[case::fresh(0, true)]
    #[case::before_margin(3_538, true)]
    #[case::inside_margin(3_539, false)]
    #[case::expired(4_000, false)]
    fn cached_tokens_refresh_before_expiry(#[case] elapsed: i64, #[case] fresh: bool) {
        let token = BearerToken::new("ya29.cached").expect("token");
        let entry = CachedToken::issued(token, at(0), 3_599);
        assert_eq!(entry.is_fresh(at(elapsed)), fresh);
    }

    #[test]
    fn short_lived_tokens_are_never_fresh() {
        let token = BearerToken::new("ya29.short").expect("token");
        let entry = CachedToken::issued(token, at(0), 30);
        assert!(!entry.is_fresh(at(0)));
    }
}
