//! OAuth token types.

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use serde::Deserialize;

/// OAuth tokens with metadata.
#[derive(Debug, Clone)]
pub struct Tokens {
    /// Access token for API requests.
    pub access_token: SecretString,
    /// Refresh token for obtaining new access tokens. Providers only return
    /// one on the first consent or when `prompt=consent` is forced.
    pub refresh_token: Option<SecretString>,
    /// When the access token expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Token type (usually "Bearer").
    pub token_type: String,
    /// Granted scopes.
    pub scopes: Vec<String>,
}

impl Tokens {
    /// Access token expiry as Unix epoch milliseconds.
    pub fn expiry_date(&self) -> Option<i64> {
        self.expires_at.map(|expires| expires.timestamp_millis())
    }
}

/// Token endpoint response body (RFC 6749 section 5.1).
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenResponse {
    /// Convert into [`Tokens`], anchoring `expires_in` at `received_at`.
    pub fn into_tokens(self, received_at: DateTime<Utc>) -> Tokens {
        Tokens {
            access_token: SecretString::new(self.access_token),
            refresh_token: self.refresh_token.map(SecretString::new),
            expires_at: self
                .expires_in
                .map(|secs| received_at + Duration::seconds(secs)),
            token_type: self.token_type,
            scopes: self.scope.split_whitespace().map(str::to_string).collect(),
        }
    }
}
