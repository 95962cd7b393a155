//! OAuth provider trait and types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::token::Tokens;
use crate::error::Error;

/// Known OAuth identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Google,
}

impl ProviderKind {
    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
        }
    }
}

/// User information retrieved from the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Trait for OAuth 2.0 identity providers.
///
/// The relay owns no token logic of its own; every operation here is a
/// pass-through to the provider's documented endpoints.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider kind.
    fn provider(&self) -> ProviderKind;

    /// Build the URL the user agent is redirected to for consent.
    ///
    /// The URL requests offline access and forces the consent prompt so a
    /// refresh token is issued.
    ///
    /// # Arguments
    ///
    /// * `state` - CSRF state token to round-trip through the provider
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for access and refresh tokens.
    ///
    /// Fails with `OAuthErrorKind::TokenExchangeFailed` when the provider
    /// rejects the code.
    async fn exchange_code(&self, code: &str) -> Result<Tokens, Error>;

    /// Get user information using an access token.
    async fn get_user_info(&self, access_token: &str) -> Result<UserInfo, Error>;

    /// Mint a new access token from a refresh token.
    ///
    /// Fails with `OAuthErrorKind::TokenRefreshFailed` when the refresh token
    /// is revoked or invalid.
    async fn refresh_token(&self, refresh_token: &str) -> Result<Tokens, Error>;
}
