//! Token payloads handed back to the browser.
//!
//! These are the only places a `SecretString` is exposed.

use domain::oauth_flow::CompletedAuthorization;
use domain::{Tokens, UserInfo};
use secrecy::ExposeSecret;
use serde::Serialize;
use utoipa::ToSchema;

/// Profile fields returned alongside the tokens
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserResponse {
    pub(crate) email: String,
    pub(crate) name: Option<String>,
    pub(crate) picture: Option<String>,
}

impl From<UserInfo> for UserResponse {
    fn from(user: UserInfo) -> Self {
        Self {
            email: user.email,
            name: user.name,
            picture: user.picture,
        }
    }
}

/// `/callback?format=json` success body
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CallbackTokensResponse {
    pub(crate) access_token: String,
    pub(crate) refresh_token: Option<String>,
    /// Unix epoch milliseconds
    pub(crate) expiry_date: Option<i64>,
    pub(crate) user: UserResponse,
}

impl From<CompletedAuthorization> for CallbackTokensResponse {
    fn from(completed: CompletedAuthorization) -> Self {
        let expiry_date = completed.tokens.expiry_date();
        Self {
            access_token: completed.tokens.access_token.expose_secret().clone(),
            refresh_token: completed
                .tokens
                .refresh_token
                .as_ref()
                .map(|token| token.expose_secret().clone()),
            expiry_date,
            user: completed.user.into(),
        }
    }
}

/// `/refresh` success body
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct RefreshResponse {
    pub(crate) access_token: String,
    /// Unix epoch milliseconds
    pub(crate) expiry_date: Option<i64>,
}

impl From<Tokens> for RefreshResponse {
    fn from(tokens: Tokens) -> Self {
        Self {
            access_token: tokens.access_token.expose_secret().clone(),
            expiry_date: tokens.expiry_date(),
        }
    }
}
