//! Google OAuth provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::*;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::error::{oauth_error, Error, ErrorKind, OAuthErrorKind};
use crate::oauth::token::{TokenResponse, Tokens};
use crate::oauth::{ProviderKind, UserInfo};

pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Endpoint URLs for Google OAuth. Overridable so tests can target a mock server.
#[derive(Debug, Clone)]
pub struct GoogleOAuthUrls {
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for GoogleOAuthUrls {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            userinfo_url: DEFAULT_USERINFO_URL.to_string(),
        }
    }
}

/// Request to exchange authorization code for tokens
#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    code: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    grant_type: &'static str,
}

/// Request to refresh access token
#[derive(Debug, Serialize)]
struct TokenRefreshRequest<'a> {
    refresh_token: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'static str,
}

/// Google OAuth provider.
///
/// Handles OAuth 2.0 flows for Google accounts, including:
/// - Authorization URL generation with offline access
/// - Authorization code exchange
/// - Token refresh
/// - User info retrieval from Google APIs
pub struct Provider {
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
    scopes: Vec<String>,
    urls: GoogleOAuthUrls,
    http_client: reqwest::Client,
}

impl Provider {
    /// Create a new Google OAuth provider.
    ///
    /// # Arguments
    ///
    /// * `client_id` - Google OAuth client ID
    /// * `client_secret` - Google OAuth client secret
    /// * `redirect_uri` - OAuth redirect URI registered with Google
    /// * `scopes` - Scopes requested on the consent screen
    /// * `urls` - Authorization, token and userinfo endpoints
    /// * `timeout` - Per-request timeout for calls to Google
    pub fn new(
        client_id: String,
        client_secret: SecretString,
        redirect_uri: String,
        scopes: Vec<String>,
        urls: GoogleOAuthUrls,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let http_client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client_id,
            client_secret,
            redirect_uri,
            scopes,
            urls,
            http_client,
        })
    }

    async fn request_tokens<T: Serialize>(
        &self,
        form: &T,
        failure: OAuthErrorKind,
    ) -> Result<Tokens, Error> {
        let response = self
            .http_client
            .post(&self.urls.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| {
                warn!("Google token request failed: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: ErrorKind::OAuth(failure),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Google token endpoint returned {status}: {error_text}");
            return Err(oauth_error(failure, &error_text));
        }

        let received_at = Utc::now();
        let body: TokenResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse Google token response: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::OAuth(failure),
            }
        })?;

        Ok(body.into_tokens(received_at))
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn authorization_url(&self, state: &str) -> String {
        let scopes = self.scopes.join(" ");

        format!(
            "{}?\
            client_id={}&\
            redirect_uri={}&\
            response_type=code&\
            scope={}&\
            access_type=offline&\
            prompt=consent&\
            state={}",
            self.urls.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&scopes),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<Tokens, Error> {
        debug!("Exchanging Google OAuth code for tokens");

        let request = TokenExchangeRequest {
            code,
            client_id: &self.client_id,
            client_secret: self.client_secret.expose_secret(),
            redirect_uri: &self.redirect_uri,
            grant_type: "authorization_code",
        };

        let tokens = self
            .request_tokens(&request, OAuthErrorKind::TokenExchangeFailed)
            .await?;
        info!("Successfully exchanged Google OAuth code for tokens");
        Ok(tokens)
    }

    async fn get_user_info(&self, access_token: &str) -> Result<UserInfo, Error> {
        let response = self
            .http_client
            .get(&self.urls.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to get Google user info: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: ErrorKind::OAuth(OAuthErrorKind::UserInfoFailed),
                }
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Google user info error: {}", error_text);
            return Err(oauth_error(OAuthErrorKind::UserInfoFailed, &error_text));
        }

        response.json::<UserInfo>().await.map_err(|e| {
            warn!("Failed to parse Google user info: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
            }
        })
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<Tokens, Error> {
        debug!("Refreshing Google access token");

        let request = TokenRefreshRequest {
            refresh_token,
            client_id: &self.client_id,
            client_secret: self.client_secret.expose_secret(),
            grant_type: "refresh_token",
        };

        let tokens = self
            .request_tokens(&request, OAuthErrorKind::TokenRefreshFailed)
            .await?;
        info!("Successfully refreshed Google access token");
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::Provider as _;
    use mockito::Matcher;

    fn test_provider(server_url: &str) -> Provider {
        Provider::new(
            "client-123".to_string(),
            SecretString::new("secret-456".to_string()),
            "http://localhost:4000/callback".to_string(),
            vec!["openid".to_string(), "email".to_string(), "profile".to_string()],
            GoogleOAuthUrls {
                auth_url: format!("{server_url}/auth"),
                token_url: format!("{server_url}/token"),
                userinfo_url: format!("{server_url}/userinfo"),
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_authorization_url_includes_offline_consent_and_state() {
        let provider = test_provider("https://accounts.example");

        let url = provider.authorization_url("abc123");

        assert!(url.starts_with("https://accounts.example/auth?"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A4000%2Fcallback"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("state=abc123"));
    }

    #[test]
    fn test_default_urls_point_at_google() {
        let urls = GoogleOAuthUrls::default();
        assert_eq!(urls.auth_url, DEFAULT_AUTH_URL);
        assert_eq!(urls.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(urls.userinfo_url, DEFAULT_USERINFO_URL);
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let mut server = mockito::Server::new_async().await;
        let provider = test_provider(&server.url());

        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("code".into(), "auth-code".into()),
                Matcher::UrlEncoded("client_id".into(), "client-123".into()),
                Matcher::UrlEncoded("client_secret".into(), "secret-456".into()),
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"access_token":"ya29.access","refresh_token":"1//refresh","expires_in":3599,"token_type":"Bearer","scope":"openid email"}"#,
            )
            .create_async()
            .await;

        let tokens = provider.exchange_code("auth-code").await.unwrap();

        mock.assert_async().await;
        assert_eq!(tokens.access_token.expose_secret(), "ya29.access");
        assert!(tokens.refresh_token.is_some());
        assert!(tokens.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_exchange_code_rejected() {
        let mut server = mockito::Server::new_async().await;
        let provider = test_provider(&server.url());

        let _mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;

        let err = provider.exchange_code("expired-code").await.unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed)
        );
    }

    #[tokio::test]
    async fn test_exchange_code_unparseable_body() {
        let mut server = mockito::Server::new_async().await;
        let provider = test_provider(&server.url());

        let _mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = provider.exchange_code("auth-code").await.unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed)
        );
    }

    #[tokio::test]
    async fn test_refresh_token_success() {
        let mut server = mockito::Server::new_async().await;
        let provider = test_provider(&server.url());

        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("refresh_token".into(), "1//refresh".into()),
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"ya29.fresh","expires_in":3599,"token_type":"Bearer"}"#)
            .create_async()
            .await;

        let tokens = provider.refresh_token("1//refresh").await.unwrap();

        mock.assert_async().await;
        assert_eq!(tokens.access_token.expose_secret(), "ya29.fresh");
        assert!(tokens.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_refresh_token_revoked() {
        let mut server = mockito::Server::new_async().await;
        let provider = test_provider(&server.url());

        let _mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#)
            .create_async()
            .await;

        let err = provider.refresh_token("1//revoked").await.unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::TokenRefreshFailed)
        );
    }

    #[tokio::test]
    async fn test_get_user_info_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let provider = test_provider(&server.url());

        let mock = server
            .mock("GET", "/userinfo")
            .match_header("authorization", "Bearer ya29.access")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":"1234","email":"jane@example.com","name":"Jane Doe","picture":"https://example.com/p.png","verified_email":true}"#,
            )
            .create_async()
            .await;

        let user = provider.get_user_info("ya29.access").await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            user,
            UserInfo {
                email: "jane@example.com".to_string(),
                name: Some("Jane Doe".to_string()),
                picture: Some("https://example.com/p.png".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_get_user_info_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let provider = test_provider(&server.url());

        let _mock = server
            .mock("GET", "/userinfo")
            .with_status(401)
            .create_async()
            .await;

        let err = provider.get_user_info("bad-token").await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::UserInfoFailed));
    }
}
