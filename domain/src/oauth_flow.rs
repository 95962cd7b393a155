use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use log::*;
use relay_auth::oauth::providers::google::{self, GoogleOAuthUrls};
use relay_auth::oauth::token::Tokens;
use relay_auth::oauth::{PendingStateCache, Provider, UserInfo};
use secrecy::{ExposeSecret, SecretString};
use service::config::Config;
use url::Url;

/// Query parameter appended to the return URL after a successful callback.
pub const SUCCESS_PARAM: (&str, &str) = ("auth", "success");

pub const MISSING_CALLBACK_PARAMS: &str = "Missing required parameters";
pub const MISSING_REFRESH_TOKEN: &str = "Missing refresh_token";

/// Parameters the identity provider sends back to the callback.
#[derive(Debug, Default, Clone)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Result of a successful callback: the caller's return URL plus what the provider issued.
#[derive(Debug)]
pub struct CompletedAuthorization {
    pub return_url: String,
    pub tokens: Tokens,
    pub user: UserInfo,
}

impl CompletedAuthorization {
    /// The return URL with the success indicator appended.
    pub fn success_redirect_url(&self) -> String {
        with_success_indicator(&self.return_url)
    }
}

/// Start an authorization attempt and build the provider URL to redirect to.
///
/// Falls back to the configured default return URL when `return_url` is absent or empty.
pub fn begin_authorization(
    provider: &dyn Provider,
    cache: &PendingStateCache,
    config: &Config,
    return_url: Option<String>,
    origin_address: String,
) -> String {
    let return_url = return_url
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| config.default_return_url().to_string());

    info!(
        "Beginning {} authorization for {origin_address}, returning to {return_url}",
        provider.provider().as_str()
    );

    let state = cache.begin(return_url, origin_address);
    provider.authorization_url(&state)
}

/// Validate the callback's state, exchange the code and fetch the user's profile.
///
/// The state token is consumed before the exchange is attempted, so a failed
/// exchange cannot be replayed with the same parameters.
pub async fn complete_callback(
    provider: &dyn Provider,
    cache: &PendingStateCache,
    params: CallbackParams,
) -> Result<CompletedAuthorization, Error> {
    let state = params.state.filter(|s| !s.is_empty());

    if let Some(provider_error) = params.error.filter(|e| !e.is_empty()) {
        // Don't leave a denied attempt consumable.
        if let Some(state) = state.as_deref() {
            cache.consume(state);
        }
        warn!("Identity provider returned an authorization error: {provider_error}");
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::ProviderDenied(provider_error)),
        });
    }

    let (code, state) = match (params.code.filter(|c| !c.is_empty()), state) {
        (Some(code), Some(state)) => (code, state),
        _ => {
            warn!("OAuth callback missing code or state");
            return Err(Error::invalid_request(MISSING_CALLBACK_PARAMS));
        }
    };

    let pending = cache.consume(&state).ok_or_else(|| {
        warn!("OAuth callback with unknown, consumed or expired state");
        Error::state_not_found()
    })?;

    debug!(
        "OAuth state matched flow started by {} at {}",
        pending.origin_address, pending.created_at
    );

    let tokens = provider.exchange_code(&code).await.map_err(|e| {
        error!(
            "Failed to exchange authorization code for flow from {}: {e:?}",
            pending.origin_address
        );
        Error::external(ExternalErrorKind::ExchangeFailed, e)
    })?;

    let user = provider
        .get_user_info(tokens.access_token.expose_secret())
        .await
        .map_err(|e| {
            error!("Failed to fetch user info after code exchange: {e:?}");
            Error::external(ExternalErrorKind::ExchangeFailed, e)
        })?;

    info!("Completed authorization for {}", user.email);

    Ok(CompletedAuthorization {
        return_url: pending.return_url,
        tokens,
        user,
    })
}

/// Mint a new access token from a refresh token.
pub async fn refresh_access_token(
    provider: &dyn Provider,
    refresh_token: Option<&str>,
) -> Result<Tokens, Error> {
    let refresh_token = refresh_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::invalid_request(MISSING_REFRESH_TOKEN))?;

    let tokens = provider.refresh_token(refresh_token).await.map_err(|e| {
        warn!("Identity provider rejected refresh: {e:?}");
        Error::external(ExternalErrorKind::RefreshFailed, e)
    })?;

    debug!("Refreshed access token");
    Ok(tokens)
}

/// Append `auth=success` to `return_url`, preserving any existing query.
pub fn with_success_indicator(return_url: &str) -> String {
    let (key, value) = SUCCESS_PARAM;
    match Url::parse(return_url) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair(key, value);
            url.into()
        }
        // Relative return URLs get the parameter appended by hand, ahead of any fragment.
        Err(_) => {
            let (path_and_query, fragment) = match return_url.split_once('#') {
                Some((before, fragment)) => (before, Some(fragment)),
                None => (return_url, None),
            };
            let separator = if path_and_query.contains('?') { '&' } else { '?' };
            let mut url = format!("{path_and_query}{separator}{key}={value}");
            if let Some(fragment) = fragment {
                url.push('#');
                url.push_str(fragment);
            }
            url
        }
    }
}

/// Create the Google OAuth provider from config.
pub fn google_provider(config: &Config) -> Result<google::Provider, Error> {
    let client_id = config
        .client_id()
        .ok_or_else(|| Error::config("CLIENT_ID is not configured"))?;

    let client_secret = config
        .client_secret()
        .ok_or_else(|| Error::config("CLIENT_SECRET is not configured"))?;

    let redirect_uri = config
        .redirect_uri()
        .ok_or_else(|| Error::config("REDIRECT_URI is not configured"))?;

    let defaults = GoogleOAuthUrls::default();
    let urls = GoogleOAuthUrls {
        auth_url: config.auth_url().map_or(defaults.auth_url, str::to_string),
        token_url: config.token_url().map_or(defaults.token_url, str::to_string),
        userinfo_url: config
            .userinfo_url()
            .map_or(defaults.userinfo_url, str::to_string),
    };

    Ok(google::Provider::new(
        client_id.to_string(),
        SecretString::new(client_secret.to_string()),
        redirect_uri.to_string(),
        config.scopes.clone(),
        urls,
        config.provider_timeout(),
    )?)
}
