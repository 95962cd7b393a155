use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Query parameters for starting an authorization attempt
///
/// # Fields
///
/// * `return_url` - Where the browser lands after a successful callback
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct AuthParams {
    /// Where to send the browser once the flow completes. Defaults to the configured URL.
    pub(crate) return_url: Option<String>,
}

/// Query parameters the identity provider sends back to `/callback`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct CallbackQuery {
    /// Authorization code issued by the provider
    pub(crate) code: Option<String>,
    /// CSRF state token minted by `/auth`
    pub(crate) state: Option<String>,
    /// Error code set by the provider when the user denied consent
    pub(crate) error: Option<String>,
    /// `json` to receive the tokens as a JSON body instead of a redirect
    pub(crate) format: Option<String>,
}

impl CallbackQuery {
    pub(crate) fn wants_json(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|format| format.eq_ignore_ascii_case("json"))
    }
}

impl From<CallbackQuery> for domain::oauth_flow::CallbackParams {
    fn from(query: CallbackQuery) -> Self {
        Self {
            code: query.code,
            state: query.state,
            error: query.error,
        }
    }
}

/// Body of a `/refresh` request
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct RefreshParams {
    pub(crate) refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wants_json() {
        let mut query = CallbackQuery::default();
        assert!(!query.wants_json());

        query.format = Some("json".to_string());
        assert!(query.wants_json());

        query.format = Some("html".to_string());
        assert!(!query.wants_json());
    }

    #[test]
    fn test_refresh_params_accepts_missing_field() {
        let params: RefreshParams = serde_json::from_str("{}").unwrap();
        assert!(params.refresh_token.is_none());
    }
}
