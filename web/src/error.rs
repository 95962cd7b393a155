use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::*;
use serde_json::json;

use domain::error::{DomainErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind};

pub type Result<T> = core::result::Result<T, Error>;

/// Client-facing message for an unknown, consumed or expired state. The same text
/// covers all three causes.
pub const INVALID_STATE_MESSAGE: &str = "Invalid or expired state parameter";
pub const EXCHANGE_FAILED_MESSAGE: &str = "Failed to exchange authorization code";
pub const REFRESH_FAILED_MESSAGE: &str = "Failed to refresh access token";

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl Error {
    /// Status code and client-facing message for this error. Provider-side details
    /// stay in the logs.
    fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0.error_kind {
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::InvalidRequest(message) => {
                    (StatusCode::BAD_REQUEST, message.clone())
                }
                InternalErrorKind::StateNotFound => {
                    (StatusCode::BAD_REQUEST, INVALID_STATE_MESSAGE.to_string())
                }
                InternalErrorKind::Config | InternalErrorKind::Other(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                ),
            },
            DomainErrorKind::External(external_error_kind) => match external_error_kind {
                ExternalErrorKind::ProviderDenied(code) => (StatusCode::BAD_REQUEST, code.clone()),
                ExternalErrorKind::ExchangeFailed => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    EXCHANGE_FAILED_MESSAGE.to_string(),
                ),
                ExternalErrorKind::RefreshFailed => {
                    (StatusCode::UNAUTHORIZED, REFRESH_FAILED_MESSAGE.to_string())
                }
                ExternalErrorKind::Network => {
                    (StatusCode::BAD_GATEWAY, "Bad gateway".to_string())
                }
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!("Request failed with {status}: {:?}", self.0);
        } else {
            debug!("Request rejected with {status}: {message}");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error_kind: DomainErrorKind) -> (StatusCode, String) {
        Error(DomainError {
            source: None,
            error_kind,
        })
        .status_and_message()
    }

    #[test]
    fn test_invalid_request_is_bad_request_with_message() {
        assert_eq!(
            status_of(DomainErrorKind::Internal(InternalErrorKind::InvalidRequest(
                "Missing required parameters".to_string()
            ))),
            (
                StatusCode::BAD_REQUEST,
                "Missing required parameters".to_string()
            )
        );
    }

    #[test]
    fn test_state_not_found_does_not_reveal_cause() {
        assert_eq!(
            status_of(DomainErrorKind::Internal(InternalErrorKind::StateNotFound)),
            (StatusCode::BAD_REQUEST, INVALID_STATE_MESSAGE.to_string())
        );
    }

    #[test]
    fn test_provider_denied_passes_code_through() {
        assert_eq!(
            status_of(DomainErrorKind::External(ExternalErrorKind::ProviderDenied(
                "access_denied".to_string()
            ))),
            (StatusCode::BAD_REQUEST, "access_denied".to_string())
        );
    }

    #[test]
    fn test_exchange_and_refresh_failures() {
        assert_eq!(
            status_of(DomainErrorKind::External(ExternalErrorKind::ExchangeFailed)).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(DomainErrorKind::External(ExternalErrorKind::RefreshFailed)).0,
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_internal_details_are_not_returned() {
        let (status, message) = status_of(DomainErrorKind::Internal(InternalErrorKind::Other(
            "secret detail".to_string(),
        )));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("secret detail"));
    }
}
