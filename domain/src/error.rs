//! Error types for the `domain` layer.
use relay_auth::error::{Error as RelayAuthError, ErrorKind as RelayAuthErrorKind, OAuthErrorKind};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field holds the original error. `web` depends on
/// `domain` only and uses the `error_kind` tree to pick a status code; it never
/// sees `relay-auth` errors directly.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Errors caused by the request itself or by this process.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    /// Missing or malformed query or body parameters. Holds the client-facing message.
    InvalidRequest(String),
    /// The CSRF state token is unknown, already consumed, or expired.
    StateNotFound,
    Config,
    Other(String),
}

/// Errors reported by, or while talking to, the identity provider.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    /// The provider redirected back with an `error` parameter. Holds the provider's code.
    ProviderDenied(String),
    ExchangeFailed,
    RefreshFailed,
    Network,
}

impl Error {
    pub fn invalid_request(message: &str) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::InvalidRequest(
                message.to_string(),
            )),
        }
    }

    pub fn state_not_found() -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::StateNotFound),
        }
    }

    pub fn config(message: &str) -> Self {
        Error {
            source: Some(message.to_string().into()),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    }

    /// Wrap a provider failure under `kind`, keeping the original as the source.
    pub fn external(kind: ExternalErrorKind, source: RelayAuthError) -> Self {
        Error {
            source: Some(Box::new(source)),
            error_kind: DomainErrorKind::External(kind),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `relay-auth` layer to the `domain` layer.
impl From<RelayAuthError> for Error {
    fn from(err: RelayAuthError) -> Self {
        let error_kind = match &err.error_kind {
            RelayAuthErrorKind::OAuth(OAuthErrorKind::TokenRefreshFailed) => {
                DomainErrorKind::External(ExternalErrorKind::RefreshFailed)
            }
            RelayAuthErrorKind::OAuth(_) => {
                DomainErrorKind::External(ExternalErrorKind::ExchangeFailed)
            }
            RelayAuthErrorKind::Http(_) => DomainErrorKind::External(ExternalErrorKind::Network),
            RelayAuthErrorKind::Sweeper(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Other(err.to_string()))
            }
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}
