//! Error types for the `relay-auth` crate.
//!
//! Follows the same pattern as domain::error with a root Error struct and error kind enums.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for relay-auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in relay-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    OAuth(OAuthErrorKind),
    Sweeper(SweeperErrorKind),
    Http(HttpErrorKind),
}

/// Errors from OAuth operations against the identity provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OAuthErrorKind {
    TokenExchangeFailed,
    TokenRefreshFailed,
    UserInfoFailed,
    InvalidResponse,
}

/// Errors from the background state sweeper lifecycle.
#[derive(Debug, PartialEq)]
pub enum SweeperErrorKind {
    AlreadyRunning,
    JoinFailed,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Network,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::OAuth(kind) => write!(f, "OAuth error: {:?}", kind),
            ErrorKind::Sweeper(kind) => write!(f, "State sweeper error: {:?}", kind),
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

/// Helper function to create OAuth errors.
pub fn oauth_error(kind: OAuthErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::OAuth(kind),
    }
}

/// Helper function to create sweeper errors.
pub fn sweeper_error(kind: SweeperErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Sweeper(kind),
    }
}
