use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

const FORWARDED_FOR: &str = "x-forwarded-for";
const UNKNOWN: &str = "unknown";

/// Network address of the client that sent the request. Only used for logging.
///
/// Prefers the peer address from `ConnectInfo`, then the first `X-Forwarded-For`
/// entry, then `"unknown"`. Never rejects.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OriginAddress(pub String);

impl<S> FromRequestParts<S> for OriginAddress
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OriginAddress(origin_from_parts(parts)))
    }
}

fn origin_from_parts(parts: &Parts) -> String {
    if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    parts
        .headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}
