use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

pub(crate) mod health_check_controller;
pub(crate) mod oauth_controller;
pub(crate) mod token_controller;

/// `302 Found` to `location`. Browsers follow it with a GET, which is what both the
/// provider hop and the return hop need.
fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
