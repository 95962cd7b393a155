//! Controller for the browser-facing half of the authorization-code flow.
//!
//! Neither endpoint checks an API version header: both are reached through
//! browser redirects, which cannot set custom headers.

use crate::controller::found;
use crate::extractors::origin_address::OriginAddress;
use crate::params::oauth::{AuthParams, CallbackQuery};
use crate::response::tokens::CallbackTokensResponse;
use crate::{AppState, Error};

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use domain::error::Error as DomainError;
use domain::oauth_flow::{self, MISSING_CALLBACK_PARAMS};
use log::*;

/// GET /auth
///
/// Starts an authorization attempt and redirects to the provider's consent screen.
#[utoipa::path(
    get,
    path = "/auth",
    params(AuthParams),
    responses(
        (status = 302, description = "Redirect to the identity provider's authorization endpoint"),
    )
)]
pub async fn authorize(
    State(app_state): State<AppState>,
    OriginAddress(origin_address): OriginAddress,
    query: Result<Query<AuthParams>, QueryRejection>,
) -> Response {
    // Starting a flow never fails; an unreadable query just loses its return_url.
    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            warn!("Ignoring unreadable /auth query: {rejection}");
            AuthParams::default()
        }
    };

    let url = oauth_flow::begin_authorization(
        app_state.provider.as_ref(),
        &app_state.state_cache,
        &app_state.config,
        params.return_url,
        origin_address,
    );
    found(url)
}

/// GET /callback
///
/// Handles the provider's redirect back after consent.
#[utoipa::path(
    get,
    path = "/callback",
    params(CallbackQuery),
    responses(
        (status = 302, description = "Redirect to the return URL with auth=success appended"),
        (status = 200, description = "Tokens and profile, when format=json", body = CallbackTokensResponse),
        (status = 400, description = "Provider error, missing parameters, or invalid state"),
        (status = 500, description = "Token exchange failed"),
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    query: Result<Query<CallbackQuery>, QueryRejection>,
) -> Result<Response, Error> {
    let Query(query) = query.map_err(|rejection| {
        warn!("Unreadable /callback query: {rejection}");
        DomainError::invalid_request(MISSING_CALLBACK_PARAMS)
    })?;
    let wants_json = query.wants_json();

    let completed = oauth_flow::complete_callback(
        app_state.provider.as_ref(),
        &app_state.state_cache,
        query.into(),
    )
    .await?;

    if wants_json {
        return Ok(Json(CallbackTokensResponse::from(completed)).into_response());
    }

    Ok(found(completed.success_redirect_url()))
}
