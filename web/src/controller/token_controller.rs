use crate::params::oauth::RefreshParams;
use crate::response::tokens::RefreshResponse;
use crate::{AppState, Error};

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use domain::oauth_flow;
use log::*;

/// POST /refresh
///
/// Mints a new access token from a refresh token. The relay keeps no copy of either.
#[utoipa::path(
    post,
    path = "/refresh",
    request_body = RefreshParams,
    responses(
        (status = 200, description = "Successfully refreshed the access token", body = RefreshResponse),
        (status = 400, description = "Missing refresh_token"),
        (status = 401, description = "The provider rejected the refresh token"),
    )
)]
pub async fn refresh(
    State(app_state): State<AppState>,
    payload: Result<Json<RefreshParams>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    // An unreadable body is the same as a missing token to the caller.
    let refresh_token = match payload {
        Ok(Json(params)) => params.refresh_token,
        Err(rejection) => {
            debug!("Unreadable /refresh body: {rejection}");
            None
        }
    };

    let tokens =
        oauth_flow::refresh_access_token(app_state.provider.as_ref(), refresh_token.as_deref())
            .await?;

    Ok(Json(RefreshResponse::from(tokens)))
}
