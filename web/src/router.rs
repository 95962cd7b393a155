use crate::controller::{health_check_controller, oauth_controller, token_controller};
use crate::{params, response, AppState};
use axum::{
    routing::{get, post},
    Router,
};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI document. To be a part
// of the rendered document, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "OAuth Relay API"
        ),
        paths(
            health_check_controller::health_check,
            oauth_controller::authorize,
            oauth_controller::callback,
            token_controller::refresh,
        ),
        components(
            schemas(
                params::oauth::RefreshParams,
                response::health::HealthResponse,
                response::tokens::CallbackTokensResponse,
                response::tokens::RefreshResponse,
                response::tokens::UserResponse,
            )
        ),
        tags(
            (name = "oauth_relay", description = "OAuth 2.0 authorization-code relay")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(oauth_routes(app_state.clone()))
        .merge(token_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn oauth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/auth", get(oauth_controller::authorize))
        .route("/callback", get(oauth_controller::callback))
        .with_state(app_state)
}

fn token_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/refresh", post(token_controller::refresh))
        .with_state(app_state)
}
