use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use crate::response::health::HealthResponse;

/// GET liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API router is up and responding to requests", body = HealthResponse),
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse::ok(Utc::now()))
}

#[cfg(test)]
mod tests {
    use crate::router::define_routes;
    use crate::test_support::{app_state, body_json, FakeProvider};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let response = define_routes(app_state(FakeProvider::default()))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        let timestamp = body["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }
}
