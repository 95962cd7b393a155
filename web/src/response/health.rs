use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Liveness payload returned by `/health`
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct HealthResponse {
    pub(crate) status: String,
    #[schema(value_type = String, format = DateTime)]
    pub(crate) timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub(crate) fn ok(now: DateTime<Utc>) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: now,
        }
    }
}
