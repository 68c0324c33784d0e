use axum::{Router, routing::get, Json, response::Json as ResponseJson};

use super::ServiceKind;
use crate::models::HealthResponse;

pub fn router(kind: ServiceKind) -> Router {
    Router::new()
        .route("/api/health", get(move || health_check(kind)))
}

async fn health_check(kind: ServiceKind) -> ResponseJson<HealthResponse> {
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        services: kind.services().into_iter().map(String::from).collect(),
    };

    Json(response)
}
