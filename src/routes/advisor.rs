use axum::{
    Router,
    routing::post,
    Json,
    extract::{rejection::JsonRejection, State},
    response::Json as ResponseJson,
};
use tracing::{error, info};

use super::reject_body;
use crate::models::{AdvisorRequest, AdvisorResponse, AppState, ResponseMeta};
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/legal-advisor-and-referral", post(legal_advisor))
        .with_state(state)
}

/// Agent-to-agent endpoint. Client errors map to 400, everything else to 500.
pub async fn legal_advisor(
    State(state): State<AppState>,
    payload: Result<Json<AdvisorRequest>, JsonRejection>,
) -> AppResult<ResponseJson<AdvisorResponse>> {
    let Json(request) = payload.map_err(reject_body)?;
    info!(mode = ?request.mode, "Received advisor request");

    let (mode_used, answer_markdown) = state.advisor.handle_request(request).await.map_err(|e| {
        error!(error = %e, "Advisor request failed");
        e
    })?;

    Ok(Json(AdvisorResponse {
        mode_used,
        answer_markdown,
        meta: ResponseMeta {
            success: true,
            error: None,
        },
    }))
}
