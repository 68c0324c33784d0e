use axum::{
    Router,
    routing::{get, post},
    Json,
    extract::{rejection::JsonRejection, State},
    response::Json as ResponseJson,
};
use serde_json::{json, Value};
use tracing::info;
use validator::Validate;

use super::reject_body;
use crate::models::{AppState, RouterResponse, UserRequest};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/user", post(user_prompt))
        .with_state(state)
}

async fn root() -> ResponseJson<Value> {
    Json(json!({"message": "Agent 1 is running. Use /api/user to send questions."}))
}

pub async fn user_prompt(
    State(state): State<AppState>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> AppResult<ResponseJson<RouterResponse>> {
    let Json(request) = payload.map_err(reject_body)?;
    request
        .validate()
        .map_err(|_| AppError::InvalidRequest("Missing 'question' in payload".to_string()))?;

    info!(question_len = request.question.len(), "Received user question");

    let response = state.router.generate(&request.question).await?;
    Ok(Json(response))
}
