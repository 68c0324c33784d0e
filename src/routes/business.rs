//! Registry lookup endpoints, the targets of the router agent's tools.
//!
//! Bad input answers 400 with `{detail}`; upstream failures answer 502 with
//! `{error}`.

use axum::{
    Router,
    routing::post,
    Json,
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, info};

use super::reject_body;
use crate::business::{is_valid_inn, EntityKind};
use crate::models::{AppState, InnRequest, SearchEntityRequest};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search_entity", post(search_entity))
        .route("/get_company_full_profile", post(company_full_profile))
        .route("/get_entrepreneur_profile", post(entrepreneur_profile))
        .with_state(state)
}

fn upstream_failure(e: AppError) -> Response {
    error!(error = %e, "Registry lookup failed");
    (StatusCode::BAD_GATEWAY, Json(json!({ "error": e.to_string() }))).into_response()
}

fn checked_inn(raw: &str) -> AppResult<String> {
    let inn = raw.trim();
    if !is_valid_inn(inn) {
        return Err(AppError::InvalidRequest(format!(
            "'inn' must be a 10 or 12 digit number, got '{}'",
            inn
        )));
    }
    Ok(inn.to_string())
}

pub async fn search_entity(
    State(state): State<AppState>,
    payload: Result<Json<SearchEntityRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload.map_err(reject_body)?;
    let query = request.query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidRequest("Missing 'query' in payload".to_string()));
    }
    let kind: EntityKind = request.obj.parse()?;

    info!(kind = kind.as_str(), "Registry search");
    let results = state.business.search_entity(query, kind).await;
    Ok(Json(results).into_response())
}

pub async fn company_full_profile(
    State(state): State<AppState>,
    payload: Result<Json<InnRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload.map_err(reject_body)?;
    let inn = checked_inn(&request.inn)?;

    Ok(match state.business.company_full_profile(&inn).await {
        Ok(profile) => Json(profile).into_response(),
        Err(e) => upstream_failure(e),
    })
}

pub async fn entrepreneur_profile(
    State(state): State<AppState>,
    payload: Result<Json<InnRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload.map_err(reject_body)?;
    let inn = checked_inn(&request.inn)?;

    Ok(match state.business.entrepreneur_profile(&inn).await {
        Ok(profile) => Json(profile).into_response(),
        Err(e) => upstream_failure(e),
    })
}
