//! API Routes
//!
//! One binary serves any of the three services, or all of them together:
//! - `router`   - `/` and `/api/user` (front agent)
//! - `advisor`  - `/legal-advisor-and-referral` (second agent)
//! - `registry` - `/search_entity`, `/get_company_full_profile`, `/get_entrepreneur_profile`
//! - every service exposes `/api/health`

pub mod advisor;
pub mod business;
pub mod health;
pub mod user;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::http::Request;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span};
use uuid::Uuid;

use crate::middleware::cors_layer;
use crate::models::AppState;
use crate::types::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ServiceKind {
    Router,
    Advisor,
    Registry,
    All,
}

impl ServiceKind {
    pub fn services(&self) -> Vec<&'static str> {
        match self {
            ServiceKind::Router => vec!["router"],
            ServiceKind::Advisor => vec!["advisor"],
            ServiceKind::Registry => vec!["registry"],
            ServiceKind::All => vec!["router", "advisor", "registry"],
        }
    }

    fn includes(&self, other: ServiceKind) -> bool {
        *self == ServiceKind::All || *self == other
    }
}

/// Malformed JSON bodies are client errors with the usual `{detail}` shape
pub(crate) fn reject_body(rejection: JsonRejection) -> AppError {
    AppError::InvalidRequest(rejection.body_text())
}

/// Create the application router for `kind`
pub fn create_router(state: AppState, kind: ServiceKind) -> Router {
    info!(services = ?kind.services(), "Creating application router");

    let mut app = Router::new().merge(health::router(kind));

    if kind.includes(ServiceKind::Router) {
        app = app.merge(user::router(state.clone()));
    }
    if kind.includes(ServiceKind::Advisor) {
        app = app.merge(advisor::router(state.clone()));
    }
    if kind.includes(ServiceKind::Registry) {
        app = app.merge(business::router(state.clone()));
    }

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        info_span!(
            "request",
            id = %Uuid::new_v4(),
            method = %request.method(),
            uri = %request.uri(),
        )
    });

    app.layer(
        ServiceBuilder::new()
            .layer(trace)
            .layer(cors_layer(&state.config.server.cors_allowed_origins)),
    )
}
