// Legal Agents - tool-routing front agent, legal advisor pipeline and business-registry lookups

pub mod config;
pub mod models;
pub mod types;
pub mod agents;
pub mod business;
pub mod llm;
pub mod tools;
pub mod routes;
pub mod middleware;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;
pub use routes::ServiceKind;

pub fn create_router(state: AppState, kind: ServiceKind) -> axum::Router {
    routes::create_router(state, kind)
}
