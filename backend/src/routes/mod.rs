// backend/src/routes/mod.rs

pub mod chat;
pub mod health;
pub mod insights;
pub mod outbound;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};

use crate::middleware::{rate_limit_middleware, request_context_middleware};
use crate::state::AppState;

/// Assembles the application router: status endpoints at the root, the
/// versioned API under `/api/v1`, and the shared request middleware.
/// Request-context runs outermost so rate-limited responses still carry
/// timing and request-id headers.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .merge(health::health_routes(state.clone()))
        .nest("/api/v1/chat", chat::chat_routes(state.clone()))
        .nest("/api/v1/insights", insights::insight_routes(state.clone()))
        .nest("/api/v1/outbound", outbound::outbound_routes(state.clone()))
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware))
        .layer(from_fn(request_context_middleware))
        .with_state(state)
}
