// backend/src/routes/health.rs

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
pub struct RootStatus {
    pub message: String,
    pub version: String,
    pub environment: String,
    pub status: String,
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub version: String,
}

pub fn health_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Service banner on the bare root path.
async fn root_handler(State(state): State<AppState>) -> Json<RootStatus> {
    Json(RootStatus {
        message: "Caseline API".to_string(),
        version: VERSION.to_string(),
        environment: state
            .config
            .environment
            .clone()
            .unwrap_or_else(|| "development".to_string()),
        status: "healthy".to_string(),
    })
}

/// Simple health check endpoint.
async fn health_check() -> Json<HealthStatus> {
    tracing::debug!("Health check endpoint called");
    Json(HealthStatus {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        version: VERSION.to_string(),
    })
}
