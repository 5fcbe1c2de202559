// backend/src/routes/insights.rs

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::debug;

use crate::{
    errors::AppError,
    models::{InsightRequest, PortfolioReportRequest},
    state::AppState,
    text_processing::clean_history,
};

pub fn insight_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/micro", post(micro_insight_handler))
        .route("/report", post(report_handler))
        .with_state(state)
}

/// Produces the one-sentence dashboard insight for a client. Model trouble
/// never surfaces here; the engine degrades to a safe default instead.
async fn micro_insight_handler(
    State(state): State<AppState>,
    Json(mut payload): Json<InsightRequest>,
) -> Result<Response, AppError> {
    if payload.client_id.trim().is_empty() {
        return Err(AppError::InvalidInput("client_id is required".to_string()));
    }
    debug!(client_id = %payload.client_id, "micro insight requested");

    payload.messages = clean_history(
        payload.messages,
        state.config.max_message_chars,
        state.config.max_history_messages,
    );

    let insight = state.insight_engine.run(&payload).await;
    Ok((StatusCode::OK, Json(insight)).into_response())
}

async fn report_handler(
    State(state): State<AppState>,
    Json(payload): Json<PortfolioReportRequest>,
) -> Result<Response, AppError> {
    if payload.report_period.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "report_period is required".to_string(),
        ));
    }

    let report = state.report_engine.generate(&payload).await?;
    Ok((StatusCode::OK, Json(report)).into_response())
}
