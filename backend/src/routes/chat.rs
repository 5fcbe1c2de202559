// backend/src/routes/chat.rs
// Inbound message analysis plus the conversation text utilities.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    errors::AppError,
    models::{ChatTurn, ConversationPayload},
    state::AppState,
    text_processing::{clean_history, sanitize_text},
};

#[derive(Deserialize)]
pub struct SummarizeRequest {
    pub messages: Vec<ChatTurn>,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Deserialize)]
pub struct ConciseRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct ConciseResponse {
    pub concise_text: String,
}

pub fn chat_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analyze_handler))
        .route("/summarize", post(summarize_handler))
        .route("/make-concise", post(concise_handler))
        .with_state(state)
}

/// Runs the full analysis pipeline over one conversation. The transcript is
/// sanitized and bounded before the engine sees it; requests emptied by
/// sanitization are rejected rather than analyzed as blank.
async fn analyze_handler(
    State(state): State<AppState>,
    Json(payload): Json<ConversationPayload>,
) -> Result<Response, AppError> {
    debug!(
        client_id = %payload.client_info.client_id,
        raw_messages = payload.messages.len(),
        "analysis request received"
    );

    let history = clean_history(
        payload.messages,
        state.config.max_message_chars,
        state.config.max_history_messages,
    );
    if history.is_empty() {
        return Err(AppError::InvalidInput(
            "no analyzable messages provided".to_string(),
        ));
    }

    let analysis = state
        .orchestrator
        .analyze(&payload.client_info, &history)
        .await?;

    Ok((StatusCode::OK, Json(analysis)).into_response())
}

async fn summarize_handler(
    State(state): State<AppState>,
    Json(payload): Json<SummarizeRequest>,
) -> Result<Response, AppError> {
    let history = clean_history(
        payload.messages,
        state.config.max_message_chars,
        state.config.max_history_messages,
    );

    let summary = state.summarizer.summarize(&history).await?;
    Ok((StatusCode::OK, Json(SummaryResponse { summary })).into_response())
}

async fn concise_handler(
    State(state): State<AppState>,
    Json(payload): Json<ConciseRequest>,
) -> Result<Response, AppError> {
    let text = sanitize_text(&payload.text, state.config.max_message_chars);

    let concise_text = state.rewriter.make_concise(&text).await?;
    Ok((StatusCode::OK, Json(ConciseResponse { concise_text })).into_response())
}
