// backend/src/routes/outbound.rs
// Proactive outreach drafting and the schedule computations behind it.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;

use crate::{
    errors::AppError,
    models::{
        AppointmentReminderRequest, CaseUpdateRequest, CheckinRequest, CheckinScheduleRequest,
        FollowUpRequest, OutboundMessage, ReminderScheduleRequest,
    },
    services::ReminderScheduler,
    state::AppState,
    text_processing::{clean_history, sanitize_text},
};

pub fn outbound_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/check-in", post(checkin_handler))
        .route("/follow-up", post(follow_up_handler))
        .route("/appointment-reminder", post(appointment_reminder_handler))
        .route("/case-update", post(case_update_handler))
        .route("/schedule/weekly-checkin", post(schedule_checkin_handler))
        .route(
            "/schedule/appointment-reminders",
            post(schedule_reminders_handler),
        )
        .with_state(state)
}

async fn checkin_handler(
    State(state): State<AppState>,
    Json(payload): Json<CheckinRequest>,
) -> Result<Response, AppError> {
    let information = sanitize_text(&payload.information, state.config.max_message_chars);
    let history = clean_history(
        payload.messages,
        state.config.max_message_chars,
        state.config.max_history_messages,
    );

    let message = state.composer.weekly_checkin(&information, &history).await?;
    Ok((StatusCode::OK, Json(OutboundMessage { message })).into_response())
}

async fn follow_up_handler(
    State(state): State<AppState>,
    Json(payload): Json<FollowUpRequest>,
) -> Result<Response, AppError> {
    let original = sanitize_text(&payload.original_message, state.config.max_message_chars);
    if original.is_empty() {
        return Err(AppError::InvalidInput(
            "original_message is required".to_string(),
        ));
    }

    let message = state
        .composer
        .follow_up(
            &original,
            payload.client_response.as_deref(),
            &payload.follow_up_type,
        )
        .await?;
    Ok((StatusCode::OK, Json(OutboundMessage { message })).into_response())
}

async fn appointment_reminder_handler(
    State(state): State<AppState>,
    Json(payload): Json<AppointmentReminderRequest>,
) -> Result<Response, AppError> {
    if payload.appointment.is_empty() {
        return Err(AppError::InvalidInput(
            "appointment details are required".to_string(),
        ));
    }

    let message = state
        .composer
        .appointment_reminder(
            &payload.appointment,
            payload.client_name.as_deref(),
            &payload.reminder_type,
        )
        .await?;
    Ok((StatusCode::OK, Json(OutboundMessage { message })).into_response())
}

async fn case_update_handler(
    State(state): State<AppState>,
    Json(payload): Json<CaseUpdateRequest>,
) -> Result<Response, AppError> {
    if payload.case_info.is_empty() {
        return Err(AppError::InvalidInput("case_info is required".to_string()));
    }

    let message = state
        .composer
        .case_update(
            &payload.case_info,
            &payload.update_type,
            payload.client_context.as_ref(),
        )
        .await?;
    Ok((StatusCode::OK, Json(OutboundMessage { message })).into_response())
}

/// Computes the next check-in slot from client preferences. Pure
/// computation; nothing is stored and no model is involved.
async fn schedule_checkin_handler(
    Json(payload): Json<CheckinScheduleRequest>,
) -> Result<Response, AppError> {
    if payload.client_id.trim().is_empty() {
        return Err(AppError::InvalidInput("client_id is required".to_string()));
    }

    let schedule = ReminderScheduler::schedule_weekly_checkin(&payload, Utc::now());
    Ok((StatusCode::OK, Json(schedule)).into_response())
}

async fn schedule_reminders_handler(
    Json(payload): Json<ReminderScheduleRequest>,
) -> Result<Response, AppError> {
    if payload.client_id.trim().is_empty() {
        return Err(AppError::InvalidInput("client_id is required".to_string()));
    }

    let schedule = ReminderScheduler::schedule_appointment_reminders(&payload, Utc::now());
    Ok((StatusCode::OK, Json(schedule)).into_response())
}
