use chrono::{DateTime, Datelike, Duration, Utc};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::messages::ChatTurn;
use crate::models::outbound::{
    CheckinSchedule, CheckinScheduleRequest, ReminderSchedule, ReminderScheduleRequest,
    ScheduledReminder,
};
use crate::services::analysis::{TaskRunner, TaskSpec};
use crate::text_processing::strip_quotes;

pub const CHECKIN_TASK: &str = "weekly_checkin";
pub const FOLLOW_UP_TASK: &str = "follow_up";
pub const APPOINTMENT_TASK: &str = "appointment_reminder";
pub const CASE_UPDATE_TASK: &str = "case_update";

const CHECKIN_SYSTEM: &str = "You are a professional outbound message \
drafting assistant for a case management team. First, silently assess the \
client's overall mood, tone, and seriousness from the entire history. Then \
craft one empathetic, concise, professional weekly check-in message (not a \
reply) that acknowledges context and any stated preferences. Incorporate \
the provided scheduling or timing subtly without sounding robotic. Output \
only the final message text, with no analysis or labels. Keep it natural, \
helpful, and human; avoid overpromising.";

const FOLLOW_UP_SYSTEM: &str = "You are drafting a follow-up message to a \
client of a case management team. Based on the original message and any \
client response, create an appropriate follow-up. Keep it professional, \
brief, and contextually relevant. Do not be pushy.";

const APPOINTMENT_SYSTEM: &str = "You are drafting an appointment reminder \
for a client of a case management team. {timing} Create a professional, \
helpful reminder that includes the relevant details. Be clear about what \
the client needs to do or bring.";

const CASE_UPDATE_SYSTEM: &str = "You are drafting a case update message \
for a client of a case management team. {guidance} Be clear, professional, \
and reassuring; avoid jargon. If action is required from the client, make \
very clear what they need to do and by when.";

/// Drafts proactive client-facing messages. Every variant funnels through
/// one completion helper so quote-stripping and logging stay uniform.
#[derive(Clone)]
pub struct OutboundComposer {
    runner: TaskRunner,
}

impl OutboundComposer {
    pub fn new(runner: TaskRunner) -> Self {
        Self { runner }
    }

    /// # Errors
    ///
    /// `InvalidInput` when `information` is blank or `history` is empty.
    pub async fn weekly_checkin(
        &self,
        information: &str,
        history: &[ChatTurn],
    ) -> Result<String, AppError> {
        let information = information.trim();
        if information.is_empty() {
            return Err(AppError::InvalidInput(
                "check-in context information is required".to_string(),
            ));
        }
        if history.is_empty() {
            return Err(AppError::InvalidInput(
                "message history is required for check-in context".to_string(),
            ));
        }

        let payload = json!({
            "objective_and_timing": information,
            "full_message_history": history,
        });
        let prompt = format!(
            "Based on this JSON, produce exactly one outbound weekly check-in \
             message (text only, not a reply):\n{payload}"
        );
        self.draft(CHECKIN_TASK, CHECKIN_SYSTEM.to_string(), 0.5, &prompt)
            .await
    }

    pub async fn follow_up(
        &self,
        original_message: &str,
        client_response: Option<&str>,
        follow_up_type: &str,
    ) -> Result<String, AppError> {
        let mut system = FOLLOW_UP_SYSTEM.to_string();
        match follow_up_type {
            "urgent" => system.push_str(
                " This is an urgent follow-up; convey appropriate urgency while \
                 remaining professional.",
            ),
            "reminder" => system.push_str(" This is a gentle reminder follow-up."),
            _ => {}
        }

        let context = json!({
            "original_message": original_message,
            "client_response": client_response,
            "follow_up_type": follow_up_type,
        });
        let prompt = format!("Generate a follow-up message based on this context:\n{context}");
        self.draft(FOLLOW_UP_TASK, system, 0.5, &prompt).await
    }

    pub async fn appointment_reminder(
        &self,
        appointment: &Map<String, Value>,
        client_name: Option<&str>,
        reminder_type: &str,
    ) -> Result<String, AppError> {
        let timing = match reminder_type {
            "advance" => "This is an advance reminder sent several days before the appointment.",
            "day_before" => "This is a day-before reminder.",
            "same_day" => "This is a same-day reminder sent on the morning of the appointment.",
            _ => "This is a standard appointment reminder.",
        };
        let system = APPOINTMENT_SYSTEM.replace("{timing}", timing);

        let context = json!({
            "appointment_details": appointment,
            "client_name": client_name,
            "reminder_type": reminder_type,
        });
        let prompt = format!("Generate an appointment reminder based on this context:\n{context}");
        self.draft(APPOINTMENT_TASK, system, 0.3, &prompt).await
    }

    pub async fn case_update(
        &self,
        case_info: &Map<String, Value>,
        update_type: &str,
        client_context: Option<&Map<String, Value>>,
    ) -> Result<String, AppError> {
        let guidance = match update_type {
            "progress" => {
                "This is a general progress update. Focus on what has been \
                 accomplished and next steps."
            }
            "milestone" => {
                "This is a milestone update about a significant development in \
                 the case."
            }
            "requirement" => "This is about a requirement or action needed from the client.",
            _ => "This is a general case update.",
        };
        let system = CASE_UPDATE_SYSTEM.replace("{guidance}", guidance);

        let context = json!({
            "case_info": case_info,
            "update_type": update_type,
            "client_context": client_context,
        });
        let prompt = format!("Generate a case update message based on this context:\n{context}");
        self.draft(CASE_UPDATE_TASK, system, 0.4, &prompt).await
    }

    async fn draft(
        &self,
        label: &'static str,
        system: String,
        temperature: f64,
        prompt: &str,
    ) -> Result<String, AppError> {
        let spec = TaskSpec::text(label, system, temperature);
        let raw = self.runner.complete_text(&spec, prompt).await?;
        let message = strip_quotes(&raw).to_string();
        info!(
            task = label,
            message_length = message.len(),
            "outbound message drafted"
        );
        Ok(message)
    }
}

/// Computes delivery schedules without persisting anything; the caller owns
/// storage and delivery. `now` is injected so the arithmetic is testable.
pub struct ReminderScheduler;

impl ReminderScheduler {
    /// Next weekly check-in slot. With valid `preferred_weekday`
    /// (0 = Monday .. 6 = Sunday) and `preferred_hour` preferences the slot
    /// is the next strictly-future occurrence of that weekday and hour;
    /// otherwise one week from `now`.
    #[must_use]
    pub fn schedule_weekly_checkin(
        request: &CheckinScheduleRequest,
        now: DateTime<Utc>,
    ) -> CheckinSchedule {
        let weekday = request
            .preferences
            .get("preferred_weekday")
            .and_then(Value::as_u64)
            .filter(|day| *day < 7);
        let hour = request
            .preferences
            .get("preferred_hour")
            .and_then(Value::as_u64)
            .filter(|hour| *hour < 24);

        let scheduled_for = match (weekday, hour) {
            (Some(weekday), Some(hour)) => next_weekly_slot(now, weekday as u32, hour as u32),
            _ => now + Duration::weeks(1),
        };

        CheckinSchedule {
            client_id: request.client_id.clone(),
            scheduled_for,
            cadence: "weekly".to_string(),
        }
    }

    /// Reminder slots at 24h and 2h before each appointment with a parseable
    /// RFC 3339 `starts_at`. Offsets already in the past are skipped, as are
    /// appointments without a usable time.
    #[must_use]
    pub fn schedule_appointment_reminders(
        request: &ReminderScheduleRequest,
        now: DateTime<Utc>,
    ) -> ReminderSchedule {
        let mut reminders = Vec::new();
        for appointment in &request.appointments {
            let starts_at = appointment
                .get("starts_at")
                .and_then(Value::as_str)
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|parsed| parsed.with_timezone(&Utc));
            let Some(starts_at) = starts_at else {
                debug!(
                    client_id = %request.client_id,
                    "skipping appointment without a parseable starts_at"
                );
                continue;
            };

            for (offset, label) in [
                (Duration::hours(24), "day_before"),
                (Duration::hours(2), "same_day"),
            ] {
                let remind_at = starts_at - offset;
                if remind_at > now {
                    reminders.push(ScheduledReminder {
                        appointment_time: starts_at,
                        remind_at,
                        label: label.to_string(),
                    });
                }
            }
        }

        ReminderSchedule {
            client_id: request.client_id.clone(),
            reminders,
        }
    }
}

fn next_weekly_slot(now: DateTime<Utc>, weekday: u32, hour: u32) -> DateTime<Utc> {
    let days_ahead = (weekday + 7 - now.weekday().num_days_from_monday()) % 7;
    let Some(candidate) = (now.date_naive() + Duration::days(i64::from(days_ahead)))
        .and_hms_opt(hour, 0, 0)
    else {
        return now + Duration::weeks(1);
    };
    let candidate = candidate.and_utc();
    if candidate <= now {
        candidate + Duration::weeks(1)
    } else {
        candidate
    }
}
