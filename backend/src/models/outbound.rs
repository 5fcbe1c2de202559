use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::messages::ChatTurn;

/// Request for a proactive weekly check-in draft. `information` carries the
/// case manager's context and objectives for the message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinRequest {
    pub information: String,
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
}

/// Request for a follow-up to an earlier outbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpRequest {
    pub original_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_response: Option<String>,
    #[serde(default = "default_follow_up_type")]
    pub follow_up_type: String,
}

fn default_follow_up_type() -> String {
    "standard".to_string()
}

/// Request for an appointment reminder draft. Appointment fields are an
/// opaque mapping (date, time, location, ...) rendered into the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentReminderRequest {
    pub appointment: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default = "default_reminder_type")]
    pub reminder_type: String,
}

fn default_reminder_type() -> String {
    "standard".to_string()
}

/// Request for a case status update draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseUpdateRequest {
    pub case_info: Map<String, Value>,
    pub update_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_context: Option<Map<String, Value>>,
}

/// A drafted outbound message, ready for case-manager review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub message: String,
}

/// Request to compute the next weekly check-in slot for a client.
/// Preferences may carry `preferred_weekday` (0 = Monday .. 6 = Sunday) and
/// `preferred_hour` (0..=23).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinScheduleRequest {
    pub client_id: String,
    #[serde(default)]
    pub preferences: Map<String, Value>,
}

/// Computed check-in schedule. Nothing is persisted; the caller owns
/// delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinSchedule {
    pub client_id: String,
    pub scheduled_for: DateTime<Utc>,
    pub cadence: String,
}

/// Request to compute reminder times for upcoming appointments. Each
/// appointment mapping must carry an RFC 3339 `starts_at` to be scheduled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderScheduleRequest {
    pub client_id: String,
    pub appointments: Vec<Map<String, Value>>,
}

/// A single computed reminder slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledReminder {
    pub appointment_time: DateTime<Utc>,
    pub remind_at: DateTime<Utc>,
    pub label: String,
}

/// Computed reminder schedule for one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSchedule {
    pub client_id: String,
    pub reminders: Vec<ScheduledReminder>,
}
