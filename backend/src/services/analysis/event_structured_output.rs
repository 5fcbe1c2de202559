use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::models::analysis::{EventDetails, EventDetection};

/// Raw event-detection payload as returned by the model. Shape mirrors
/// `EventDetection`; validation enforces the absence rule before the value
/// is trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventOutput {
    #[serde(default)]
    pub has_event: bool,
    #[serde(default)]
    pub event_details: Option<EventDetails>,
    #[serde(default)]
    pub suggested_reminder: Option<String>,
    #[serde(default)]
    pub internal_note: Option<String>,
}

pub fn get_event_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "has_event": {
                "type": "boolean",
                "description": "True if the message mentions a future event or appointment."
            },
            "event_details": {
                "type": "object",
                "properties": {
                    "date": { "type": "string" },
                    "time": { "type": "string" },
                    "location": { "type": "string" },
                    "event_type": { "type": "string" },
                    "additional_info": { "type": "string" }
                },
                "description": "Extracted event fields; null when no event was detected."
            },
            "suggested_reminder": {
                "type": "string",
                "description": "Reminder message to send to the client before the event; null when no event."
            },
            "internal_note": {
                "type": "string",
                "description": "Internal context note about the event; null when no event."
            }
        },
        "required": ["has_event"]
    })
}

impl EventOutput {
    /// Absence rule: when `has_event` is false, every optional field must be
    /// null. A "no event" verdict carrying event fields is contradictory and
    /// gets rejected rather than scrubbed.
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.has_event
            && (self.event_details.is_some()
                || self.suggested_reminder.is_some()
                || self.internal_note.is_some())
        {
            return Err(AppError::AgentOutputInvalid(
                "event payload claims no event but carries event fields".to_string(),
            ));
        }
        Ok(())
    }

    pub fn into_detection(self) -> EventDetection {
        EventDetection {
            has_event: self.has_event,
            event_details: self.event_details,
            suggested_reminder: self.suggested_reminder,
            internal_note: self.internal_note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_event_with_null_fields_passes() {
        let output = EventOutput {
            has_event: false,
            event_details: None,
            suggested_reminder: None,
            internal_note: None,
        };
        output.validate().expect("should pass");
        assert_eq!(output.into_detection(), EventDetection::none());
    }

    #[test]
    fn test_no_event_with_details_rejected() {
        let output = EventOutput {
            has_event: false,
            event_details: Some(EventDetails {
                date: Some("tomorrow".to_string()),
                ..EventDetails::default()
            }),
            suggested_reminder: None,
            internal_note: None,
        };
        assert!(matches!(
            output.validate(),
            Err(AppError::AgentOutputInvalid(_))
        ));
    }

    #[test]
    fn test_no_event_with_reminder_rejected() {
        let output = EventOutput {
            has_event: false,
            event_details: None,
            suggested_reminder: Some("Don't forget!".to_string()),
            internal_note: None,
        };
        assert!(output.validate().is_err());
    }

    #[test]
    fn test_event_with_details_passes() {
        let output = EventOutput {
            has_event: true,
            event_details: Some(EventDetails {
                date: Some("2025-06-12".to_string()),
                time: Some("10:00".to_string()),
                location: Some("County courthouse".to_string()),
                event_type: Some("hearing".to_string()),
                additional_info: None,
            }),
            suggested_reminder: Some("Reminder: your hearing is Thursday at 10am.".to_string()),
            internal_note: Some("Client mentioned a hearing date.".to_string()),
        };
        output.validate().expect("should pass");
        let detection = output.into_detection();
        assert!(detection.has_event);
        assert_eq!(
            detection.event_details.unwrap().event_type.as_deref(),
            Some("hearing")
        );
    }

    #[test]
    fn test_event_without_details_still_passes() {
        // has_event=true with sparse fields is a model judgment call, not a
        // contract violation.
        let output = EventOutput {
            has_event: true,
            event_details: None,
            suggested_reminder: None,
            internal_note: None,
        };
        assert!(output.validate().is_ok());
    }

    #[test]
    fn test_deserializes_with_missing_optionals() {
        let output: EventOutput = serde_json::from_str("{\"has_event\": false}").unwrap();
        assert!(!output.has_event);
        assert!(output.event_details.is_none());
    }
}
