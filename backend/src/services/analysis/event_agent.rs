use crate::errors::AppError;
use crate::models::analysis::EventDetection;

use super::event_structured_output::{EventOutput, get_event_schema};
use super::task::{TaskRunner, TaskSpec};

pub const EVENT_TASK: &str = "event_detection";

const EVENT_SYSTEM: &str = "You identify mentions of future events or appointments in client \
messages. Detect whether the message contains a future event, extract its details, and suggest \
a reminder.\n\n\
When an event is detected:\n\
1. Extract details like date, time, event type, location\n\
2. Craft a short, helpful reminder message to send to the client before the event\n\
3. Write an internal note with context about the event\n\n\
Return a JSON object with this structure:\n\
{\n\
  \"has_event\": boolean,\n\
  \"event_details\": {\n\
    \"date\": \"string or null\",\n\
    \"time\": \"string or null\",\n\
    \"location\": \"string or null\",\n\
    \"event_type\": \"string or null\",\n\
    \"additional_info\": \"string or null\"\n\
  } or null,\n\
  \"suggested_reminder\": \"string or null\",\n\
  \"internal_note\": \"string or null\"\n\
}\n\n\
If no event is mentioned, return has_event as false and every other field as null.";

/// Detects future events (appointments, hearings, deadlines) in the latest
/// message and drafts the associated reminder text.
#[derive(Clone)]
pub struct EventAgent {
    runner: TaskRunner,
    spec: TaskSpec,
}

impl EventAgent {
    pub fn new(runner: TaskRunner) -> Self {
        Self {
            runner,
            spec: TaskSpec::json(EVENT_TASK, EVENT_SYSTEM, 0.0, get_event_schema()),
        }
    }

    pub async fn detect(&self, message: &str) -> Result<EventDetection, AppError> {
        let prompt = format!(
            "Analyze the following message for any mentions of future events or appointments: '{message}'"
        );
        let output: EventOutput = self.runner.complete_json(&self.spec, &prompt).await?;
        output.validate()?;
        Ok(output.into_detection())
    }
}
