use crate::errors::AppError;
use crate::models::analysis::{RiskLevel, TriageAction};
use crate::models::messages::ChatTurn;

use super::task::{TaskRunner, TaskSpec};

pub const RESPONSE_TASK: &str = "response";

const RESPONSE_SYSTEM: &str = "You draft short, human-sounding text messages from a case \
management team to a client, based on an action and the client's last message.\n\n\
**Your top priority is to match the client's tone and sentiment to sound as human as \
possible.** Analyze their message and mirror their style, whether it's formal, casual, \
frustrated, or happy. Your response MUST be appropriate for the urgency and sentiment of \
the client's message.\n\n\
- If the action is \"RESPOND\", write a direct, empathetic response to their message that \
matches their tone.\n\
- If the action is \"FLAG\", you must escalate to a human: first acknowledge the client's \
situation with empathy that matches the seriousness of their message, then explain that you \
are getting a team member to help immediately. If the message is urgent or serious, do NOT \
use casual phrases like \"That's a great question.\"\n\n\
Generate ONLY the response text. Do not include quotes or additional formatting.";

/// Drafts the client-facing reply. Only invoked when the gate in the
/// orchestrator decides a reply is safe to send; creative temperature since
/// the output is free text meant to mirror the client's voice.
#[derive(Clone)]
pub struct ResponseAgent {
    runner: TaskRunner,
    spec: TaskSpec,
}

impl ResponseAgent {
    pub fn new(runner: TaskRunner) -> Self {
        Self {
            runner,
            spec: TaskSpec::text(RESPONSE_TASK, RESPONSE_SYSTEM, 0.7),
        }
    }

    pub async fn draft(
        &self,
        history: &[ChatTurn],
        action: TriageAction,
        risk: RiskLevel,
    ) -> Result<String, AppError> {
        let last_message = history.last().map(|turn| turn.content.as_str()).unwrap_or("");
        let prompt = format!(
            "Action: **{action}**\nRisk level: {risk}\nClient's last message: \"{last_message}\"\n\n\
             Generate a response that matches the client's tone and the action required."
        );
        let text = self.runner.complete_text(&self.spec, &prompt).await?;
        // Models occasionally wrap the reply in quotes despite instructions.
        Ok(text.trim_matches('"').trim_matches('\'').trim().to_string())
    }
}
