use crate::errors::AppError;
use crate::models::analysis::TriageAction;

use super::task::{TaskRunner, TaskSpec};
use super::triage_structured_output::{TriageOutput, get_triage_schema};

pub const TRIAGE_TASK: &str = "triage";

const TRIAGE_SYSTEM: &str = "You triage inbound client messages for a case management team. \
Your only job is to decide the single primary action, with strict priority FLAG > IGNORE > RESPOND.\n\
- FLAG: for URGENT issues — requests for legal or medical advice, acute emotional distress, \
new injuries or incidents, threats to drop the case, or requests to speak to a person.\n\
- IGNORE: ONLY for simple conversation enders with NO new information (e.g. \"ok\", \"thanks\") \
where no reply is needed.\n\
- RESPOND: for any other message needing a reply, including mild frustration or status updates.\n\n\
Return only a JSON object with the structure: {\"primary_action\": \"FLAG|IGNORE|RESPOND\"}";

/// Decides the primary action for the latest client message. Deterministic
/// (temperature 0.0); output constrained to the three-token domain.
#[derive(Clone)]
pub struct TriageAgent {
    runner: TaskRunner,
    spec: TaskSpec,
}

impl TriageAgent {
    pub fn new(runner: TaskRunner) -> Self {
        Self {
            runner,
            spec: TaskSpec::json(TRIAGE_TASK, TRIAGE_SYSTEM, 0.0, get_triage_schema()),
        }
    }

    pub async fn classify(&self, message: &str) -> Result<TriageAction, AppError> {
        let prompt =
            format!("Analyze the following message and determine the primary action: '{message}'");
        let output: TriageOutput = self.runner.complete_json(&self.spec, &prompt).await?;
        output.validate()?;
        output.to_action()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analysis::retry::RetryPolicy;
    use crate::test_helpers::MockAiClient;
    use std::sync::Arc;

    fn agent(mock: &Arc<MockAiClient>) -> TriageAgent {
        TriageAgent::new(TaskRunner::new(
            mock.clone(),
            "mock-model",
            RetryPolicy::new(0, 1.0),
        ))
    }

    #[tokio::test]
    async fn test_classify_parses_action() {
        let mock = Arc::new(MockAiClient::new());
        mock.set_text_response("{\"primary_action\": \"FLAG\"}");

        let action = agent(&mock)
            .classify("I was just in another accident")
            .await
            .expect("classify failed");
        assert_eq!(action, TriageAction::Flag);

        let call = mock.last_call().expect("no call");
        assert!(call.user_content.contains("another accident"));
        assert!(call.system.unwrap_or_default().contains("FLAG > IGNORE > RESPOND"));
    }

    #[tokio::test]
    async fn test_classify_rejects_out_of_domain_token() {
        let mock = Arc::new(MockAiClient::new());
        mock.set_text_response("{\"primary_action\": \"PANIC\"}");

        let result = agent(&mock).classify("hello").await;
        assert!(matches!(result, Err(AppError::AgentOutputInvalid(_))));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_classify_rejects_non_json() {
        let mock = Arc::new(MockAiClient::new());
        mock.set_text_response("FLAG");

        let result = agent(&mock).classify("hello").await;
        assert!(matches!(result, Err(AppError::AgentOutputInvalid(_))));
    }
}
