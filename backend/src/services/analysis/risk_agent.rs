use crate::errors::AppError;
use crate::models::analysis::TriageAction;

use super::risk_structured_output::{RiskOutput, RiskVerdict, get_risk_schema};
use super::task::{TaskRunner, TaskSpec};

pub const RISK_TASK: &str = "risk";

const RISK_SYSTEM: &str = "You assess client retention risk for a case management team: \
how likely is this client to disengage or leave?\n\
- High: for direct threats to leave, accusations of mishandling, frantic urgency, requests \
for financial help, questions about case value, or any mention of self-harm.\n\
- Medium: for messages expressing frustration, negative sentiment, vague dissatisfaction, \
or any message that was flagged for a non-High risk reason.\n\
- Low: for all other positive or neutral messages.\n\n\
Additionally, provide a risk_score from 0-100:\n\
- For 'High' risk: score between 70-100\n\
- For 'Medium' risk: score between 40-69\n\
- For 'Low' risk: score between 0-39\n\n\
Return only a JSON object with the structure: {\"risk_update\": \"High|Medium|Low\", \"risk_score\": number}";

/// Assesses retention risk for the latest message. Depends on the triage
/// outcome, which is fed into the prompt; this is the one sequential edge
/// in the fan-out graph.
#[derive(Clone)]
pub struct RiskAgent {
    runner: TaskRunner,
    spec: TaskSpec,
}

impl RiskAgent {
    pub fn new(runner: TaskRunner) -> Self {
        Self {
            runner,
            spec: TaskSpec::json(RISK_TASK, RISK_SYSTEM, 0.0, get_risk_schema()),
        }
    }

    pub async fn assess(
        &self,
        message: &str,
        action: TriageAction,
    ) -> Result<RiskVerdict, AppError> {
        let prompt = format!(
            "Given the message '{message}' and that the triage action was '{action}', \
             what is the risk level and score?"
        );
        let output: RiskOutput = self.runner.complete_json(&self.spec, &prompt).await?;
        output.to_verdict()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::RiskLevel;
    use crate::services::analysis::retry::RetryPolicy;
    use crate::test_helpers::MockAiClient;
    use std::sync::Arc;

    fn agent(mock: &Arc<MockAiClient>) -> RiskAgent {
        RiskAgent::new(TaskRunner::new(
            mock.clone(),
            "mock-model",
            RetryPolicy::new(0, 1.0),
        ))
    }

    #[tokio::test]
    async fn test_assess_feeds_triage_action_into_prompt() {
        let mock = Arc::new(MockAiClient::new());
        mock.set_text_response("{\"risk_update\": \"High\", \"risk_score\": 90}");

        let verdict = agent(&mock)
            .assess("I'm done, I want a different firm", TriageAction::Flag)
            .await
            .expect("assess failed");

        assert_eq!(verdict.level, RiskLevel::High);
        assert_eq!(verdict.score, 90);
        let call = mock.last_call().expect("no call");
        assert!(call.user_content.contains("'FLAG'"));
    }

    #[tokio::test]
    async fn test_assess_rejects_band_mismatch() {
        let mock = Arc::new(MockAiClient::new());
        mock.set_text_response("{\"risk_update\": \"High\", \"risk_score\": 10}");

        let result = agent(&mock)
            .assess("all good", TriageAction::Respond)
            .await;
        assert!(matches!(result, Err(AppError::AgentOutputInvalid(_))));
    }

    #[tokio::test]
    async fn test_assess_rejects_out_of_range_score() {
        let mock = Arc::new(MockAiClient::new());
        mock.set_text_response("{\"risk_update\": \"High\", \"risk_score\": 150}");

        let result = agent(&mock).assess("hm", TriageAction::Respond).await;
        assert!(matches!(result, Err(AppError::AgentOutputInvalid(_))));
    }
}
