use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::config::Config;
use crate::errors::AppError;
use crate::llm::AiClient;
use crate::models::analysis::{CompositeAnalysis, RiskLevel, TriageAction};
use crate::models::messages::{ChatTurn, ClientInfo};

use super::event_agent::EventAgent;
use super::response_agent::ResponseAgent;
use super::retry::RetryPolicy;
use super::risk_agent::RiskAgent;
use super::sentiment_agent::SentimentAgent;
use super::task::TaskRunner;
use super::triage_agent::TriageAgent;

/// Drives the analysis task graph over one inbound message:
///
/// ```text
///        +--> triage ----+--> risk --+--> response (gated)
/// input -+--> sentiment -+           |
///        +--> event -----+-----------+--> CompositeAnalysis
/// ```
///
/// The three left-hand tasks run concurrently and are joined; risk consumes
/// the triage outcome; the response draft is gated by
/// `should_generate_response`. Any failure past the input preconditions is
/// absorbed into the conservative fallback result: the caller always gets a
/// composite, never an inference error.
#[derive(Clone)]
pub struct AnalysisOrchestrator {
    triage: TriageAgent,
    risk: RiskAgent,
    sentiment: SentimentAgent,
    event: EventAgent,
    response: ResponseAgent,
}

impl AnalysisOrchestrator {
    pub fn new(client: Arc<dyn AiClient>, config: &Config) -> Self {
        let retry = RetryPolicy::new(config.agent_max_retries, config.agent_backoff_factor);
        let analysis_runner =
            TaskRunner::new(Arc::clone(&client), config.agent_model.clone(), retry);
        let response_runner = TaskRunner::new(client, config.response_model.clone(), retry);

        Self {
            triage: TriageAgent::new(analysis_runner.clone()),
            risk: RiskAgent::new(analysis_runner.clone()),
            sentiment: SentimentAgent::new(analysis_runner.clone()),
            event: EventAgent::new(analysis_runner),
            response: ResponseAgent::new(response_runner),
        }
    }

    /// Analyzes the latest message of `history` for `client_info`.
    ///
    /// # Errors
    ///
    /// Only `InvalidInput` (empty history, or a latest message with no
    /// content) escapes this method, raised before any inference call. Every
    /// pipeline failure becomes a fallback composite instead.
    pub async fn analyze(
        &self,
        client_info: &ClientInfo,
        history: &[ChatTurn],
    ) -> Result<CompositeAnalysis, AppError> {
        let latest = history.last().ok_or_else(|| {
            AppError::InvalidInput("conversation history cannot be empty".to_string())
        })?;
        let message = latest.content.trim();
        if message.is_empty() {
            return Err(AppError::InvalidInput(
                "latest message has no content".to_string(),
            ));
        }

        let analysis = match self.run_pipeline(message, history).await {
            Ok(analysis) => analysis,
            Err(error) => {
                warn!(
                    client_id = %client_info.client_id,
                    %error,
                    "analysis pipeline failed, substituting fallback verdict"
                );
                CompositeAnalysis::fallback(&error)
            }
        };

        report_outcome(client_info, &analysis);
        Ok(analysis)
    }

    async fn run_pipeline(
        &self,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<CompositeAnalysis, AppError> {
        // Fan out the three independent tasks and join on all of them. This
        // is a join, not a race: every branch must resolve before risk runs.
        let (triage, sentiment, event) = tokio::join!(
            self.triage.classify(message),
            self.sentiment.read(message),
            self.event.detect(message),
        );
        let action = triage?;
        let sentiment = sentiment?;
        let event = event?;

        // Risk consumes the triage outcome, so it cannot join the fan-out.
        let risk = self.risk.assess(message, action).await?;

        let response_to_send = if should_generate_response(action, risk.level) {
            Some(self.response.draft(history, action, risk.level).await?)
        } else {
            None
        };

        let full_analysis = json!({
            "primary_action": action,
            "risk_update": risk.level,
            "sentiment": sentiment.label,
            "event_detection": event,
        });

        Ok(CompositeAnalysis {
            action,
            risk_update: risk.level,
            risk_score: risk.score,
            sentiment: sentiment.label,
            sentiment_score: sentiment.score,
            response_to_send,
            event_detection: event,
            full_analysis,
        })
    }
}

/// Decision table for the response gate. The two skip rules guard the
/// highest-risk path: never auto-reply to pure filler, and never auto-reply
/// when an urgent flag coincides with high retention risk.
#[must_use]
pub const fn should_generate_response(action: TriageAction, risk: RiskLevel) -> bool {
    match (action, risk) {
        (TriageAction::Ignore, _) => false,
        (TriageAction::Flag, RiskLevel::High) => false,
        (TriageAction::Flag, RiskLevel::Low | RiskLevel::Medium) => true,
        (TriageAction::Respond, _) => true,
    }
}

/// Fire-and-forget outcome log. Spawned, never awaited; it can neither delay
/// nor fail the response.
fn report_outcome(client_info: &ClientInfo, analysis: &CompositeAnalysis) {
    let client_id = client_info.client_id.clone();
    let action = analysis.action;
    let risk = analysis.risk_update;
    let sentiment = analysis.sentiment;
    let has_event = analysis.event_detection.has_event;
    let degraded = analysis.is_degraded();
    tokio::spawn(async move {
        info!(
            client_id = %client_id,
            action = %action,
            risk = %risk,
            sentiment = %sentiment,
            has_event,
            degraded,
            "message analysis completed"
        );
    });
}
