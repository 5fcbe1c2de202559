use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::analysis::Sentiment;
use crate::models::insights::{InsightRequest, MicroInsight, PortfolioReport, PortfolioReportRequest};
use crate::models::messages::ChatTurn;
use crate::services::analysis::{TaskRunner, TaskSpec};

pub const INSIGHT_SENTIMENT_TASK: &str = "insight_sentiment";
pub const INSIGHT_TASK: &str = "micro_insight";
pub const REPORT_TASK: &str = "portfolio_report";

const SENTIMENT_CLASSIFY_SYSTEM: &str = "Classify the client's overall \
sentiment as Positive, Negative, or Neutral. Return exactly one word.";

const INSIGHT_SYSTEM: &str = "You generate micro insights for case managers. \
Generate exactly one sentence that lets a case manager instantly understand \
what is going on with this client right now. Embed the client's current \
sentiment word (Positive, Neutral, or Negative) naturally in the sentence. \
Focus on tone, preferences, and the most relevant actionable cue. Do not \
repeat the previous insight verbatim; refine or extend it when useful.";

const REPORT_SYSTEM: &str = "You are a portfolio analyst for a case \
management organization. From aggregate metrics and per-client summary \
lines, identify the most significant patterns and turn them into actionable \
intelligence for leadership. Interpret the data rather than restating it. \
Respond with JSON only, matching the requested schema.";

const FALLBACK_INSIGHT: &str = "Recent client interaction requires review.";

/// Caps how much history feeds each call; older turns add cost, not signal.
const SENTIMENT_TURN_LIMIT: usize = 500;
const INSIGHT_TURN_LIMIT: usize = 200;

/// Per-client one-sentence insight with a sentiment reading.
///
/// Like the analysis engine, `run` never hard-fails: any unrecovered error
/// collapses to a deterministic fallback insight that keeps the previous
/// sentiment when one was supplied.
#[derive(Clone)]
pub struct MicroInsightEngine {
    runner: TaskRunner,
}

impl MicroInsightEngine {
    pub fn new(runner: TaskRunner) -> Self {
        Self { runner }
    }

    pub async fn run(&self, request: &InsightRequest) -> MicroInsight {
        match self.try_run(request).await {
            Ok(insight) => insight,
            Err(error) => {
                warn!(
                    client_id = %request.client_id,
                    %error,
                    "micro insight failed, substituting fallback"
                );
                fallback_insight(request.previous_sentiment)
            }
        }
    }

    async fn try_run(&self, request: &InsightRequest) -> Result<MicroInsight, AppError> {
        let sentiment = self.read_sentiment(request).await?;
        let insight = self.compose_insight(request, sentiment).await?;
        info!(
            client_id = %request.client_id,
            sentiment = %sentiment,
            previous = ?request.previous_sentiment,
            "micro insight generated"
        );
        Ok(MicroInsight { insight, sentiment })
    }

    /// One single-token call: classify from scratch, or adjust the previous
    /// reading when one was supplied. Without any message text there is
    /// nothing to read, so the previous value (or Neutral) stands.
    async fn read_sentiment(&self, request: &InsightRequest) -> Result<Sentiment, AppError> {
        let turns = recent(&request.messages, SENTIMENT_TURN_LIMIT);
        let text = turns
            .iter()
            .map(|turn| turn.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        if text.trim().is_empty() {
            return Ok(request.previous_sentiment.unwrap_or(Sentiment::Neutral));
        }

        let system = match request.previous_sentiment {
            Some(previous) => format!(
                "The client's sentiment was previously rated {previous}. Decide \
                 from the recent messages whether it should change. If unclear, \
                 keep the previous value. Return exactly one word: Positive, \
                 Neutral, or Negative."
            ),
            None => SENTIMENT_CLASSIFY_SYSTEM.to_string(),
        };
        let spec = TaskSpec::text(INSIGHT_SENTIMENT_TASK, system, 0.0);

        let token = self.runner.complete_text(&spec, &text).await?;
        Sentiment::parse(token.trim()).ok_or_else(|| {
            AppError::AgentOutputInvalid(format!(
                "sentiment task returned '{token}', expected Positive, Neutral, or Negative"
            ))
        })
    }

    async fn compose_insight(
        &self,
        request: &InsightRequest,
        sentiment: Sentiment,
    ) -> Result<String, AppError> {
        let context = json!({
            "client_profile": request.client_profile,
            "previous_insight": request.previous_insight.as_deref().unwrap_or(""),
            "recent_messages": recent(&request.messages, INSIGHT_TURN_LIMIT),
            "current_sentiment": sentiment,
        });
        let prompt = format!(
            "Generate a single-sentence micro insight from this JSON (one \
             sentence only, no labels):\n{context}"
        );

        let spec = TaskSpec::text(INSIGHT_TASK, INSIGHT_SYSTEM, 0.0);
        let mut insight = self.runner.complete_text(&spec, &prompt).await?;
        if insight.is_empty() {
            return Err(AppError::AgentOutputInvalid(
                "insight task returned empty text".to_string(),
            ));
        }
        if !insight.ends_with(['.', '!', '?']) {
            insight.push('.');
        }
        // The sentiment word must be visible to whoever scans the insight.
        if !insight.contains(sentiment.as_str()) {
            insight = format!("Sentiment: {sentiment}. {insight}");
        }
        Ok(insight)
    }
}

fn recent(turns: &[ChatTurn], max: usize) -> &[ChatTurn] {
    &turns[turns.len().saturating_sub(max)..]
}

fn fallback_insight(previous: Option<Sentiment>) -> MicroInsight {
    let sentiment = previous.unwrap_or(Sentiment::Neutral);
    MicroInsight {
        insight: format!("Sentiment: {sentiment}. {FALLBACK_INSIGHT}"),
        sentiment,
    }
}

/// Raw report payload as the model returns it, before validation.
#[derive(Debug, Deserialize)]
struct ReportOutput {
    executive_summary: String,
    key_themes: Vec<String>,
    risk_highlights: Vec<String>,
    recommendations: Vec<String>,
}

impl ReportOutput {
    fn validate(&self) -> Result<(), AppError> {
        if self.executive_summary.trim().is_empty() {
            return Err(AppError::AgentOutputInvalid(
                "portfolio report has an empty executive summary".to_string(),
            ));
        }
        Ok(())
    }

    fn into_report(self) -> PortfolioReport {
        PortfolioReport {
            executive_summary: self.executive_summary,
            key_themes: self.key_themes,
            risk_highlights: self.risk_highlights,
            recommendations: self.recommendations,
        }
    }
}

fn get_report_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "executive_summary": {
                "type": "string",
                "description": "Two to four sentences covering the most important findings"
            },
            "key_themes": {
                "type": "array",
                "items": {"type": "string"}
            },
            "risk_highlights": {
                "type": "array",
                "items": {"type": "string"}
            },
            "recommendations": {
                "type": "array",
                "items": {"type": "string"}
            }
        },
        "required": ["executive_summary", "key_themes", "risk_highlights", "recommendations"]
    })
}

/// Aggregate reporting over a whole client portfolio. Reports are reviewed
/// by staff, not sent to clients, so failures propagate instead of
/// degrading.
#[derive(Clone)]
pub struct PortfolioReportEngine {
    runner: TaskRunner,
    spec: TaskSpec,
}

impl PortfolioReportEngine {
    pub fn new(runner: TaskRunner) -> Self {
        Self {
            runner,
            spec: TaskSpec::json(REPORT_TASK, REPORT_SYSTEM, 0.0, get_report_schema()),
        }
    }

    /// # Errors
    ///
    /// Schema violations surface as `AgentOutputInvalid`; transport failures
    /// as `AgentRetriesExhausted` once the retry budget is spent.
    pub async fn generate(
        &self,
        request: &PortfolioReportRequest,
    ) -> Result<PortfolioReport, AppError> {
        let payload = json!({
            "report_period": request.report_period,
            "analysis_date": request.analysis_date,
            "metrics": request.metrics,
            "client_summaries": request.client_summaries,
        });
        let prompt = format!("Produce the portfolio report for this input:\n{payload}");

        let output: ReportOutput = self.runner.complete_json(&self.spec, &prompt).await?;
        output.validate()?;

        info!(
            report_period = %request.report_period,
            client_count = request.client_summaries.len(),
            "portfolio report generated"
        );
        Ok(output.into_report())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::analysis::RetryPolicy;
    use crate::test_helpers::{history, MockAiClient, MockOutcome};

    fn runner(mock: &Arc<MockAiClient>) -> TaskRunner {
        TaskRunner::new(mock.clone(), "mock-model", RetryPolicy::new(3, 1.0))
    }

    fn insight_request(previous_sentiment: Option<Sentiment>) -> InsightRequest {
        InsightRequest {
            client_id: "client-7".to_string(),
            client_profile: serde_json::Map::new(),
            messages: history(&[("client", "The waiting is stressing me out.")]),
            previous_insight: None,
            previous_sentiment,
        }
    }

    #[tokio::test]
    async fn test_micro_insight_classifies_then_composes() {
        let mock = Arc::new(MockAiClient::new());
        mock.script_for(
            "exactly one word",
            vec![MockOutcome::Text("Negative".to_string())],
        );
        mock.script_for(
            "one sentence",
            vec![MockOutcome::Text(
                "Negative mood this week; the client needs reassurance about timelines"
                    .to_string(),
            )],
        );

        let engine = MicroInsightEngine::new(runner(&mock));
        let result = engine.run(&insight_request(None)).await;

        assert_eq!(result.sentiment, Sentiment::Negative);
        assert!(result.insight.contains("Negative"));
        assert!(result.insight.ends_with('.'), "missing terminal punctuation");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_micro_insight_prefixes_sentiment_when_absent_from_text() {
        let mock = Arc::new(MockAiClient::new());
        mock.script_for(
            "exactly one word",
            vec![MockOutcome::Text("Positive".to_string())],
        );
        mock.script_for(
            "one sentence",
            vec![MockOutcome::Text(
                "Client is upbeat about the new schedule.".to_string(),
            )],
        );

        let engine = MicroInsightEngine::new(runner(&mock));
        let result = engine.run(&insight_request(None)).await;

        assert!(result.insight.starts_with("Sentiment: Positive."));
    }

    #[tokio::test]
    async fn test_micro_insight_adjustment_mentions_previous_reading() {
        let mock = Arc::new(MockAiClient::new());
        mock.script_for(
            "exactly one word",
            vec![MockOutcome::Text("Neutral".to_string())],
        );

        let engine = MicroInsightEngine::new(runner(&mock));
        engine.run(&insight_request(Some(Sentiment::Negative))).await;

        let sentiment_calls: Vec<_> = mock
            .recorded_calls()
            .into_iter()
            .filter(|call| {
                call.system
                    .as_deref()
                    .is_some_and(|s| s.contains("exactly one word"))
            })
            .collect();
        assert_eq!(sentiment_calls.len(), 1);
        assert!(
            sentiment_calls[0]
                .system
                .as_deref()
                .is_some_and(|s| s.contains("previously rated Negative")),
            "adjustment prompt must carry the previous reading"
        );
    }

    #[tokio::test]
    async fn test_micro_insight_falls_back_on_out_of_domain_token() {
        let mock = Arc::new(MockAiClient::new());
        mock.script_for(
            "exactly one word",
            vec![MockOutcome::Text("Ambivalent".to_string())],
        );

        let engine = MicroInsightEngine::new(runner(&mock));
        let result = engine.run(&insight_request(Some(Sentiment::Positive))).await;

        // Fallback keeps the supplied previous sentiment.
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(
            result.insight,
            "Sentiment: Positive. Recent client interaction requires review."
        );
    }

    #[tokio::test]
    async fn test_micro_insight_skips_classification_for_empty_messages() {
        let mock = Arc::new(MockAiClient::new());
        mock.set_text_response("Client is quiet; Neutral until they re-engage.");

        let mut request = insight_request(None);
        request.messages = Vec::new();

        let engine = MicroInsightEngine::new(runner(&mock));
        let result = engine.run(&request).await;

        assert_eq!(result.sentiment, Sentiment::Neutral);
        // Only the insight call went out.
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_portfolio_report_parses_schema_output() {
        let mock = Arc::new(MockAiClient::new());
        mock.set_text_response(
            "{\"executive_summary\": \"Portfolio risk is concentrated in two cases.\", \
              \"key_themes\": [\"communication gaps\"], \
              \"risk_highlights\": [\"client-4 silent for 3 weeks\"], \
              \"recommendations\": [\"schedule check-ins\"]}",
        );

        let engine = PortfolioReportEngine::new(runner(&mock));
        let report = engine
            .generate(&PortfolioReportRequest {
                report_period: "2025-Q1".to_string(),
                analysis_date: "2025-04-01".to_string(),
                metrics: serde_json::Map::new(),
                client_summaries: vec!["client-4: unresponsive".to_string()],
            })
            .await
            .expect("report failed");

        assert_eq!(report.key_themes, vec!["communication gaps"]);
        assert!(report.executive_summary.contains("concentrated"));
    }

    #[tokio::test]
    async fn test_portfolio_report_rejects_empty_summary() {
        let mock = Arc::new(MockAiClient::new());
        mock.set_text_response(
            "{\"executive_summary\": \"  \", \"key_themes\": [], \
              \"risk_highlights\": [], \"recommendations\": []}",
        );

        let engine = PortfolioReportEngine::new(runner(&mock));
        let result = engine
            .generate(&PortfolioReportRequest {
                report_period: "2025-Q1".to_string(),
                analysis_date: "2025-04-01".to_string(),
                metrics: serde_json::Map::new(),
                client_summaries: Vec::new(),
            })
            .await;

        assert!(matches!(result, Err(AppError::AgentOutputInvalid(_))));
    }
}
