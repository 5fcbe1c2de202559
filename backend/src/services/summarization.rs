use tracing::info;

use crate::errors::AppError;
use crate::models::messages::ChatTurn;
use crate::services::analysis::{TaskRunner, TaskSpec};
use crate::text_processing::format_history;

pub const SUMMARY_TASK: &str = "summarization";

const SUMMARY_SYSTEM: &str = "You are an expert in conversation analysis for a \
case management team. Read a client conversation and produce a concise, \
structured summary a case manager can scan in seconds. Stick exactly to the \
requested structure and add no commentary.";

/// Produces a structured plain-text summary of a conversation.
///
/// Unlike the analysis engine there is no fallback here: a summary either
/// comes back or the error propagates to the caller.
#[derive(Clone)]
pub struct ChatSummarizer {
    runner: TaskRunner,
    spec: TaskSpec,
}

impl ChatSummarizer {
    pub fn new(runner: TaskRunner) -> Self {
        Self {
            runner,
            spec: TaskSpec::text(SUMMARY_TASK, SUMMARY_SYSTEM, 0.0),
        }
    }

    /// # Errors
    ///
    /// `InvalidInput` when `turns` is empty; otherwise whatever the
    /// completion call surfaces after retries.
    pub async fn summarize(&self, turns: &[ChatTurn]) -> Result<String, AppError> {
        if turns.is_empty() {
            return Err(AppError::InvalidInput(
                "conversation to summarize cannot be empty".to_string(),
            ));
        }

        let log = format_history(turns);
        let prompt = format!(
            "Summarize the following conversation:\n\n\
             --- CHAT LOG ---\n{log}\n--- END CHAT LOG ---\n\n\
             Use exactly this structure:\n\
             Topics: [comma-separated list of distinct topics discussed]\n\
             Decisions: [decisions reached, or \"none\"]\n\
             Action items: [outstanding follow-ups, or \"none\"]\n\
             Overall tone: [one of positive, neutral, concerned, with a short reason]"
        );

        let summary = self.runner.complete_text(&self.spec, &prompt).await?;
        info!(
            message_count = turns.len(),
            summary_length = summary.len(),
            "chat summarization completed"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::analysis::RetryPolicy;
    use crate::test_helpers::{history, MockAiClient};

    fn summarizer(mock: &Arc<MockAiClient>) -> ChatSummarizer {
        ChatSummarizer::new(TaskRunner::new(
            mock.clone(),
            "mock-model",
            RetryPolicy::new(3, 1.0),
        ))
    }

    #[tokio::test]
    async fn test_summarize_formats_history_into_prompt() {
        let mock = Arc::new(MockAiClient::new());
        mock.set_text_response("Topics: scheduling\nDecisions: none");

        let turns = history(&[("Dana", "Can we move Tuesday?"), ("Case Manager", "Sure.")]);
        let summary = summarizer(&mock)
            .summarize(&turns)
            .await
            .expect("summarize failed");

        assert!(summary.starts_with("Topics:"));
        let call = mock.last_call().expect("no call");
        assert!(call.user_content.contains("Dana: Can we move Tuesday?"));
        assert!(call.user_content.contains("--- END CHAT LOG ---"));
        assert_eq!(
            call.options.and_then(|o| o.temperature),
            Some(0.0),
            "summaries must be deterministic"
        );
    }

    #[tokio::test]
    async fn test_summarize_rejects_empty_history_without_calling() {
        let mock = Arc::new(MockAiClient::new());
        let result = summarizer(&mock).summarize(&[]).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert_eq!(mock.call_count(), 0);
    }
}
