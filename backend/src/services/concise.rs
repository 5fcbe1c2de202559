use tracing::info;

use crate::errors::AppError;
use crate::services::analysis::{TaskRunner, TaskSpec};
use crate::text_processing::strip_quotes;

pub const CONCISE_TASK: &str = "concise";

const CONCISE_SYSTEM: &str = "You are a helpful assistant skilled at making \
text more concise and clear while retaining the original meaning within 3-4 \
words, never more than 4 words.";

/// Rewrites arbitrary text into a 3-4 word gist for list views and
/// notification previews.
#[derive(Clone)]
pub struct ConciseRewriter {
    runner: TaskRunner,
    spec: TaskSpec,
}

impl ConciseRewriter {
    pub fn new(runner: TaskRunner) -> Self {
        Self {
            runner,
            spec: TaskSpec::text(CONCISE_TASK, CONCISE_SYSTEM, 0.0),
        }
    }

    /// # Errors
    ///
    /// `InvalidInput` for blank input; completion errors propagate.
    pub async fn make_concise(&self, text: &str) -> Result<String, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::InvalidInput(
                "text to condense cannot be empty".to_string(),
            ));
        }

        let prompt = format!("Make the following text more concise:\n\n---\n\n{text}");
        let raw = self.runner.complete_text(&self.spec, &prompt).await?;
        let concise = strip_quotes(&raw).to_string();

        info!(
            original_length = text.len(),
            concise_length = concise.len(),
            "text condensed"
        );
        Ok(concise)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::analysis::RetryPolicy;
    use crate::test_helpers::MockAiClient;

    fn rewriter(mock: &Arc<MockAiClient>) -> ConciseRewriter {
        ConciseRewriter::new(TaskRunner::new(
            mock.clone(),
            "mock-model",
            RetryPolicy::new(3, 1.0),
        ))
    }

    #[tokio::test]
    async fn test_make_concise_strips_wrapping_quotes() {
        let mock = Arc::new(MockAiClient::new());
        mock.set_text_response("\"Hearing moved Friday\"");

        let gist = rewriter(&mock)
            .make_concise("The court hearing originally set for Monday has been moved to Friday.")
            .await
            .expect("rewrite failed");
        assert_eq!(gist, "Hearing moved Friday");
    }

    #[tokio::test]
    async fn test_make_concise_rejects_blank_input() {
        let mock = Arc::new(MockAiClient::new());
        let result = rewriter(&mock).make_concise("   \n\t ").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert_eq!(mock.call_count(), 0);
    }
}
