use std::sync::Arc;

use genai::chat::{
    ChatMessage, ChatOptions, ChatRequest, ChatResponseFormat, JsonSchemaSpec,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::retry::RetryPolicy;
use crate::errors::AppError;
use crate::llm::AiClient;

/// What one inference task fixes up front: a label for logs and errors, a
/// system instruction, a sampling temperature, and (for structured tasks)
/// the JSON schema requested from the provider.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub label: &'static str,
    pub system: String,
    pub temperature: f64,
    pub schema: Option<Value>,
}

impl TaskSpec {
    pub fn text(label: &'static str, system: impl Into<String>, temperature: f64) -> Self {
        Self {
            label,
            system: system.into(),
            temperature,
            schema: None,
        }
    }

    pub fn json(
        label: &'static str,
        system: impl Into<String>,
        temperature: f64,
        schema: Value,
    ) -> Self {
        Self {
            label,
            system: system.into(),
            temperature,
            schema: Some(schema),
        }
    }

    fn chat_options(&self) -> ChatOptions {
        let mut options = ChatOptions::default().with_temperature(self.temperature);
        if let Some(schema) = &self.schema {
            options = options.with_response_format(ChatResponseFormat::JsonSchemaSpec(
                JsonSchemaSpec::new(schema.clone()),
            ));
        }
        options
    }
}

/// Shared execution skeleton for every inference task: build the request,
/// call the client under the retry policy, extract the completion text, and
/// (for JSON tasks) strip code fences and parse. Domain validation stays with
/// the caller; the runner only guarantees well-formed text or JSON.
///
/// Cloning is cheap (an `Arc`, a model name, and a `Copy` policy), so every
/// agent holds its own runner.
#[derive(Clone)]
pub struct TaskRunner {
    client: Arc<dyn AiClient>,
    model: String,
    retry: RetryPolicy,
}

impl TaskRunner {
    pub fn new(client: Arc<dyn AiClient>, model: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            client,
            model: model.into(),
            retry,
        }
    }

    /// One completion returning plain text, fence-stripped and trimmed.
    pub async fn complete_text(
        &self,
        spec: &TaskSpec,
        user_content: &str,
    ) -> Result<String, AppError> {
        let raw = self.dispatch(spec, user_content).await?;
        Ok(strip_code_fences(&raw).to_string())
    }

    /// One completion parsed as JSON into `T`. Parse failures surface as
    /// `AgentOutputInvalid` and are never retried.
    pub async fn complete_json<T: DeserializeOwned>(
        &self,
        spec: &TaskSpec,
        user_content: &str,
    ) -> Result<T, AppError> {
        let raw = self.dispatch(spec, user_content).await?;
        let cleaned = strip_code_fences(&raw);
        serde_json::from_str(cleaned).map_err(|e| {
            AppError::AgentOutputInvalid(format!(
                "task '{}' returned unparseable JSON: {e}; raw: {raw}",
                spec.label
            ))
        })
    }

    /// The retried client call. Only this network step sits inside the retry
    /// policy; parsing and validation happen after it resolves.
    async fn dispatch(&self, spec: &TaskSpec, user_content: &str) -> Result<String, AppError> {
        debug!(task = spec.label, model = %self.model, "dispatching inference task");
        self.retry
            .run(spec.label, || {
                let client = Arc::clone(&self.client);
                let model = self.model.clone();
                let request = ChatRequest::new(vec![ChatMessage::user(user_content)])
                    .with_system(spec.system.as_str());
                let options = spec.chat_options();
                async move {
                    let response = client.exec_chat(&model, request, Some(options)).await?;
                    response
                        .first_content_text_as_str()
                        .map(str::to_string)
                        .ok_or_else(|| {
                            AppError::InferenceFailed(
                                "model returned an empty completion".to_string(),
                            )
                        })
                }
            })
            .await
    }
}

/// Strips a surrounding markdown code fence (```json ... ``` or ``` ... ```)
/// if present, then trims. Providers sometimes wrap JSON this way even when
/// a schema response format was requested.
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.starts_with("```json") {
        trimmed
            .strip_prefix("```json")
            .and_then(|s| s.strip_suffix("```"))
            .unwrap_or(trimmed)
            .trim()
    } else if trimmed.starts_with("```") {
        trimmed
            .strip_prefix("```")
            .and_then(|s| s.strip_suffix("```"))
            .unwrap_or(trimmed)
            .trim()
    } else {
        trimmed
    }
}
