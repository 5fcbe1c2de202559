//! Shared mocks and builders for unit and integration tests.
//!
//! The centerpiece is [`MockAiClient`], a scriptable [`AiClient`] that
//! records every call it receives. Task-level tests usually set one blanket
//! response; orchestrator tests script per-task outcomes keyed on a fragment
//! of the system prompt so each pipeline stage can be driven independently.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use genai::adapter::AdapterKind;
use genai::chat::{ChatOptions, ChatRequest, ChatResponse, MessageContent};
use genai::ModelIden;

use crate::config::Config;
use crate::errors::AppError;
use crate::llm::AiClient;
use crate::models::messages::{ChatTurn, ClientInfo};

/// What a scripted call resolves to.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Completion text returned to the caller.
    Text(String),
    /// A retryable `InferenceFailed` with this message.
    TransientError(String),
    /// Never resolves. Pair with a timeout, an abort, or a dropped future.
    Hang,
}

/// One call captured by [`MockAiClient`], in received order.
#[derive(Clone)]
pub struct RecordedCall {
    pub model: String,
    pub system: Option<String>,
    pub user_content: String,
    pub options: Option<ChatOptions>,
}

struct Script {
    pattern: String,
    outcomes: Vec<MockOutcome>,
    cursor: usize,
}

#[derive(Clone)]
pub struct MockAiClient {
    default_outcome: Arc<Mutex<MockOutcome>>,
    scripts: Arc<Mutex<Vec<Script>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockAiClient {
    pub fn new() -> Self {
        Self {
            default_outcome: Arc::new(Mutex::new(MockOutcome::Text(
                "Mock AI response".to_string(),
            ))),
            scripts: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every unscripted call returns this completion text.
    pub fn set_text_response(&self, text: impl Into<String>) {
        *self.default_outcome.lock().unwrap() = MockOutcome::Text(text.into());
    }

    /// Every unscripted call fails with a retryable `InferenceFailed`.
    pub fn set_transient_failure(&self, message: impl Into<String>) {
        *self.default_outcome.lock().unwrap() = MockOutcome::TransientError(message.into());
    }

    /// Every unscripted call parks forever.
    pub fn set_hang(&self) {
        *self.default_outcome.lock().unwrap() = MockOutcome::Hang;
    }

    /// Scripts outcomes for calls whose system prompt contains `pattern`.
    ///
    /// Matching calls consume the outcomes in order; once the script is down
    /// to its last outcome, that outcome repeats. Scripts are checked in the
    /// order they were registered, first match wins.
    pub fn script_for(&self, pattern: impl Into<String>, outcomes: Vec<MockOutcome>) {
        self.scripts.lock().unwrap().push(Script {
            pattern: pattern.into(),
            outcomes,
            cursor: 0,
        });
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().unwrap().last().cloned()
    }

    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls whose system prompt contains `pattern`.
    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| {
                call.system
                    .as_deref()
                    .is_some_and(|system| system.contains(pattern))
            })
            .count()
    }

    fn next_outcome(&self, system: Option<&str>) -> MockOutcome {
        if let Some(system) = system {
            let mut scripts = self.scripts.lock().unwrap();
            if let Some(script) = scripts
                .iter_mut()
                .find(|script| !script.outcomes.is_empty() && system.contains(&script.pattern))
            {
                let outcome = script.outcomes[script.cursor].clone();
                if script.cursor + 1 < script.outcomes.len() {
                    script.cursor += 1;
                }
                return outcome;
            }
        }
        self.default_outcome.lock().unwrap().clone()
    }
}

impl Default for MockAiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiClient for MockAiClient {
    async fn exec_chat(
        &self,
        model_name: &str,
        request: ChatRequest,
        config_override: Option<ChatOptions>,
    ) -> Result<ChatResponse, AppError> {
        let user_content = request
            .messages
            .iter()
            .rev()
            .find_map(|message| match &message.content {
                MessageContent::Text(text) => Some(text.clone()),
                _ => None,
            })
            .unwrap_or_default();
        let system = request.system.clone();

        // Record on entry so failed and hung attempts count too.
        self.calls.lock().unwrap().push(RecordedCall {
            model: model_name.to_string(),
            system: system.clone(),
            user_content,
            options: config_override,
        });

        match self.next_outcome(system.as_deref()) {
            MockOutcome::Text(text) => Ok(text_response(text)),
            MockOutcome::TransientError(message) => Err(AppError::InferenceFailed(message)),
            MockOutcome::Hang => {
                futures::future::pending::<()>().await;
                unreachable!("pending future resolved")
            }
        }
    }
}

fn text_response(text: String) -> ChatResponse {
    ChatResponse {
        model_iden: ModelIden::new(AdapterKind::Gemini, "gemini/mock-model"),
        provider_model_iden: ModelIden::new(AdapterKind::Gemini, "gemini/mock-model"),
        content: Some(MessageContent::Text(text)),
        reasoning_content: None,
        usage: Default::default(),
    }
}

/// Config with test defaults and without reading the environment.
pub fn test_config() -> Config {
    Config::default()
}

pub fn test_client_info(client_id: &str) -> ClientInfo {
    ClientInfo::new(client_id)
}

/// Builds a history from `(sender, content)` pairs, oldest first.
pub fn history(turns: &[(&str, &str)]) -> Vec<ChatTurn> {
    turns
        .iter()
        .map(|(sender, content)| ChatTurn::new(*sender, *content))
        .collect()
}
