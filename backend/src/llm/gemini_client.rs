use async_trait::async_trait;
use genai::{
    Client, ClientBuilder,
    chat::{ChatOptions, ChatRequest, ChatResponse},
};
use std::sync::Arc;

use super::AiClient;
use crate::errors::AppError;

/// Wrapper around the genai::Client so the rest of the backend depends on
/// the `AiClient` trait rather than the SDK type. The underlying client is
/// connection-pooled and safe to share across concurrent in-flight calls.
pub struct CaselineGeminiClient {
    inner: Client,
}

#[async_trait]
impl AiClient for CaselineGeminiClient {
    async fn exec_chat(
        &self,
        model_name: &str,
        request: ChatRequest,
        config_override: Option<ChatOptions>,
    ) -> Result<ChatResponse, AppError> {
        self.inner
            .exec_chat(model_name, request, config_override.as_ref())
            .await
            .map_err(AppError::from)
    }
}

#[async_trait]
impl AiClient for Arc<CaselineGeminiClient> {
    async fn exec_chat(
        &self,
        model_name: &str,
        request: ChatRequest,
        config_override: Option<ChatOptions>,
    ) -> Result<ChatResponse, AppError> {
        (**self).exec_chat(model_name, request, config_override).await
    }
}

/// Builds the Gemini client wrapper. The genai SDK resolves the API key from
/// the environment (`GEMINI_API_KEY`); startup validates presence separately
/// so a missing key fails loudly instead of on the first request.
pub fn build_gemini_client() -> Result<Arc<CaselineGeminiClient>, AppError> {
    let client = ClientBuilder::default().build();
    Ok(Arc::new(CaselineGeminiClient { inner: client }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockAiClient;
    use genai::chat::ChatMessage;

    #[test]
    fn test_build_gemini_client_wrapper_ok() {
        let result = build_gemini_client();
        assert!(
            result.is_ok(),
            "Failed to build Gemini client wrapper: {:?}",
            result.err()
        );
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        let mock = Arc::new(MockAiClient::new());
        mock.set_text_response("Delegated response");

        let client: Arc<dyn AiClient> = mock.clone();
        let request = ChatRequest::default().append_message(ChatMessage::user("hello"));
        let response = client
            .exec_chat("test-model", request, None)
            .await
            .expect("mock call failed");

        assert_eq!(
            response.first_content_text_as_str(),
            Some("Delegated response")
        );
        assert_eq!(mock.call_count(), 1);
    }
}
