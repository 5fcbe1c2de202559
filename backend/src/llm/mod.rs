use async_trait::async_trait;
use genai::chat::{ChatOptions, ChatRequest, ChatResponse};

use crate::errors::AppError;

pub mod gemini_client;

/// Trait defining the interface for AI client operations.
///
/// Every inference call in the backend goes through this seam, so tests can
/// substitute a scripted client and the rest of the code never names a
/// concrete provider.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Executes a chat request with the AI model.
    ///
    /// # Arguments
    ///
    /// * `model_name` - Which provider model to run the request against.
    /// * `request` - The chat request containing messages and system prompt.
    /// * `config_override` - Optional generation configuration (temperature,
    ///   response format, token limits).
    ///
    /// # Returns
    ///
    /// A `Result` containing the `ChatResponse` on success, or an `AppError`
    /// on failure.
    async fn exec_chat(
        &self,
        model_name: &str,
        request: ChatRequest,
        config_override: Option<ChatOptions>,
    ) -> Result<ChatResponse, AppError>;
}
