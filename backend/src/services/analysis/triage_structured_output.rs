use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::models::analysis::TriageAction;

/// Raw triage verdict as returned by the model, before domain validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageOutput {
    pub primary_action: String,
}

/// JSON schema passed to the provider as the requested response format.
pub fn get_triage_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "primary_action": {
                "type": "string",
                "enum": ["FLAG", "IGNORE", "RESPOND"],
                "description": "The single primary action for this message. Must be one of the exact values listed."
            }
        },
        "required": ["primary_action"]
    })
}

impl TriageOutput {
    /// Domain membership check. The schema already constrains the provider,
    /// but the contract does not trust the wire; anything outside the
    /// three-value domain is rejected here.
    pub fn validate(&self) -> Result<(), AppError> {
        if TriageAction::parse(&self.primary_action).is_none() {
            return Err(AppError::AgentOutputInvalid(format!(
                "invalid triage action: {:?}",
                self.primary_action
            )));
        }
        Ok(())
    }

    pub fn to_action(&self) -> Result<TriageAction, AppError> {
        TriageAction::parse(&self.primary_action).ok_or_else(|| {
            AppError::AgentOutputInvalid(format!(
                "invalid triage action: {:?}",
                self.primary_action
            ))
        })
    }
}
