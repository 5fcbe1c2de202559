use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One turn of a client/case-manager conversation.
///
/// Timestamps are carried as opaque strings: they are only ever echoed back
/// into prompt context, never parsed or compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub sender: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ChatTurn {
    pub fn new(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
            timestamp: None,
        }
    }
}

/// Client metadata attached to an analysis request. The profile mapping is
/// opaque to the engine; it is surfaced to prompts as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub profile: Map<String, Value>,
}

impl ClientInfo {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            name: None,
            profile: Map::new(),
        }
    }
}

/// Request body for message analysis: an ordered transcript plus the client
/// it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationPayload {
    pub messages: Vec<ChatTurn>,
    pub client_info: ClientInfo,
}
