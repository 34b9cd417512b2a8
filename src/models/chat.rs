//! Chat endpoint data models

use serde::{Deserialize, Serialize};

/// One turn of conversation history as supplied by the frontend
///
/// Lenient on purpose: a turn missing its role or content still parses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub content: String,
    /// Optional image attached to this turn (data URL, http URL or local path)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

fn default_role() -> String {
    "user".to_string()
}

/// Response body for POST /chat
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponseBody {
    pub response: String,
}

/// Request body for POST /chat/save
#[derive(Debug, Clone, Deserialize)]
pub struct SaveChatHistoryRequest {
    pub messages: Vec<ChatTurn>,
}
