//! Chat-completion wire format
//!
//! Request and response structures for the OpenAI-compatible completion
//! endpoints exposed by both providers. Message content is either a plain
//! string or an ordered list of typed parts so a single request can mix
//! instruction text with inlined images.

use serde::{Deserialize, Serialize};

/// A single role-tagged message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: MessageContent,
}

impl CompletionMessage {
    /// Plain-text message
    pub fn text(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: MessageContent::Text(content.into()),
        }
    }

    /// Multi-part message (text and image parts)
    pub fn parts(role: &str, parts: Vec<ContentPart>) -> Self {
        Self {
            role: role.to_string(),
            content: MessageContent::Parts(parts),
        }
    }
}

/// Message content: a bare string or a list of typed parts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One part of a multimodal message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Inline a base64-encoded JPEG as a data URL part
    pub fn image_base64(data: &str) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: format!("data:image/jpeg;base64,{}", data),
            },
        }
    }
}

/// Image reference carried inside an image part
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Chat completion request body
///
/// Immutable once built; one per outbound call.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<CompletionMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Chat completion response body
///
/// Only the first choice's message content is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

impl CompletionResponse {
    /// The assistant text of the first choice, if any
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipart_message_serializes_with_typed_parts() {
        let message = CompletionMessage::parts(
            "user",
            vec![
                ContentPart::text("describe this"),
                ContentPart::image_base64("QUJD"),
            ],
        );
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][1]["type"], "image_url");
        assert_eq!(
            value["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,QUJD"
        );
    }

    #[test]
    fn test_plain_text_message_serializes_as_string() {
        let message = CompletionMessage::text("system", "hello");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["content"], "hello");
    }

    #[test]
    fn test_response_content_extraction() {
        let raw = r#"{"choices":[{"message":{"content":"answer"}}]}"#;
        let response: CompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.content(), Some("answer"));

        let empty: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(empty.content(), None);
    }
}
