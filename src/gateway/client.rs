//! HTTP client for the provider completion endpoints
//!
//! Both providers speak the same OpenAI-compatible chat-completion protocol:
//! POST {base}/chat/completions with bearer auth. One outbound call per
//! gateway operation, fixed timeout, no retries.

use crate::models::completion::{CompletionRequest, CompletionResponse};
use reqwest::Client;
use std::time::Duration;
use tracing::{error, warn};

/// Error types for provider calls
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Provider returned no content")]
    Empty,

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Client for OpenAI-compatible completion endpoints
pub struct CompletionClient {
    client: Client,
}

impl CompletionClient {
    /// Create a client with a fixed request timeout in seconds
    pub fn new(timeout: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Send a completion request and return the first choice's text
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on non-success status, timeout, transport
    /// failure, unparseable body, or a response with no content.
    pub async fn complete(
        &self,
        base_url: &str,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", base_url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                "Provider returned status {}: {}",
                status.as_u16(),
                truncate(&error_text, 200)
            );
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Transport(format!("Failed to parse response: {}", e)))?;

        match completion.content() {
            Some(content) if !content.is_empty() => Ok(content.to_string()),
            _ => {
                warn!("Provider response carried no usable content");
                Err(ProviderError::Empty)
            }
        }
    }
}

/// Truncate a string for log output
fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
