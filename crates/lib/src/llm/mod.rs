//! LLM abstraction and OpenAI-compatible client.
//!
//! [`LlmBackend`] is the seam the appliers and the model catalog talk to; [`OpenAiClient`] is the
//! HTTP implementation (GET /models, POST /chat/completions).

mod openai;

pub use openai::{OpenAiClient, DEFAULT_BASE_URL};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("llm request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("llm api error: {status} {body}")]
    Api { status: u16, body: String },
}

impl LlmError {
    /// True when the upstream rejected the credential (401/403).
    pub fn is_auth(&self) -> bool {
        matches!(self, LlmError::Api { status: 401 | 403, .. })
    }
}

/// Backend able to list models and run a non-streaming chat completion.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Model identifiers visible to the backend's credential, in upstream order.
    async fn list_models(&self) -> Result<Vec<String>, LlmError>;

    /// One chat completion round trip.
    async fn chat(&self, model: &str, messages: Vec<ChatMessage>) -> Result<ChatResponse, LlmError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    pub message: Option<ChatMessage>,
}

impl ChatResponse {
    /// Text content of the assistant message, if any.
    pub fn content(&self) -> &str {
        self.message
            .as_ref()
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors_set_role() {
        assert_eq!(ChatMessage::system("s").role, "system");
        assert_eq!(ChatMessage::user("u").role, "user");
    }

    #[test]
    fn empty_response_has_empty_content() {
        assert_eq!(ChatResponse::default().content(), "");
    }

    #[test]
    fn auth_errors_are_detected_by_status() {
        let e = LlmError::Api {
            status: 401,
            body: "invalid key".to_string(),
        };
        assert!(e.is_auth());
        let e = LlmError::Api {
            status: 500,
            body: String::new(),
        };
        assert!(!e.is_auth());
    }
}
