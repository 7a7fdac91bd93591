//! OpenAI chat completions client (https://api.openai.com/v1 by default).
//!
//! Any server exposing the same /models and /chat/completions shapes works when given its base URL.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ChatMessage, ChatResponse, LlmBackend, LlmError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for an OpenAI-compatible API, authenticated with a bearer token.
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, base_url: Option<String>) -> Result<Self, LlmError> {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let client = reqwest::Client::builder()
            .user_agent(concat!("prompt-skills/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url,
            api_key: api_key.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn check(res: reqwest::Response) -> Result<reqwest::Response, LlmError> {
        if res.status().is_success() {
            return Ok(res);
        }
        let status = res.status().as_u16();
        let body = res.text().await.unwrap_or_default();
        Err(LlmError::Api { status, body })
    }
}

#[async_trait]
impl LlmBackend for OpenAiClient {
    /// GET /models — list model ids visible to the credential.
    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/models", self.base_url);
        let res = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let data: ModelsResponse = Self::check(res).await?.json().await?;
        Ok(data.data.into_iter().map(|m| m.id).collect())
    }

    /// POST /chat/completions — non-streaming chat.
    async fn chat(&self, model: &str, messages: Vec<ChatMessage>) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: model.to_string(),
            messages,
            stream: false,
        };
        log::debug!("chat completion: model={} url={}", model, url);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let data: ChatCompletionResponse = Self::check(res).await?.json().await?;
        Ok(completion_to_chat_response(data))
    }
}

// --- wire types ---

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<ModelObject>,
}

#[derive(Debug, Deserialize)]
struct ModelObject {
    id: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    role: Option<String>,
    content: Option<String>,
}

fn completion_to_chat_response(data: ChatCompletionResponse) -> ChatResponse {
    let message = data
        .choices
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.message)
        .map(|m| ChatMessage {
            role: m.role.unwrap_or_else(|| "assistant".to_string()),
            content: m.content.unwrap_or_default(),
        });
    ChatResponse { message }
}
