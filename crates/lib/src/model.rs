//! Model loader: bind a model name to a backend client carrying the credential.

use crate::config::{self, Config};
use crate::llm::{ChatMessage, LlmBackend, LlmError, OpenAiClient};

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
    #[error("model name is empty")]
    EmptyModelName,
    #[error("building llm client: {0}")]
    Client(#[from] LlmError),
}

/// A chat handle bound to one model name and one backend. Each load yields an independent handle.
#[derive(Debug, Clone)]
pub struct LoadedModel<B = OpenAiClient> {
    name: String,
    backend: B,
}

impl<B: LlmBackend> LoadedModel<B> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Send one chat request and return the assistant text verbatim.
    pub async fn invoke(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        let res = self.backend.chat(&self.name, messages).await?;
        Ok(res.content().to_string())
    }
}

/// Read the credential from [`API_KEY_ENV`]. Blank values count as unset.
pub fn resolve_api_key() -> Result<String, LoadError> {
    std::env::var(API_KEY_ENV)
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .ok_or(LoadError::MissingApiKey)
}

/// Load `model_name` against the default (or `OPENAI_BASE_URL`) endpoint.
pub fn load_model(model_name: &str) -> Result<LoadedModel<OpenAiClient>, LoadError> {
    load_model_with_config(model_name, &Config::default())
}

/// Load `model_name` using the endpoint resolved from `config`.
pub fn load_model_with_config(
    model_name: &str,
    config: &Config,
) -> Result<LoadedModel<OpenAiClient>, LoadError> {
    let api_key = resolve_api_key()?;
    let client = OpenAiClient::new(api_key, Some(config::resolve_base_url(config)))?;
    load_model_with(model_name, client)
}

/// Bind `model_name` to an existing backend.
pub fn load_model_with<B: LlmBackend>(model_name: &str, backend: B) -> Result<LoadedModel<B>, LoadError> {
    let name = model_name.trim();
    if name.is_empty() {
        return Err(LoadError::EmptyModelName);
    }
    log::debug!("loaded model {}", name);
    Ok(LoadedModel {
        name: name.to_string(),
        backend,
    })
}
