//! Model catalog: chat-capable models visible to a credential, with an explicit fallback policy.
//!
//! [`fetch_chat_models`] reports failures as [`CatalogError`]; [`models_or_fallback`] is the one
//! place that swallows them and substitutes [`FALLBACK_MODELS`].

use crate::llm::{LlmBackend, LlmError, OpenAiClient};

/// Returned whenever the listing call fails.
pub const FALLBACK_MODELS: [&str; 5] = ["gpt-4o", "gpt-4o-mini", "gpt-4-turbo", "gpt-4", "gpt-3.5-turbo"];

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("credential rejected by model listing: {0}")]
    Unauthorized(LlmError),
    #[error("model listing failed: {0}")]
    Upstream(LlmError),
}

impl From<LlmError> for CatalogError {
    fn from(e: LlmError) -> Self {
        if e.is_auth() {
            CatalogError::Unauthorized(e)
        } else {
            CatalogError::Upstream(e)
        }
    }
}

/// Keep ids containing "gpt" or "chat" (case-insensitive), sorted in descending order.
pub fn filter_chat_models<I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut models: Vec<String> = ids
        .into_iter()
        .filter(|id| {
            let lower = id.to_lowercase();
            lower.contains("gpt") || lower.contains("chat")
        })
        .collect();
    models.sort_by(|a, b| b.cmp(a));
    models
}

/// List and filter chat models through `backend`.
pub async fn fetch_chat_models<B: LlmBackend + ?Sized>(backend: &B) -> Result<Vec<String>, CatalogError> {
    let ids = backend.list_models().await?;
    let total = ids.len();
    let models = filter_chat_models(ids);
    log::debug!("model listing: {} of {} model(s) are chat models", models.len(), total);
    Ok(models)
}

/// Fallback policy: fetched models on success, [`FALLBACK_MODELS`] on any failure.
pub fn models_or_fallback(result: Result<Vec<String>, CatalogError>) -> Vec<String> {
    match result {
        Ok(models) => models,
        Err(e) => {
            log::warn!("error fetching models, using fallback list: {}", e);
            fallback_models()
        }
    }
}

pub fn fallback_models() -> Vec<String> {
    FALLBACK_MODELS.iter().map(|m| m.to_string()).collect()
}

/// Best-effort listing through `backend`; never fails.
pub async fn available_models<B: LlmBackend + ?Sized>(backend: &B) -> Vec<String> {
    models_or_fallback(fetch_chat_models(backend).await)
}

/// Best-effort listing for a credential; client construction failures also yield the fallback.
pub async fn available_models_for_key(api_key: &str, base_url: Option<String>) -> Vec<String> {
    match OpenAiClient::new(api_key, base_url) {
        Ok(client) => available_models(&client).await,
        Err(e) => models_or_fallback(Err(CatalogError::from(e))),
    }
}
