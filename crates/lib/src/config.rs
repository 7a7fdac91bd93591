//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.prompt-skills/config.json`) and environment.
//! The API credential is never read from the file; see [`crate::model::API_KEY_ENV`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::llm::DEFAULT_BASE_URL;
use crate::templates::TemplateStore;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Upstream API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Model used when the caller does not name one (default gpt-4o-mini).
    pub default_model: Option<String>,

    /// JSON file of templates replacing the bundled set. Relative paths are resolved against the config file's parent.
    pub templates_path: Option<PathBuf>,

    /// Ask for English output by default.
    #[serde(default)]
    pub english_output: bool,
}

/// Upstream endpoint settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// OpenAI-compatible base URL (e.g. "https://api.openai.com/v1"). Overridden by OPENAI_BASE_URL env.
    pub base_url: Option<String>,
}

/// Resolve the API base URL: env OPENAI_BASE_URL overrides config, then the OpenAI default.
pub fn resolve_base_url(config: &Config) -> String {
    std::env::var("OPENAI_BASE_URL")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config
                .api
                .base_url
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

/// Model to use when none is given on the command line.
pub fn resolve_default_model(config: &Config) -> String {
    config
        .default_model
        .as_ref()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("PROMPT_SKILLS_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".prompt-skills").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, or the default path (or PROMPT_SKILLS_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used (for resolving relative paths).
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

/// Resolve `templates_path` against the config file's parent. None when unset or empty.
pub fn resolve_templates_path(config: &Config, config_path: &Path) -> Option<PathBuf> {
    let config_parent = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    match &config.templates_path {
        Some(p) if !p.as_os_str().is_empty() => {
            if p.is_absolute() {
                Some(p.clone())
            } else {
                Some(config_parent.join(p))
            }
        }
        _ => None,
    }
}

/// Build the template store for this config: the configured file when set, otherwise the bundled set.
/// Either way the store is validated before it is returned.
pub fn load_templates(config: &Config, config_path: &Path) -> Result<TemplateStore> {
    let store = match resolve_templates_path(config, config_path) {
        Some(path) => {
            log::info!("using templates from {}", path.display());
            TemplateStore::load(&path)?
        }
        None => TemplateStore::bundled().context("parsing bundled templates")?,
    };
    store.validate().context("validating templates")?;
    Ok(store)
}
