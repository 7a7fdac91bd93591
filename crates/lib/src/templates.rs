//! Template store: immutable mapping from role and skill identifiers to prompt fragments.
//!
//! Keys are `system`, `system_multiple`, `lang_eng`, `lang_default`, one key per skill id, and one
//! `<skill>_simpler` key per skill. Single-skill templates carry a `{prompt}` placeholder; the
//! others are used verbatim.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::skills::Skill;

pub const SYSTEM: &str = "system";
pub const SYSTEM_MULTIPLE: &str = "system_multiple";
pub const LANG_ENG: &str = "lang_eng";
pub const LANG_DEFAULT: &str = "lang_default";
pub const PROMPT_PLACEHOLDER: &str = "{prompt}";

static BUNDLED_TEMPLATES: &str = include_str!("../config/templates.json");

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    Missing(String),
    #[error("template {0} has no {{prompt}} placeholder")]
    MissingPlaceholder(String),
    #[error("parsing templates: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("reading templates from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Language the model is told to answer in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    /// Same language as the original prompt.
    #[default]
    Default,
    English,
}

impl Language {
    pub fn from_english_flag(english: bool) -> Self {
        if english {
            Language::English
        } else {
            Language::Default
        }
    }

    /// Template key of this language's directive.
    pub fn directive_key(self) -> &'static str {
        match self {
            Language::Default => LANG_DEFAULT,
            Language::English => LANG_ENG,
        }
    }
}

/// Read-only template mapping, built once and handed to the appliers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateStore {
    templates: HashMap<String, String>,
}

impl TemplateStore {
    pub fn from_map(templates: HashMap<String, String>) -> Self {
        Self { templates }
    }

    /// Templates compiled into the binary.
    pub fn bundled() -> Result<Self, TemplateError> {
        Self::from_json_str(BUNDLED_TEMPLATES)
    }

    /// Parse a flat JSON object of `key: template` pairs.
    pub fn from_json_str(s: &str) -> Result<Self, TemplateError> {
        let templates: HashMap<String, String> = serde_json::from_str(s)?;
        Ok(Self { templates })
    }

    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let s = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json_str(&s)?;
        log::debug!("loaded {} template(s) from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn get(&self, key: &str) -> Result<&str, TemplateError> {
        self.templates
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| TemplateError::Missing(key.to_string()))
    }

    /// Substitute `prompt` into the `{prompt}` placeholder of template `key`.
    pub fn render(&self, key: &str, prompt: &str) -> Result<String, TemplateError> {
        let template = self.get(key)?;
        if !template.contains(PROMPT_PLACEHOLDER) {
            return Err(TemplateError::MissingPlaceholder(key.to_string()));
        }
        Ok(template.replace(PROMPT_PLACEHOLDER, prompt))
    }

    /// Check that every role key and, for each known skill, the full and simpler templates exist.
    pub fn validate(&self) -> Result<(), TemplateError> {
        for key in [SYSTEM, SYSTEM_MULTIPLE, LANG_ENG, LANG_DEFAULT] {
            self.get(key)?;
        }
        for skill in Skill::ALL {
            if !self.get(skill.id())?.contains(PROMPT_PLACEHOLDER) {
                return Err(TemplateError::MissingPlaceholder(skill.id().to_string()));
            }
            self.get(&skill.simpler_key())?;
        }
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
