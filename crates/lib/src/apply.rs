//! Skill appliers: wrap a prompt in skill instructions and send one chat request per application.
//!
//! Every template lookup happens while building the message pair, so a missing template fails the
//! call before anything is sent upstream.

use std::sync::Arc;

use crate::llm::{ChatMessage, LlmBackend, LlmError};
use crate::model::LoadedModel;
use crate::skills::{Skill, SkillSelection};
use crate::templates::{Language, TemplateError, TemplateStore, SYSTEM, SYSTEM_MULTIPLE};

const TECHNIQUES_HEADER: &str = "[Prompt Engineering Techniques to Apply]";
const REFINE_INSTRUCTION: &str = "Based on [Prompt engineering techniques to apply], refine the prompt provided below. Ensure that each technique is fully incorporated to achieve a clear and effective improvement:";

#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Output of one step of [`SkillApplier::apply_in_sequence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub skill: Skill,
    /// 1-based position of the step.
    pub position: usize,
    pub output: String,
}

/// Applies skills using an injected, read-only template store.
#[derive(Debug, Clone)]
pub struct SkillApplier {
    templates: Arc<TemplateStore>,
}

impl SkillApplier {
    pub fn new(templates: Arc<TemplateStore>) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// System instruction for a single skill at `position` (1-based).
    ///
    /// English gets its directive only at position 1; later English steps get none. The default
    /// language directive is added at every position.
    pub fn single_system_instruction(&self, position: usize, language: Language) -> Result<String, TemplateError> {
        let mut system = self.templates.get(SYSTEM)?.to_string();
        let directive = match language {
            Language::English if position == 1 => Some(language.directive_key()),
            Language::English => None,
            Language::Default => Some(language.directive_key()),
        };
        if let Some(key) = directive {
            system.push('\n');
            system.push_str(self.templates.get(key)?);
        }
        Ok(system)
    }

    /// System instruction for the multi-skill path; the directive is always added.
    pub fn multiple_system_instruction(&self, language: Language) -> Result<String, TemplateError> {
        let mut system = self.templates.get(SYSTEM_MULTIPLE)?.to_string();
        system.push('\n');
        system.push_str(self.templates.get(language.directive_key())?);
        Ok(system)
    }

    /// The (system, user) pair sent by [`apply_skill`](Self::apply_skill).
    pub fn single_skill_messages(
        &self,
        skill: Skill,
        prompt: &str,
        position: usize,
        language: Language,
    ) -> Result<Vec<ChatMessage>, TemplateError> {
        let system = self.single_system_instruction(position, language)?;
        let user = self.templates.render(skill.id(), prompt)?;
        Ok(vec![ChatMessage::system(system), ChatMessage::user(user)])
    }

    /// Composite instruction listing each selected skill's simpler template, then the prompt.
    pub fn composite_instruction(&self, selection: &SkillSelection, prompt: &str) -> Result<String, TemplateError> {
        let mut out = String::from(TECHNIQUES_HEADER);
        out.push('\n');
        for (idx, skill) in selection.iter().enumerate() {
            let simpler = self.templates.get(&skill.simpler_key())?;
            out.push_str(&format!("{}. {}: {}\n", idx + 1, skill.id(), simpler));
        }
        out.push_str(REFINE_INSTRUCTION);
        out.push_str("\n\n[original]\n");
        out.push_str(prompt);
        out.push_str("\n[improved]\n");
        Ok(out)
    }

    /// The (system, user) pair sent by [`apply_skills`](Self::apply_skills).
    pub fn multiple_skill_messages(
        &self,
        selection: &SkillSelection,
        prompt: &str,
        language: Language,
    ) -> Result<Vec<ChatMessage>, TemplateError> {
        let system = self.multiple_system_instruction(language)?;
        let user = self.composite_instruction(selection, prompt)?;
        Ok(vec![ChatMessage::system(system), ChatMessage::user(user)])
    }

    /// Apply one skill; returns the model's text verbatim.
    pub async fn apply_skill<B: LlmBackend>(
        &self,
        model: &LoadedModel<B>,
        skill: Skill,
        prompt: &str,
        position: usize,
        language: Language,
    ) -> Result<String, ApplyError> {
        let messages = self.single_skill_messages(skill, prompt, position, language)?;
        log::info!("applying skill {} (step {}) with {}", skill, position, model.name());
        Ok(model.invoke(messages).await?)
    }

    /// Apply all selected skills in one request; returns the model's text verbatim.
    pub async fn apply_skills<B: LlmBackend>(
        &self,
        model: &LoadedModel<B>,
        selection: &SkillSelection,
        prompt: &str,
        language: Language,
    ) -> Result<String, ApplyError> {
        let messages = self.multiple_skill_messages(selection, prompt, language)?;
        log::info!("applying {} skill(s) in one request with {}", selection.len(), model.name());
        Ok(model.invoke(messages).await?)
    }

    /// Apply selected skills one after another, feeding each output into the next step.
    ///
    /// Templates for every step are checked before the first request goes out.
    pub async fn apply_in_sequence<B: LlmBackend>(
        &self,
        model: &LoadedModel<B>,
        selection: &SkillSelection,
        prompt: &str,
        language: Language,
    ) -> Result<Vec<StepResult>, ApplyError> {
        for (idx, skill) in selection.iter().enumerate() {
            self.single_skill_messages(skill, prompt, idx + 1, language)?;
        }
        let mut steps = Vec::with_capacity(selection.len());
        let mut current = prompt.to_string();
        for (idx, skill) in selection.iter().enumerate() {
            let position = idx + 1;
            let output = self
                .apply_skill(model, skill, &current, position, language)
                .await?;
            current = output.clone();
            steps.push(StepResult {
                skill,
                position,
                output,
            });
        }
        Ok(steps)
    }
}
