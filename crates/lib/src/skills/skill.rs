//! The closed set of prompt engineering techniques and their template identifiers.

use std::fmt;
use std::str::FromStr;

/// Suffix marking the condensed variant of a skill template used by the multi-skill path.
pub const SIMPLER_SUFFIX: &str = "_simpler";

/// A named prompt engineering technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Skill {
    /// Give the model an expert persona suited to the task.
    Role,
    /// Ask for reasoning laid out step by step before the answer.
    ChainOfThought,
    /// Add worked input/output examples.
    FewShot,
    /// Replace vague wording with concrete, measurable detail.
    Specificity,
    /// Spell out the exact shape of the expected output.
    OutputFormat,
    /// Fence distinct parts of the prompt with clear delimiters.
    Delimiters,
    /// State limits: length, tone, audience, things to avoid.
    Constraints,
    /// Have the model review and correct its own answer.
    SelfCheck,
}

impl Skill {
    pub const ALL: [Skill; 8] = [
        Skill::Role,
        Skill::ChainOfThought,
        Skill::FewShot,
        Skill::Specificity,
        Skill::OutputFormat,
        Skill::Delimiters,
        Skill::Constraints,
        Skill::SelfCheck,
    ];

    /// Stable identifier; also the template key for the full single-skill template.
    pub fn id(self) -> &'static str {
        match self {
            Skill::Role => "role",
            Skill::ChainOfThought => "chain_of_thought",
            Skill::FewShot => "few_shot",
            Skill::Specificity => "specificity",
            Skill::OutputFormat => "output_format",
            Skill::Delimiters => "delimiters",
            Skill::Constraints => "constraints",
            Skill::SelfCheck => "self_check",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Skill::Role => "Role prompting",
            Skill::ChainOfThought => "Chain of thought",
            Skill::FewShot => "Few-shot examples",
            Skill::Specificity => "Specificity",
            Skill::OutputFormat => "Output format",
            Skill::Delimiters => "Delimiters",
            Skill::Constraints => "Constraints",
            Skill::SelfCheck => "Self-check",
        }
    }

    /// Template key of the condensed variant, e.g. `few_shot_simpler`.
    pub fn simpler_key(self) -> String {
        format!("{}{}", self.id(), SIMPLER_SUFFIX)
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown skill: {0}")]
pub struct UnknownSkill(pub String);

impl FromStr for Skill {
    type Err = UnknownSkill;

    /// Accepts the identifier, case-insensitively, with `-` allowed in place of `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Skill::ALL
            .into_iter()
            .find(|skill| skill.id() == normalized)
            .ok_or_else(|| UnknownSkill(s.to_string()))
    }
}
