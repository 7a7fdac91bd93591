//! Ordered set of enabled skills for the multi-skill and pipeline paths.

use super::skill::{Skill, UnknownSkill};

/// Enabled skills in the order they were enabled. A skill appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillSelection {
    skills: Vec<Skill>,
}

impl SkillSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (skill, toggled) pairs; only toggled entries are kept, in input order.
    pub fn from_toggles<I>(toggles: I) -> Self
    where
        I: IntoIterator<Item = (Skill, bool)>,
    {
        toggles
            .into_iter()
            .filter(|(_, on)| *on)
            .map(|(skill, _)| skill)
            .collect()
    }

    /// Parse identifiers at the boundary; the first unknown one fails the whole list.
    pub fn parse<I, S>(ids: I) -> Result<Self, UnknownSkill>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter().map(|id| id.as_ref().parse::<Skill>()).collect()
    }

    /// Enable a skill. Returns false if it was already enabled.
    pub fn enable(&mut self, skill: Skill) -> bool {
        if self.skills.contains(&skill) {
            return false;
        }
        self.skills.push(skill);
        true
    }

    pub fn contains(&self, skill: Skill) -> bool {
        self.skills.contains(&skill)
    }

    pub fn iter(&self) -> impl Iterator<Item = Skill> + '_ {
        self.skills.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl FromIterator<Skill> for SkillSelection {
    fn from_iter<T: IntoIterator<Item = Skill>>(iter: T) -> Self {
        let mut selection = SkillSelection::new();
        for skill in iter {
            selection.enable(skill);
        }
        selection
    }
}

impl<'a> IntoIterator for &'a SkillSelection {
    type Item = Skill;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Skill>>;

    fn into_iter(self) -> Self::IntoIter {
        self.skills.iter().copied()
    }
}
