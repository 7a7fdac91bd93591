//! Skills: the known prompt engineering techniques and typed selections of them.

mod selection;
mod skill;

pub use selection::SkillSelection;
pub use skill::{Skill, UnknownSkill, SIMPLER_SUFFIX};
