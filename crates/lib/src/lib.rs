//! prompt-skills core library: templates, skills, model catalog, and skill appliers
//! over an OpenAI-compatible chat API.

pub mod apply;
pub mod catalog;
pub mod config;
pub mod llm;
pub mod model;
pub mod skills;
pub mod templates;
pub mod text;
