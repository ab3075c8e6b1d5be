//! Shared testing utilities: a seeded in-memory survey and a scripted
//! language model.

pub mod fixtures;
pub mod llm;

pub use fixtures::{row, SurveyFixture};
pub use llm::ScriptedBackend;
