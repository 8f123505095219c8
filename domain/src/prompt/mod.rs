//! Prompt domain
//!
//! Templates for the revision and expansion prompts sent to the generator.

mod template;

pub use template::{RefinementPromptTemplate, RevisionPrompt};
