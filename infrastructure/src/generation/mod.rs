//! Content generators
//!
//! Adapters implementing [`ContentGenerator`](stagecraft_application::ContentGenerator).

mod openai;

pub use openai::{ChatCompletionsGenerator, GeneratorSettings};
