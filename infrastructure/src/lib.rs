//! Infrastructure layer for stagecraft
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod evaluation;
pub mod feedback;
pub mod generation;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileExpansionConfig, FileGeneratorConfig,
    FileInteractionConfig, FileOutputConfig, FileRefinementConfig, FileSceneConfig,
};
pub use evaluation::{HEURISTIC_DIMENSIONS, HeuristicQualityEvaluator};
pub use feedback::{FeedbackFileError, StaticReviewer, load_packages, parse_packages};
pub use generation::{ChatCompletionsGenerator, GeneratorSettings};
