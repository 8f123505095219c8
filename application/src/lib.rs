//! Application layer for stagecraft
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ExpansionParams, RefinementParams};
pub use ports::{
    content_generator::{ContentGenerator, GenerationError},
    progress::{NoProgress, ProgressNotifier, ProgressUpdate, Stage},
    quality_evaluator::{EvaluationError, QualityEvaluator},
    scene_reviewer::{ReviewError, SceneReviewer},
};
pub use use_cases::interaction_coordinator::{CoordinatorError, InteractionCoordinator};
pub use use_cases::produce_scene::{
    ProduceSceneError, ProduceSceneInput, ProduceSceneUseCase, ProductionResult,
};
pub use use_cases::refinement::{RefineInput, RefinementEngine, RefinementError};
pub use use_cases::review_scene::{
    DialogueDecision, ReviewOutput, ReviewSceneError, ReviewSceneInput, ReviewSceneUseCase,
};
