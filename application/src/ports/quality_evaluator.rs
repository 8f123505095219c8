//! Quality evaluator port

use async_trait::async_trait;
use stagecraft_domain::{QualityVector, SceneRequirements};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("Evaluation failed: {0}")]
    Failed(String),

    #[error("Evaluator returned malformed scores: {0}")]
    MalformedScores(String),
}

/// Scores a scene on named dimensions in `[0, 1]`
///
/// Implementations must report the same dimension set for every call so
/// that round-to-round deltas are meaningful.
#[async_trait]
pub trait QualityEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        content: &str,
        requirements: &SceneRequirements,
    ) -> Result<QualityVector, EvaluationError>;
}
