//! Progress notification port
//!
//! Defines the interface for reporting progress during refinement and review.

use stagecraft_domain::IterationRecord;

/// Stage of a scene run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Reviewing,
    Evaluating,
    Refining,
    Expanding,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Reviewing => "reviewing",
            Stage::Evaluating => "evaluating",
            Stage::Refining => "refining",
            Stage::Expanding => "expanding",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single progress event
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub stage: Stage,
    /// 1-based step within the stage
    pub current_step: usize,
    pub total_steps: usize,
    pub message: String,
}

impl ProgressUpdate {
    pub fn new(stage: Stage, current_step: usize, total_steps: usize, message: impl Into<String>) -> Self {
        Self {
            stage,
            current_step,
            total_steps,
            message: message.into(),
        }
    }
}

/// Callback for progress updates
///
/// Fire-and-forget: implementations live in the presentation layer and must
/// not fail or block.
pub trait ProgressNotifier: Send + Sync {
    fn on_progress(&self, update: &ProgressUpdate);

    /// Called after each recorded refinement round.
    fn on_iteration_complete(&self, _record: &IterationRecord) {}

    /// Called when a round is abandoned because its response could not be parsed.
    fn on_round_skipped(&self, _attempt: usize) {}

    /// Called after each reviewer has answered.
    fn on_review_complete(&self, _agent: &str, _success: bool) {}

    /// Called when a stage ends.
    fn on_stage_complete(&self, _stage: Stage) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_progress(&self, _update: &ProgressUpdate) {}
}
