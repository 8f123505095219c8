//! Review Scene use case
//!
//! Collects feedback packages from every reviewer, posts them into a review
//! thread and optionally settles dialogue rewrites the reviewers disagree on.

use super::interaction_coordinator::{CoordinatorError, InteractionCoordinator};
use crate::ports::progress::{NoProgress, ProgressNotifier, ProgressUpdate, Stage};
use crate::ports::scene_reviewer::SceneReviewer;
use serde::Serialize;
use serde_json::Value;
use stagecraft_domain::{
    AgentMessage, ComprehensiveFeedback, ConflictResolution, DialogueConflict, FeedbackAggregate,
    MessageKind, MessagePayload, Priority, Severity, ThreadId,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur during a review round
#[derive(Error, Debug)]
pub enum ReviewSceneError {
    #[error("No reviewers configured")]
    NoReviewers,

    #[error("All reviewers failed to respond")]
    AllReviewersFailed,

    #[error("Review cancelled")]
    Cancelled,

    #[error("Coordination failed: {0}")]
    Coordinator(#[from] CoordinatorError),
}

/// Input for the ReviewScene use case
#[derive(Debug, Clone)]
pub struct ReviewSceneInput {
    pub scene_id: String,
    pub content: String,
    /// Whether conflicting dialogue rewrites are put to a vote
    pub resolve_conflicts: bool,
}

impl ReviewSceneInput {
    pub fn new(scene_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            scene_id: scene_id.into(),
            content: content.into(),
            resolve_conflicts: true,
        }
    }

    pub fn without_resolution(mut self) -> Self {
        self.resolve_conflicts = false;
        self
    }
}

/// How one dialogue conflict was settled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogueDecision {
    pub conflict: DialogueConflict,
    pub thread_id: ThreadId,
    pub resolution: ConflictResolution,
}

impl DialogueDecision {
    /// The agreed rewrite, when the conflict was resolved to one.
    pub fn agreed_line(&self) -> Option<&str> {
        match &self.resolution {
            ConflictResolution::Resolved {
                resolution: Value::String(line),
                ..
            } => Some(line.as_str()),
            _ => None,
        }
    }
}

/// Result of a review round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewOutput {
    /// Thread holding every FEEDBACK message of the round
    pub thread_id: ThreadId,
    pub aggregate: FeedbackAggregate,
    pub decisions: Vec<DialogueDecision>,
    /// Reviewers that failed and were left out of the aggregate
    pub failed_reviewers: Vec<String>,
}

impl ReviewOutput {
    /// Revision plan followed by the dialogue decisions reached by vote.
    pub fn revision_context(&self) -> String {
        let mut context = self.aggregate.revision_plan();
        let settled: Vec<_> = self
            .decisions
            .iter()
            .filter_map(|d| d.agreed_line().map(|line| (d, line)))
            .collect();
        if !settled.is_empty() {
            context.push_str("\nAGREED DIALOGUE REVISIONS:\n");
            for (decision, line) in settled {
                let method = decision
                    .resolution
                    .method()
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                context.push_str(&format!(
                    "- {} -> \"{}\" ({})\n",
                    decision.conflict.location(),
                    line,
                    method
                ));
            }
        }
        context
    }
}

/// Message priority for a feedback package.
fn package_priority(package: &ComprehensiveFeedback) -> Priority {
    if package.blockers().next().is_some() {
        Priority::Critical
    } else if package
        .priority_items
        .iter()
        .any(|i| i.severity == Severity::Critical)
    {
        Priority::High
    } else {
        Priority::Medium
    }
}

/// Use case for running one review round over a scene
pub struct ReviewSceneUseCase {
    reviewers: Vec<Arc<dyn SceneReviewer>>,
    cancellation_token: Option<CancellationToken>,
}

impl ReviewSceneUseCase {
    pub fn new(reviewers: Vec<Arc<dyn SceneReviewer>>) -> Self {
        Self {
            reviewers,
            cancellation_token: None,
        }
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn reviewer_count(&self) -> usize {
        self.reviewers.len()
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation_token
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: ReviewSceneInput,
        coordinator: &mut InteractionCoordinator,
    ) -> Result<ReviewOutput, ReviewSceneError> {
        self.execute_with_progress(input, coordinator, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    ///
    /// Reviewers are asked one after another in configured order. A failing
    /// reviewer is logged and left out; the round fails only when nobody
    /// answered.
    pub async fn execute_with_progress(
        &self,
        input: ReviewSceneInput,
        coordinator: &mut InteractionCoordinator,
        progress: &dyn ProgressNotifier,
    ) -> Result<ReviewOutput, ReviewSceneError> {
        if self.reviewers.is_empty() {
            return Err(ReviewSceneError::NoReviewers);
        }

        let total = self.reviewers.len();
        info!("Reviewing scene '{}' with {} reviewers", input.scene_id, total);

        let thread_id = coordinator.create_thread(
            format!("Review of {}", input.scene_id),
            self.reviewers.iter().map(|r| r.name().to_string()),
        );
        let mut aggregate = FeedbackAggregate::new(input.scene_id.clone());
        let mut failed_reviewers = Vec::new();

        for (index, reviewer) in self.reviewers.iter().enumerate() {
            if self.is_cancelled() {
                return Err(ReviewSceneError::Cancelled);
            }
            progress.on_progress(&ProgressUpdate::new(
                Stage::Reviewing,
                index + 1,
                total,
                format!("Waiting for {}", reviewer.name()),
            ));

            match reviewer.review(&input.scene_id, &input.content).await {
                Ok(package) => {
                    debug!(
                        "{} scored the scene {:.2} with {} priority item(s)",
                        reviewer.name(),
                        package.score(),
                        package.priority_items.len()
                    );
                    let message = AgentMessage::builder(reviewer.name(), MessageKind::Feedback)
                        .broadcast()
                        .in_thread(thread_id)
                        .priority(package_priority(&package))
                        .payload(MessagePayload::Review(Box::new(package.clone())))
                        .build();
                    let responses = coordinator.route(message);
                    if !responses.is_empty() {
                        debug!("{} response(s) to {}'s feedback", responses.len(), reviewer.name());
                    }
                    aggregate.add(package);
                    progress.on_review_complete(reviewer.name(), true);
                }
                Err(e) => {
                    warn!("Reviewer {} failed: {}", reviewer.name(), e);
                    failed_reviewers.push(reviewer.name().to_string());
                    progress.on_review_complete(reviewer.name(), false);
                }
            }
        }

        if aggregate.is_empty() {
            return Err(ReviewSceneError::AllReviewersFailed);
        }

        let decisions = if input.resolve_conflicts {
            Self::settle_conflicts(&aggregate, coordinator)?
        } else {
            Vec::new()
        };

        progress.on_stage_complete(Stage::Reviewing);
        info!(
            "Review complete: consensus score {:.2}, {} blocker(s), {} dialogue conflict(s)",
            aggregate.consensus_score(),
            aggregate.blockers().len(),
            decisions.len()
        );

        Ok(ReviewOutput {
            thread_id,
            aggregate,
            decisions,
            failed_reviewers,
        })
    }

    /// Open one thread per conflicting dialogue line and resolve it.
    fn settle_conflicts(
        aggregate: &FeedbackAggregate,
        coordinator: &mut InteractionCoordinator,
    ) -> Result<Vec<DialogueDecision>, ReviewSceneError> {
        let mut decisions = Vec::new();
        for conflict in aggregate.conflicts() {
            let thread_id = coordinator.create_thread(
                format!("Dialogue: {}", conflict.location()),
                conflict.proposals.iter().map(|p| p.agent.clone()),
            );
            for proposal in &conflict.proposals {
                let position = proposal
                    .suggestion
                    .clone()
                    .map(Value::String)
                    .unwrap_or(Value::Null);
                coordinator.route(
                    AgentMessage::builder(proposal.agent.clone(), MessageKind::Conflict)
                        .broadcast()
                        .in_thread(thread_id)
                        .payload(MessagePayload::position(position, proposal.reasoning.clone()))
                        .build(),
                );
            }

            let resolution = coordinator.resolve(thread_id)?;
            if !resolution.is_resolved() {
                info!("No agreement on {}", conflict.location());
            }
            decisions.push(DialogueDecision {
                conflict,
                thread_id,
                resolution,
            });
        }
        Ok(decisions)
    }
}
