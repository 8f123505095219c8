//! Produce Scene use case
//!
//! The full pipeline for one scene: review, plan, refine with the plan as
//! guidance, then expand to the target length.

use super::interaction_coordinator::InteractionCoordinator;
use super::refinement::{RefineInput, RefinementEngine, RefinementError};
use super::review_scene::{ReviewOutput, ReviewSceneError, ReviewSceneInput, ReviewSceneUseCase};
use crate::ports::content_generator::ContentGenerator;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::quality_evaluator::QualityEvaluator;
use serde::Serialize;
use stagecraft_domain::{ExpansionResult, RefinementResult, SceneRequirements};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ProduceSceneError {
    #[error("Review failed: {0}")]
    Review(#[from] ReviewSceneError),

    #[error("Refinement failed: {0}")]
    Refinement(#[from] RefinementError),
}

/// Input for the ProduceScene use case
#[derive(Debug, Clone)]
pub struct ProduceSceneInput {
    pub content: String,
    pub requirements: SceneRequirements,
    /// Length to expand to after refinement
    pub expand_to: Option<usize>,
    /// Settle dialogue conflicts by vote during review
    pub resolve_conflicts: bool,
}

impl ProduceSceneInput {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            requirements: SceneRequirements::default(),
            expand_to: None,
            resolve_conflicts: true,
        }
    }

    pub fn with_requirements(mut self, requirements: SceneRequirements) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn with_expansion(mut self, target_length: usize) -> Self {
        self.expand_to = Some(target_length);
        self
    }

    pub fn without_conflict_resolution(mut self) -> Self {
        self.resolve_conflicts = false;
        self
    }
}

/// Everything the pipeline produced for one scene
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewOutput>,
    pub refinement: RefinementResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expansion: Option<ExpansionResult>,
}

impl ProductionResult {
    /// The scene text after the last stage that ran.
    pub fn final_content(&self) -> &str {
        self.expansion
            .as_ref()
            .map(|e| e.content.as_str())
            .unwrap_or(self.refinement.content.as_str())
    }
}

/// Use case chaining review, refinement and expansion
pub struct ProduceSceneUseCase<G: ContentGenerator + 'static, E: QualityEvaluator + 'static> {
    engine: RefinementEngine<G, E>,
    review: Option<ReviewSceneUseCase>,
}

impl<G: ContentGenerator + 'static, E: QualityEvaluator + 'static> ProduceSceneUseCase<G, E> {
    pub fn new(engine: RefinementEngine<G, E>) -> Self {
        Self {
            engine,
            review: None,
        }
    }

    /// Run a review round first and feed its plan into refinement.
    pub fn with_review(mut self, review: ReviewSceneUseCase) -> Self {
        self.review = Some(review);
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: ProduceSceneInput,
        coordinator: &mut InteractionCoordinator,
    ) -> Result<ProductionResult, ProduceSceneError> {
        self.execute_with_progress(input, coordinator, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: ProduceSceneInput,
        coordinator: &mut InteractionCoordinator,
        progress: &dyn ProgressNotifier,
    ) -> Result<ProductionResult, ProduceSceneError> {
        let ProduceSceneInput {
            content,
            requirements,
            expand_to,
            resolve_conflicts,
        } = input;

        let review = match &self.review {
            Some(review) if review.reviewer_count() > 0 => {
                let scene_id = requirements.scene_label().to_string();
                let mut review_input = ReviewSceneInput::new(scene_id, content.clone());
                if !resolve_conflicts {
                    review_input = review_input.without_resolution();
                }
                Some(
                    review
                        .execute_with_progress(review_input, coordinator, progress)
                        .await?,
                )
            }
            _ => {
                debug!("No reviewers configured, refining without a revision plan");
                None
            }
        };

        let mut refine_input = RefineInput::new(content).with_requirements(requirements);
        if let Some(review) = &review {
            refine_input = refine_input.with_revision_context(review.revision_context());
        }
        let refinement = self.engine.refine(refine_input, progress).await?;

        let expansion = match expand_to {
            Some(target) if !refinement.was_cancelled() => Some(
                self.engine
                    .expand(refinement.content.clone(), target, progress)
                    .await?,
            ),
            Some(_) => {
                info!("Refinement was cancelled, skipping expansion");
                None
            }
            None => None,
        };

        Ok(ProductionResult {
            review,
            refinement,
            expansion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::refinement::test_support::*;
    use super::*;
    use crate::ports::scene_reviewer::{ReviewError, SceneReviewer};
    use async_trait::async_trait;
    use stagecraft_domain::{
        ComprehensiveFeedback, DialogueFeedback, ExpansionOutcome, FeedbackItem, FeedbackType, Severity, StopReason,
    };
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    struct BlockingDesigner;

    #[async_trait]
    impl SceneReviewer for BlockingDesigner {
        fn name(&self) -> &str {
            "Designer"
        }

        async fn review(
            &self,
            scene_id: &str,
            _content: &str,
        ) -> Result<ComprehensiveFeedback, ReviewError> {
            Ok(ComprehensiveFeedback::try_new("Designer", "designer", scene_id, 0.4)
                .unwrap()
                .with_item(FeedbackItem::new(
                    FeedbackType::Technical,
                    Severity::Blocker,
                    "The trapdoor cue is impossible",
                )))
        }
    }

    struct LineReviewer(&'static str, &'static str);

    #[async_trait]
    impl SceneReviewer for LineReviewer {
        fn name(&self) -> &str {
            self.0
        }

        async fn review(
            &self,
            scene_id: &str,
            _content: &str,
        ) -> Result<ComprehensiveFeedback, ReviewError> {
            Ok(ComprehensiveFeedback::try_new(self.0, "actor", scene_id, 0.6)
                .unwrap()
                .with_dialogue(
                    DialogueFeedback::new("HAMLET", "line 1", "stiff").with_improved_version(self.1),
                ))
        }
    }

    const SEED: &str = "HAMLET: Look, my lord, it comes upon the battlements again tonight.";

    fn long_version() -> String {
        format!("{SEED} HAMLET: Angels and ministers of grace defend us from whatever walks here.")
    }

    #[tokio::test]
    async fn test_review_plan_reaches_refinement() {
        let generator = Arc::new(ScriptedGenerator::new(vec![refined("v1")]));
        let evaluator = Arc::new(MirrorEvaluator::new(vec![
            (SEED, scores(0.5, 0.5, 0.5)),
            ("v1", scores(0.9, 0.9, 0.9)),
        ]));
        let engine = RefinementEngine::new(generator.clone(), evaluator);
        let use_case = ProduceSceneUseCase::new(engine)
            .with_review(ReviewSceneUseCase::new(vec![Arc::new(BlockingDesigner)]));
        let mut coordinator = InteractionCoordinator::new();

        let result = use_case
            .execute(ProduceSceneInput::new(SEED), &mut coordinator)
            .await
            .unwrap();

        assert_eq!(result.final_content(), "v1");
        assert!(result.expansion.is_none());
        let review = result.review.as_ref().unwrap();
        assert_eq!(review.aggregate.len(), 1);
        assert!(generator.prompts()[0].contains("- [Designer] The trapdoor cue is impossible"));
    }

    #[tokio::test]
    async fn test_refine_then_expand() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            refined(SEED),
            expanded(&long_version()),
        ]));
        let evaluator = Arc::new(MirrorEvaluator::new(vec![(SEED, scores(0.5, 0.6, 0.5))]));
        let engine = RefinementEngine::new(generator.clone(), evaluator).with_params(
            crate::config::RefinementParams::default().with_max_iterations(1),
        );
        let use_case = ProduceSceneUseCase::new(engine);
        let mut coordinator = InteractionCoordinator::new();

        let result = use_case
            .execute(ProduceSceneInput::new(SEED).with_expansion(2000), &mut coordinator)
            .await
            .unwrap();

        assert!(result.review.is_none());
        assert_eq!(result.refinement.stop_reason, StopReason::MaxIterationsReached);
        let expansion = result.expansion.as_ref().unwrap();
        assert_eq!(expansion.outcome, ExpansionOutcome::Expanded);
        assert_eq!(result.final_content(), long_version());
        assert!(!generator.prompts()[0].contains("Reviewer Guidance"));
    }

    #[tokio::test]
    async fn test_cancelled_refinement_skips_expansion() {
        let token = CancellationToken::new();
        token.cancel();
        let generator = Arc::new(ScriptedGenerator::new(vec![]));
        let engine = RefinementEngine::new(generator.clone(), Arc::new(MirrorEvaluator::new(vec![])))
            .with_cancellation(token);
        let use_case = ProduceSceneUseCase::new(engine);
        let mut coordinator = InteractionCoordinator::new();

        let result = use_case
            .execute(ProduceSceneInput::new(SEED).with_expansion(2000), &mut coordinator)
            .await
            .unwrap();
        assert!(result.refinement.was_cancelled());
        assert!(result.expansion.is_none());
        assert_eq!(result.final_content(), SEED);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_conflict_resolution_can_be_disabled() {
        let generator = Arc::new(ScriptedGenerator::new(vec![refined("v1")]));
        let evaluator = Arc::new(MirrorEvaluator::new(vec![
            (SEED, scores(0.5, 0.5, 0.5)),
            ("v1", scores(0.9, 0.9, 0.9)),
        ]));
        let reviewers: Vec<Arc<dyn SceneReviewer>> = vec![
            Arc::new(LineReviewer("Actor A", "Look there!")),
            Arc::new(LineReviewer("Actor B", "It comes again.")),
        ];
        let use_case = ProduceSceneUseCase::new(RefinementEngine::new(generator, evaluator))
            .with_review(ReviewSceneUseCase::new(reviewers));
        let mut coordinator = InteractionCoordinator::new();

        let result = use_case
            .execute(
                ProduceSceneInput::new(SEED).without_conflict_resolution(),
                &mut coordinator,
            )
            .await
            .unwrap();

        let review = result.review.as_ref().unwrap();
        assert_eq!(review.aggregate.conflicts().len(), 1);
        assert!(review.decisions.is_empty());
    }
}
