//! Refinement loop

use super::{Extraction, RefineInput, RefinementEngine, RefinementError};
use crate::ports::content_generator::ContentGenerator;
use crate::ports::progress::{ProgressNotifier, ProgressUpdate, Stage};
use crate::ports::quality_evaluator::QualityEvaluator;
use stagecraft_domain::core::error::ensure_scene_content;
use stagecraft_domain::{
    IterationRecord, QualityVector, RefinementPromptTemplate, RefinementResult,
    RevisionPrompt, SectionMarkers, StopReason,
};
use std::time::Instant;
use tracing::{debug, info, warn};

impl<G: ContentGenerator + 'static, E: QualityEvaluator + 'static> RefinementEngine<G, E> {
    /// Revise a scene until it converges.
    ///
    /// Returns a result even when nothing improved; only an empty scene or a
    /// failing port is an error. Cancellation ends the run early with
    /// [`StopReason::Cancelled`].
    pub async fn refine(
        &self,
        input: RefineInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<RefinementResult, RefinementError> {
        let RefineInput {
            content,
            requirements,
            revision_context,
        } = input;

        ensure_scene_content(&content)?;
        if self.is_cancelled() {
            return Ok(RefinementResult::unchanged(
                content,
                QualityVector::new(),
                StopReason::Cancelled,
            ));
        }

        let params = &self.params;
        progress.on_progress(&ProgressUpdate::new(
            Stage::Evaluating,
            1,
            1,
            format!("Evaluating {}", requirements.scene_label()),
        ));
        let initial = self.evaluator.evaluate(&content, &requirements).await?;
        progress.on_stage_complete(Stage::Evaluating);
        info!("Initial quality {:.2} ({})", initial.mean(), initial);

        if initial.mean() >= params.quality_threshold {
            info!(
                "Scene already meets the quality threshold ({:.2})",
                params.quality_threshold
            );
            return Ok(RefinementResult::unchanged(
                content,
                initial,
                StopReason::AlreadyMeetsThreshold,
            ));
        }

        let mut current_content = content;
        let mut current_quality = initial.clone();
        let mut focus_areas = initial.lowest(params.focus_area_count);
        let mut iterations: Vec<IterationRecord> = Vec::new();
        let mut skipped_rounds = 0;
        let mut stop_reason = StopReason::MaxIterationsReached;

        for attempt in 1..=params.max_iterations {
            if self.is_cancelled() {
                stop_reason = StopReason::Cancelled;
                break;
            }

            progress.on_progress(&ProgressUpdate::new(
                Stage::Refining,
                attempt,
                params.max_iterations,
                format!(
                    "Refining scene (iteration {}/{})",
                    attempt, params.max_iterations
                ),
            ));
            debug!("Iteration {} focus areas: {}", attempt, focus_areas.join(", "));

            let started = Instant::now();
            let prompt = RefinementPromptTemplate::revision(&RevisionPrompt {
                iteration: attempt,
                content: &current_content,
                quality: &current_quality,
                history: &iterations,
                focus_areas: &focus_areas,
                requirements: &requirements,
                revision_context: revision_context.as_deref(),
            });

            let revised = match self
                .generate_section(&prompt, SectionMarkers::REFINEMENT, |failed| {
                    RefinementPromptTemplate::revision_correction(failed, &prompt)
                })
                .await?
            {
                Extraction::Section(revised) => revised,
                Extraction::Cancelled => {
                    stop_reason = StopReason::Cancelled;
                    break;
                }
                Extraction::Unparsed(_) => {
                    warn!("Skipping iteration {}: no usable scene in response", attempt);
                    skipped_rounds += 1;
                    progress.on_round_skipped(attempt);
                    continue;
                }
            };

            let after = self.evaluator.evaluate(&revised, &requirements).await?;
            let record = IterationRecord::new(
                iterations.len() + 1,
                current_quality.clone(),
                after.clone(),
                focus_areas.clone(),
                started.elapsed(),
            );

            let record = if params
                .revision_policy
                .adopts(current_quality.mean(), after.mean())
            {
                current_content = revised;
                current_quality = after;
                record
            } else {
                info!(
                    "Discarding revision {} ({:.2} < {:.2})",
                    record.iteration,
                    after.mean(),
                    current_quality.mean()
                );
                record.discarded()
            };

            info!(
                "Iteration {}: quality {:.2}, improvement {:+.3}",
                record.iteration,
                current_quality.mean(),
                record.overall_improvement
            );
            progress.on_iteration_complete(&record);

            let reached_threshold = current_quality.mean() >= params.quality_threshold;
            let stalled =
                !iterations.is_empty() && !record.is_significant(params.improvement_threshold);
            focus_areas = record.next_focus_areas(params.focus_area_count);
            iterations.push(record);

            if reached_threshold {
                stop_reason = StopReason::QualityThresholdReached;
                break;
            }
            if stalled {
                stop_reason = StopReason::DiminishingReturns;
                break;
            }
        }

        progress.on_stage_complete(Stage::Refining);
        info!(
            "Refinement finished after {} iteration(s): {}",
            iterations.len(),
            stop_reason
        );

        Ok(RefinementResult {
            content: current_content,
            initial_quality: initial,
            final_quality: current_quality,
            iterations_performed: iterations.len(),
            iterations,
            skipped_rounds,
            stop_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::config::RefinementParams;
    use crate::ports::content_generator::GenerationError;
    use crate::ports::progress::NoProgress;
    use stagecraft_domain::{DomainError, ExtractionFallback, RevisionPolicy};
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    fn engine(
        generator: ScriptedGenerator,
        evaluator: MirrorEvaluator,
    ) -> (
        RefinementEngine<ScriptedGenerator, MirrorEvaluator>,
        Arc<ScriptedGenerator>,
        Arc<MirrorEvaluator>,
    ) {
        let generator = Arc::new(generator);
        let evaluator = Arc::new(evaluator);
        let engine = RefinementEngine::new(generator.clone(), evaluator.clone());
        (engine, generator, evaluator)
    }

    #[tokio::test]
    async fn test_fast_exit_when_already_good() {
        let (engine, generator, _) = engine(
            ScriptedGenerator::new(vec![]),
            MirrorEvaluator::new(vec![("seed", scores(0.9, 0.9, 0.9))]),
        );

        let result = engine.refine(RefineInput::new("seed"), &NoProgress).await.unwrap();
        assert_eq!(result.content, "seed");
        assert_eq!(result.iterations_performed, 0);
        assert!(result.iterations.is_empty());
        assert_eq!(result.stop_reason, StopReason::AlreadyMeetsThreshold);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_content_rejected() {
        let (engine, _, evaluator) = engine(ScriptedGenerator::new(vec![]), MirrorEvaluator::new(vec![]));
        let result = engine.refine(RefineInput::new("  \n"), &NoProgress).await;
        assert!(matches!(result, Err(RefinementError::InvalidInput(DomainError::EmptyContent))));
        assert_eq!(evaluator.calls(), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_converges_on_threshold() {
        let (engine, generator, _) = engine(
            ScriptedGenerator::new(vec![refined("v1"), refined("v2"), refined("v3"), refined("v4")]),
            MirrorEvaluator::new(vec![
                ("seed", scores(0.5, 0.4, 0.6)),
                ("v1", scores(0.8, 0.5, 0.75)),
                ("v2", scores(0.85, 0.7, 0.8)),
                ("v3", scores(0.9, 0.85, 0.88)),
                ("v4", scores(0.95, 0.95, 0.95)),
            ]),
        );
        let engine = engine.with_params(RefinementParams::default().with_focus_area_count(2));
        let progress = RecordingProgress::default();

        let result = engine.refine(RefineInput::new("seed"), &progress).await.unwrap();

        assert_eq!(result.stop_reason, StopReason::QualityThresholdReached);
        assert_eq!(result.iterations_performed, 3);
        assert_eq!(result.content, "v3");
        assert!(result.final_quality.mean() >= 0.85);
        assert!(result.iterations[1].quality() < 0.85);
        assert_eq!(generator.calls(), 3);

        // Initial focus: lowest absolute scores
        assert_eq!(result.iterations[0].focus_areas, vec!["pacing", "dialogue"]);
        // Iteration 2 focus: smallest iteration-1 deltas (pacing +0.1, character +0.15)
        assert_eq!(result.iterations[1].focus_areas, vec!["pacing", "character"]);
        assert!(generator.prompts()[1].contains("- pacing\n- character\n"));

        let indices: Vec<usize> = result.iterations.iter().map(|r| r.iteration).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(*progress.iterations.lock().unwrap(), vec![1, 2, 3]);
        assert!(result.total_improvement() > 0.3);
    }

    #[tokio::test]
    async fn test_stops_on_diminishing_returns() {
        let (engine, _, _) = engine(
            ScriptedGenerator::new(vec![refined("v1"), refined("v2"), refined("v3")]),
            MirrorEvaluator::new(vec![
                ("seed", scores(0.5, 0.5, 0.5)),
                ("v1", scores(0.6, 0.6, 0.6)),
                ("v2", scores(0.61, 0.6, 0.6)),
                ("v3", scores(0.9, 0.9, 0.9)),
            ]),
        );

        let result = engine.refine(RefineInput::new("seed"), &NoProgress).await.unwrap();
        assert_eq!(result.stop_reason, StopReason::DiminishingReturns);
        assert_eq!(result.iterations_performed, 2);
        assert_eq!(result.content, "v2");
    }

    #[tokio::test]
    async fn test_first_round_never_stalls() {
        // A flat first round continues; only later rounds can stall
        let (engine, generator, _) = engine(
            ScriptedGenerator::new(vec![refined("v1"), refined("v2")]),
            MirrorEvaluator::new(vec![
                ("seed", scores(0.5, 0.5, 0.5)),
                ("v1", scores(0.5, 0.5, 0.5)),
                ("v2", scores(0.5, 0.5, 0.5)),
            ]),
        );

        let result = engine.refine(RefineInput::new("seed"), &NoProgress).await.unwrap();
        assert_eq!(result.iterations_performed, 2);
        assert_eq!(result.stop_reason, StopReason::DiminishingReturns);
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_bookkeeping_respects_max_iterations() {
        let mut responses = Vec::new();
        let mut table = vec![("seed", scores(0.1, 0.1, 0.1))];
        let names = ["v1", "v2", "v3", "v4", "v5", "v6"];
        for (i, name) in names.iter().enumerate() {
            responses.push(refined(name));
            let s = 0.2 + 0.1 * i as f64;
            table.push((*name, scores(s, s, s)));
        }
        let (engine, generator, _) = engine(ScriptedGenerator::new(responses), MirrorEvaluator::new(table));
        let engine = engine.with_params(RefinementParams::default().with_max_iterations(4));

        let result = engine.refine(RefineInput::new("seed"), &NoProgress).await.unwrap();
        assert_eq!(result.stop_reason, StopReason::MaxIterationsReached);
        assert_eq!(result.iterations.len(), 4);
        let indices: Vec<usize> = result.iterations.iter().map(|r| r.iteration).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
        assert_eq!(generator.calls(), 4);
    }

    #[tokio::test]
    async fn test_malformed_response_retried_once() {
        let (engine, generator, _) = engine(
            ScriptedGenerator::new(vec!["no markers here".to_string(), refined("v1")]),
            MirrorEvaluator::new(vec![
                ("seed", scores(0.5, 0.5, 0.5)),
                ("v1", scores(0.9, 0.9, 0.9)),
            ]),
        );

        let result = engine.refine(RefineInput::new("seed"), &NoProgress).await.unwrap();
        assert_eq!(result.content, "v1");
        assert_eq!(result.skipped_rounds, 0);

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].starts_with("CORRECTION NEEDED"));
        assert!(prompts[1].contains("no markers here"));
    }

    #[tokio::test]
    async fn test_unparsable_round_is_skipped_without_gaps() {
        let (engine, generator, _) = engine(
            ScriptedGenerator::new(vec![
                "garbage".to_string(),
                "still garbage".to_string(),
                refined("v1"),
            ]),
            MirrorEvaluator::new(vec![
                ("seed", scores(0.5, 0.5, 0.5)),
                ("v1", scores(0.9, 0.9, 0.9)),
            ]),
        );
        let progress = RecordingProgress::default();

        let result = engine.refine(RefineInput::new("seed"), &progress).await.unwrap();
        assert_eq!(result.skipped_rounds, 1);
        assert_eq!(result.iterations.len(), 1);
        assert_eq!(result.iterations[0].iteration, 1);
        assert_eq!(result.content, "v1");
        assert_eq!(generator.calls(), 3);
        assert_eq!(*progress.skipped.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_skipped_rounds_count_against_budget() {
        let garbage: Vec<String> = (0..4).map(|i| format!("garbage {i}")).collect();
        let (engine, generator, _) = engine(
            ScriptedGenerator::new(garbage),
            MirrorEvaluator::new(vec![("seed", scores(0.5, 0.5, 0.5))]),
        );
        let engine = engine.with_params(RefinementParams::default().with_max_iterations(2));

        let result = engine.refine(RefineInput::new("seed"), &NoProgress).await.unwrap();
        assert_eq!(result.content, "seed");
        assert_eq!(result.skipped_rounds, 2);
        assert!(result.iterations.is_empty());
        assert_eq!(result.stop_reason, StopReason::MaxIterationsReached);
        assert_eq!(generator.calls(), 4);
    }

    #[tokio::test]
    async fn test_whole_response_fallback() {
        let (engine, _, _) = engine(
            ScriptedGenerator::new(vec!["HAMLET: raw".to_string(), "  HAMLET: raw2 \n".to_string()]),
            MirrorEvaluator::new(vec![
                ("seed", scores(0.5, 0.5, 0.5)),
                ("HAMLET: raw2", scores(0.9, 0.9, 0.9)),
            ]),
        );
        let engine = engine.with_params(
            RefinementParams::default().with_extraction_fallback(ExtractionFallback::WholeResponse),
        );

        let result = engine.refine(RefineInput::new("seed"), &NoProgress).await.unwrap();
        assert_eq!(result.content, "HAMLET: raw2");
        assert_eq!(result.skipped_rounds, 0);
    }

    #[tokio::test]
    async fn test_greedy_adopts_regressions() {
        let (engine, _, _) = engine(
            ScriptedGenerator::new(vec![refined("worse"), refined("better")]),
            MirrorEvaluator::new(vec![
                ("seed", scores(0.5, 0.5, 0.5)),
                ("worse", scores(0.4, 0.4, 0.4)),
                ("better", scores(0.9, 0.9, 0.9)),
            ]),
        );

        let result = engine.refine(RefineInput::new("seed"), &NoProgress).await.unwrap();
        assert!(result.iterations[0].adopted);
        assert_eq!(result.iterations[1].before, scores(0.4, 0.4, 0.4));
        assert_eq!(result.content, "better");
    }

    #[tokio::test]
    async fn test_best_of_keeps_prior_content() {
        let (engine, generator, _) = engine(
            ScriptedGenerator::new(vec![refined("worse"), refined("better")]),
            MirrorEvaluator::new(vec![
                ("seed", scores(0.5, 0.5, 0.5)),
                ("worse", scores(0.4, 0.4, 0.4)),
                ("better", scores(0.9, 0.9, 0.9)),
            ]),
        );
        let engine = engine.with_params(
            RefinementParams::default().with_revision_policy(RevisionPolicy::BestOf),
        );

        let result = engine.refine(RefineInput::new("seed"), &NoProgress).await.unwrap();
        assert!(!result.iterations[0].adopted);
        assert_eq!(result.iterations[1].before, scores(0.5, 0.5, 0.5));
        assert!(generator.prompts()[1].contains("Current Scene:\nseed\n"));
        assert_eq!(result.content, "better");
        assert_eq!(result.stop_reason, StopReason::QualityThresholdReached);
    }

    #[tokio::test]
    async fn test_best_of_regression_then_stall_returns_original() {
        let (engine, _, _) = engine(
            ScriptedGenerator::new(vec![refined("worse"), refined("also worse")]),
            MirrorEvaluator::new(vec![
                ("seed", scores(0.5, 0.5, 0.5)),
                ("worse", scores(0.4, 0.4, 0.4)),
                ("also worse", scores(0.45, 0.45, 0.45)),
            ]),
        );
        let engine = engine.with_params(
            RefinementParams::default().with_revision_policy(RevisionPolicy::BestOf),
        );

        let result = engine.refine(RefineInput::new("seed"), &NoProgress).await.unwrap();
        assert_eq!(result.content, "seed");
        assert_eq!(result.final_quality, scores(0.5, 0.5, 0.5));
        assert_eq!(result.stop_reason, StopReason::DiminishingReturns);
    }

    #[tokio::test]
    async fn test_revision_context_reaches_prompt() {
        let (engine, generator, _) = engine(
            ScriptedGenerator::new(vec![refined("v1")]),
            MirrorEvaluator::new(vec![
                ("seed", scores(0.5, 0.5, 0.5)),
                ("v1", scores(0.9, 0.9, 0.9)),
            ]),
        );
        let input = RefineInput::new("seed").with_revision_context("BLOCKING ISSUES (MUST FIX):\n- [Director] x");

        engine.refine(input, &NoProgress).await.unwrap();
        assert!(generator.prompts()[0].contains("- [Director] x"));
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let (engine, generator, evaluator) = engine(ScriptedGenerator::new(vec![]), MirrorEvaluator::new(vec![]));
        let engine = engine.with_cancellation(token);

        let result = engine.refine(RefineInput::new("seed"), &NoProgress).await.unwrap();
        assert!(result.was_cancelled());
        assert_eq!(result.content, "seed");
        assert_eq!(generator.calls(), 0);
        assert_eq!(evaluator.calls(), 0);
    }

    #[tokio::test]
    async fn test_cancel_after_generate_keeps_prior_content() {
        let token = CancellationToken::new();
        let (engine, generator, evaluator) = engine(
            ScriptedGenerator::new(vec![refined("v1"), refined("v2")]).cancelling_on_call(2, token.clone()),
            MirrorEvaluator::new(vec![
                ("seed", scores(0.5, 0.5, 0.5)),
                ("v1", scores(0.6, 0.6, 0.6)),
                ("v2", scores(0.9, 0.9, 0.9)),
            ]),
        );
        let engine = engine.with_cancellation(token);

        let result = engine.refine(RefineInput::new("seed"), &NoProgress).await.unwrap();
        assert_eq!(result.stop_reason, StopReason::Cancelled);
        assert_eq!(result.content, "v1");
        assert_eq!(result.iterations.len(), 1);
        assert_eq!(generator.calls(), 2);
        // seed + v1; v2 is never evaluated
        assert_eq!(evaluator.calls(), 2);
    }

    #[tokio::test]
    async fn test_generation_error_propagates() {
        let (engine, _, _) = engine(
            ScriptedGenerator::failing(GenerationError::Timeout),
            MirrorEvaluator::new(vec![("seed", scores(0.5, 0.5, 0.5))]),
        );
        let result = engine.refine(RefineInput::new("seed"), &NoProgress).await;
        assert!(matches!(
            result,
            Err(RefinementError::Generation(GenerationError::Timeout))
        ));
    }

    #[tokio::test]
    async fn test_evaluation_error_propagates() {
        let (engine, _, _) = engine(
            ScriptedGenerator::new(vec![refined("unscored")]),
            MirrorEvaluator::new(vec![("seed", scores(0.5, 0.5, 0.5))]),
        );
        let result = engine.refine(RefineInput::new("seed"), &NoProgress).await;
        assert!(matches!(result, Err(RefinementError::Evaluation(_))));
    }
}
