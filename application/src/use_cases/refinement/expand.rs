//! Expansion stage

use super::{Extraction, RefinementEngine, RefinementError};
use crate::ports::content_generator::ContentGenerator;
use crate::ports::progress::{ProgressNotifier, ProgressUpdate, Stage};
use crate::ports::quality_evaluator::QualityEvaluator;
use stagecraft_domain::core::error::ensure_scene_content;
use stagecraft_domain::{
    ExpansionOutcome, ExpansionResult, ExpansionValidator, RefinementPromptTemplate,
    SectionMarkers,
};
use tracing::{info, warn};

impl<G: ContentGenerator + 'static, E: QualityEvaluator + 'static> RefinementEngine<G, E> {
    /// Lengthen a scene to at least `target_length` bytes.
    ///
    /// A single expansion is attempted. The candidate is kept only when it
    /// passes [`ExpansionValidator`]; otherwise the original comes back with
    /// the reason on [`ExpansionResult::outcome`].
    pub async fn expand(
        &self,
        content: String,
        target_length: usize,
        progress: &dyn ProgressNotifier,
    ) -> Result<ExpansionResult, RefinementError> {
        if content.len() >= target_length {
            info!(
                "Scene already {} chars (target {}), skipping expansion",
                content.len(),
                target_length
            );
            return Ok(ExpansionResult::unchanged(
                content,
                ExpansionOutcome::AlreadyLongEnough,
            ));
        }
        ensure_scene_content(&content)?;
        if self.is_cancelled() {
            return Ok(ExpansionResult::unchanged(content, ExpansionOutcome::Cancelled));
        }

        progress.on_progress(&ProgressUpdate::new(
            Stage::Expanding,
            1,
            1,
            format!("Expanding scene from {} to {} chars", content.len(), target_length),
        ));

        let prompt = RefinementPromptTemplate::expansion(&content, target_length);
        let extraction = self
            .generate_section(&prompt, SectionMarkers::EXPANSION, |failed| {
                RefinementPromptTemplate::expansion_correction(failed, target_length, &prompt)
            })
            .await?;
        progress.on_stage_complete(Stage::Expanding);

        let candidate = match extraction {
            Extraction::Section(candidate) => candidate,
            Extraction::Cancelled => {
                return Ok(ExpansionResult::unchanged(content, ExpansionOutcome::Cancelled));
            }
            Extraction::Unparsed(_) => {
                warn!("Expansion response could not be parsed, keeping original");
                return Ok(ExpansionResult::unchanged(
                    content,
                    ExpansionOutcome::ExtractionFailed,
                ));
            }
        };

        match ExpansionValidator.validate(&content, &candidate) {
            Ok(()) => {
                let result = ExpansionResult::expanded(content.len(), candidate);
                if result.final_length < target_length {
                    warn!(
                        "Expanded scene is {} chars, short of the {} target",
                        result.final_length, target_length
                    );
                }
                info!(
                    "Expanded scene {} -> {} chars ({:.2}x)",
                    result.original_length, result.final_length, result.expansion_ratio
                );
                Ok(result)
            }
            Err(rejection) => {
                warn!("Discarding expansion: {}", rejection);
                Ok(ExpansionResult::unchanged(
                    content,
                    ExpansionOutcome::ValidationFailed { rejection },
                ))
            }
        }
    }
}
