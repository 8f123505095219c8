//! Refinement engine
//!
//! Quality-convergence loop over a [`ContentGenerator`] and a
//! [`QualityEvaluator`]:
//!
//! - [`RefinementEngine::refine`] revises a scene round by round until the
//!   mean score meets the threshold, improvement stalls or the attempt budget
//!   runs out.
//! - [`RefinementEngine::expand`] lengthens a scene to a target length and
//!   keeps the result only if it still carries the original's characters and
//!   plot.
//!
//! Both stages share the response handling in [`RefinementEngine::generate_section`]:
//! a response without its section markers is retried once with a correction
//! prompt, then degraded according to [`ExtractionFallback`].

mod expand;
mod refine;

#[cfg(test)]
pub(crate) mod test_support;

use crate::config::RefinementParams;
use crate::ports::content_generator::{ContentGenerator, GenerationError};
use crate::ports::quality_evaluator::{EvaluationError, QualityEvaluator};
use stagecraft_domain::{DomainError, ExtractionFallback, SceneRequirements, SectionMarkers};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Errors that abort a refinement or expansion run
///
/// Unparsable responses and rejected expansions are not errors; they are
/// reported on the result.
#[derive(Error, Debug)]
pub enum RefinementError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] DomainError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Evaluation failed: {0}")]
    Evaluation(#[from] EvaluationError),
}

/// Input for [`RefinementEngine::refine`]
#[derive(Debug, Clone, Default)]
pub struct RefineInput {
    pub content: String,
    pub requirements: SceneRequirements,
    /// Additional guidance for every revision prompt (e.g. a revision plan)
    pub revision_context: Option<String>,
}

impl RefineInput {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_requirements(mut self, requirements: SceneRequirements) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn with_revision_context(mut self, context: impl Into<String>) -> Self {
        self.revision_context = Some(context.into());
        self
    }
}

/// What came back from a generate-and-extract exchange.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Extraction {
    /// Content between the markers
    Section(String),
    /// Both attempts lacked the markers; holds the last raw response
    Unparsed(String),
    Cancelled,
}

impl Extraction {
    /// Apply the fallback policy to an unparsed response.
    fn degrade(self, fallback: ExtractionFallback) -> Self {
        match (self, fallback) {
            (Extraction::Unparsed(raw), ExtractionFallback::WholeResponse) if !raw.trim().is_empty() => {
                Extraction::Section(raw.trim().to_string())
            }
            (other, _) => other,
        }
    }
}

/// Refinement and expansion over pluggable generator and evaluator ports
pub struct RefinementEngine<G: ContentGenerator + 'static, E: QualityEvaluator + 'static> {
    generator: Arc<G>,
    evaluator: Arc<E>,
    params: RefinementParams,
    cancellation_token: Option<CancellationToken>,
}

impl<G: ContentGenerator + 'static, E: QualityEvaluator + 'static> Clone for RefinementEngine<G, E> {
    fn clone(&self) -> Self {
        Self {
            generator: self.generator.clone(),
            evaluator: self.evaluator.clone(),
            params: self.params.clone(),
            cancellation_token: self.cancellation_token.clone(),
        }
    }
}

impl<G: ContentGenerator + 'static, E: QualityEvaluator + 'static> RefinementEngine<G, E> {
    pub fn new(generator: Arc<G>, evaluator: Arc<E>) -> Self {
        Self {
            generator,
            evaluator,
            params: RefinementParams::default(),
            cancellation_token: None,
        }
    }

    pub fn with_params(mut self, params: RefinementParams) -> Self {
        self.params = params;
        self
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn params(&self) -> &RefinementParams {
        &self.params
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation_token
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }

    /// Generate, extract the marked section, and retry once with a correction prompt.
    pub(crate) async fn generate_section(
        &self,
        prompt: &str,
        markers: SectionMarkers,
        correction: impl Fn(&str) -> String,
    ) -> Result<Extraction, RefinementError> {
        let response = self.generator.generate(prompt).await?;
        if self.is_cancelled() {
            return Ok(Extraction::Cancelled);
        }
        match markers.extract(&response) {
            Ok(section) => return Ok(Extraction::Section(section.to_string())),
            Err(e) => warn!("Could not extract '{}' section ({}), retrying", markers.content, e),
        }

        let retry = self.generator.generate(&correction(&response)).await?;
        if self.is_cancelled() {
            return Ok(Extraction::Cancelled);
        }
        match markers.extract(&retry) {
            Ok(section) => Ok(Extraction::Section(section.to_string())),
            Err(e) => {
                warn!("Retry still lacks the '{}' section: {}", markers.content, e);
                Ok(Extraction::Unparsed(retry).degrade(self.params.extraction_fallback))
            }
        }
    }
}
