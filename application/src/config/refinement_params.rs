//! Refinement parameters — loop control for the refinement engine.

use serde::{Deserialize, Serialize};
use stagecraft_domain::{ExtractionFallback, RevisionPolicy, refinement::requirements::DEFAULT_MIN_LENGTH};

/// Refinement loop control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementParams {
    /// Maximum number of revision attempts, skipped rounds included.
    pub max_iterations: usize,
    /// Mean score at which refinement stops.
    pub quality_threshold: f64,
    /// Minimum mean delta for a round (after the first) to keep going.
    pub improvement_threshold: f64,
    /// Number of dimensions targeted per round.
    pub focus_area_count: usize,
    pub revision_policy: RevisionPolicy,
    pub extraction_fallback: ExtractionFallback,
}

impl Default for RefinementParams {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            quality_threshold: 0.85,
            improvement_threshold: 0.02,
            focus_area_count: 3,
            revision_policy: RevisionPolicy::default(),
            extraction_fallback: ExtractionFallback::default(),
        }
    }
}

impl RefinementParams {
    // ==================== Builder Methods ====================

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_quality_threshold(mut self, threshold: f64) -> Self {
        self.quality_threshold = threshold;
        self
    }

    pub fn with_improvement_threshold(mut self, threshold: f64) -> Self {
        self.improvement_threshold = threshold;
        self
    }

    pub fn with_focus_area_count(mut self, count: usize) -> Self {
        self.focus_area_count = count;
        self
    }

    pub fn with_revision_policy(mut self, policy: RevisionPolicy) -> Self {
        self.revision_policy = policy;
        self
    }

    pub fn with_extraction_fallback(mut self, fallback: ExtractionFallback) -> Self {
        self.extraction_fallback = fallback;
        self
    }
}

/// Expansion stage parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionParams {
    /// Length (bytes) the expanded scene must reach.
    pub target_length: usize,
}

impl Default for ExpansionParams {
    fn default() -> Self {
        Self {
            target_length: DEFAULT_MIN_LENGTH,
        }
    }
}

impl ExpansionParams {
    pub fn with_target_length(mut self, target_length: usize) -> Self {
        self.target_length = target_length;
        self
    }
}
