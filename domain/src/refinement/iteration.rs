//! Iteration records - one immutable snapshot per completed refinement round.

use super::quality::{QualityVector, mean_of, smallest_keys};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Snapshot of one completed refinement round.
///
/// Created once by the refinement loop and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// Round number (1-indexed, no gaps)
    pub iteration: usize,
    /// Scores the round started from
    pub before: QualityVector,
    /// Scores of the revision produced in this round
    pub after: QualityVector,
    /// Per-dimension `after - before`
    pub delta: BTreeMap<String, f64>,
    /// Mean of `delta`
    pub overall_improvement: f64,
    /// Dimensions the revision prompt targeted
    pub focus_areas: Vec<String>,
    /// Wall-clock time spent on generation and evaluation
    pub duration: Duration,
    /// Whether the revision replaced the current content
    pub adopted: bool,
}

impl IterationRecord {
    pub fn new(
        iteration: usize,
        before: QualityVector,
        after: QualityVector,
        focus_areas: Vec<String>,
        duration: Duration,
    ) -> Self {
        let delta = after.delta_from(&before);
        let overall_improvement = mean_of(delta.values().copied());
        Self {
            iteration,
            before,
            after,
            delta,
            overall_improvement,
            focus_areas,
            duration,
            adopted: true,
        }
    }

    /// Mark the revision as discarded (best-of policy).
    pub fn discarded(mut self) -> Self {
        self.adopted = false;
        self
    }

    /// Mean quality after this round.
    pub fn quality(&self) -> f64 {
        self.after.mean()
    }

    /// Whether the round improved the mean by at least `threshold`.
    pub fn is_significant(&self, threshold: f64) -> bool {
        self.overall_improvement >= threshold
    }

    /// The `n` dimensions that improved least this round.
    ///
    /// Stagnating dimensions are targeted rather than merely low ones: a weak
    /// but improving dimension is left alone while a flat one gets attention.
    pub fn next_focus_areas(&self, n: usize) -> Vec<String> {
        smallest_keys(&self.delta, n)
    }

    /// One-line summary used in the revision prompt history.
    pub fn summary_line(&self) -> String {
        format!(
            "Iteration {}: Quality={:.2}, Improvement={:.2}, Focus Areas: {}",
            self.iteration,
            self.quality(),
            self.overall_improvement,
            self.focus_areas.join(", ")
        )
    }
}
