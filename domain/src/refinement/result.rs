//! Refinement and expansion results.

use super::iteration::IterationRecord;
use super::quality::{QualityVector, mean_of};
use serde::{Deserialize, Serialize};

/// Why the refinement loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Initial content already met the quality threshold; no rounds ran
    AlreadyMeetsThreshold,
    /// A round reached the quality threshold
    QualityThresholdReached,
    /// A round improved less than the improvement threshold
    DiminishingReturns,
    /// The iteration cap was exhausted
    MaxIterationsReached,
    /// The caller cancelled the session
    Cancelled,
}

impl StopReason {
    pub fn description(&self) -> &'static str {
        match self {
            StopReason::AlreadyMeetsThreshold => "initial content already met the quality threshold",
            StopReason::QualityThresholdReached => "quality threshold reached",
            StopReason::DiminishingReturns => "improvement fell below threshold",
            StopReason::MaxIterationsReached => "maximum iterations reached",
            StopReason::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Outcome of one refinement session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementResult {
    /// Content at loop exit
    pub content: String,
    /// Scores of the content the session started from
    pub initial_quality: QualityVector,
    /// Scores of `content`
    pub final_quality: QualityVector,
    /// Completed rounds, in order
    pub iterations: Vec<IterationRecord>,
    /// Number of completed rounds (`iterations.len()`)
    pub iterations_performed: usize,
    /// Rounds abandoned because the response could not be parsed
    pub skipped_rounds: usize,
    pub stop_reason: StopReason,
}

impl RefinementResult {
    /// Result for a session that stopped before running any round.
    pub fn unchanged(content: String, quality: QualityVector, stop_reason: StopReason) -> Self {
        Self {
            content,
            initial_quality: quality.clone(),
            final_quality: quality,
            iterations: Vec::new(),
            iterations_performed: 0,
            skipped_rounds: 0,
            stop_reason,
        }
    }

    /// Mean per-dimension change from initial to final scores.
    ///
    /// Only dimensions present in both vectors are compared.
    pub fn total_improvement(&self) -> f64 {
        mean_of(self.initial_quality.iter().filter_map(|(name, before)| {
            self.final_quality.get(name).map(|after| after - before)
        }))
    }

    pub fn initial_mean(&self) -> f64 {
        self.initial_quality.mean()
    }

    pub fn final_mean(&self) -> f64 {
        self.final_quality.mean()
    }

    pub fn was_cancelled(&self) -> bool {
        self.stop_reason == StopReason::Cancelled
    }
}

/// Why an expansion candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ExpansionRejection {
    /// Characters present in the original are missing from the candidate
    MissingCharacters { characters: Vec<String> },
    /// The candidate is not longer than the original
    NotLonger { original: usize, candidate: usize },
    /// A significant original sentence lost most of its distinctive words
    PlotElementsMissing { sentence: String },
}

impl std::fmt::Display for ExpansionRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpansionRejection::MissingCharacters { characters } => {
                write!(f, "expanded scene is missing characters: {}", characters.join(", "))
            }
            ExpansionRejection::NotLonger {
                original,
                candidate,
            } => write!(
                f,
                "expanded scene ({candidate} chars) is not longer than the original ({original} chars)"
            ),
            ExpansionRejection::PlotElementsMissing { sentence } => {
                write!(f, "expanded scene may be missing key plot elements from: '{sentence}'")
            }
        }
    }
}

/// How an expansion attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExpansionOutcome {
    /// Content already met the target length; nothing was generated
    AlreadyLongEnough,
    /// A validated expansion was accepted
    Expanded,
    /// The response could not be parsed even after the retry
    ExtractionFailed,
    /// The candidate failed validation and was discarded
    ValidationFailed { rejection: ExpansionRejection },
    /// Cancelled before a candidate was accepted
    Cancelled,
}

/// Outcome of one expansion attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionResult {
    pub content: String,
    pub original_length: usize,
    pub final_length: usize,
    pub expansion_ratio: f64,
    pub outcome: ExpansionOutcome,
}

impl ExpansionResult {
    /// Result that hands the original content back untouched.
    pub fn unchanged(original: String, outcome: ExpansionOutcome) -> Self {
        let length = original.len();
        Self {
            content: original,
            original_length: length,
            final_length: length,
            expansion_ratio: 1.0,
            outcome,
        }
    }

    /// Result for an accepted expansion.
    pub fn expanded(original_length: usize, content: String) -> Self {
        let final_length = content.len();
        let expansion_ratio = if original_length > 0 {
            final_length as f64 / original_length as f64
        } else {
            1.0
        };
        Self {
            content,
            original_length,
            final_length,
            expansion_ratio,
            outcome: ExpansionOutcome::Expanded,
        }
    }

    /// Explicit non-fatal failure flag.
    pub fn is_failure(&self) -> bool {
        matches!(
            self.outcome,
            ExpansionOutcome::ExtractionFailed | ExpansionOutcome::ValidationFailed { .. }
        )
    }
}
