//! Refinement policies - how the loop treats revisions and malformed output.

use serde::{Deserialize, Serialize};

/// What to do with a revision whose mean quality is lower than before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionPolicy {
    /// Always adopt the newest revision, even when it scored lower
    #[default]
    Greedy,
    /// Adopt a revision only if its mean quality did not decrease
    BestOf,
}

impl RevisionPolicy {
    /// Whether a revision scoring `candidate` should replace one scoring `current`.
    pub fn adopts(&self, current: f64, candidate: f64) -> bool {
        match self {
            RevisionPolicy::Greedy => true,
            RevisionPolicy::BestOf => candidate >= current,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RevisionPolicy::Greedy => "greedy",
            RevisionPolicy::BestOf => "best_of",
        }
    }
}

impl std::fmt::Display for RevisionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RevisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "greedy" => Ok(RevisionPolicy::Greedy),
            "best_of" | "bestof" => Ok(RevisionPolicy::BestOf),
            other => Err(format!(
                "Unknown revision policy: {other}. Valid: greedy, best_of"
            )),
        }
    }
}

/// What to do when a response still lacks its section markers after the retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionFallback {
    /// Abandon the round and keep the prior content
    #[default]
    SkipRound,
    /// Treat the entire response as the revised content
    WholeResponse,
}

impl std::str::FromStr for ExtractionFallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "skip_round" | "skip" => Ok(ExtractionFallback::SkipRound),
            "whole_response" | "whole" => Ok(ExtractionFallback::WholeResponse),
            other => Err(format!(
                "Unknown extraction fallback: {other}. Valid: skip_round, whole_response"
            )),
        }
    }
}
