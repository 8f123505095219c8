//! Feedback aggregate - merges several reviewers' packages for one scene.

use super::schema::{ComprehensiveFeedback, FeedbackItem, FeedbackType};
use crate::refinement::quality::mean_of;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum number of items listed per category in the revision plan.
pub const MAX_ITEMS_PER_CATEGORY: usize = 5;

/// One reviewer's proposed rewrite of a dialogue line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueProposal {
    pub agent: String,
    pub suggestion: Option<String>,
    pub reasoning: String,
}

/// Two or more reviewers proposing different rewrites of the same line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueConflict {
    pub character: String,
    pub line_reference: String,
    /// Every proposer for the line, in package order
    pub proposals: Vec<DialogueProposal>,
}

impl DialogueConflict {
    pub fn location(&self) -> String {
        format!("{}: {}", self.character, self.line_reference)
    }
}

/// All feedback packages collected for one scene.
///
/// Grows by appending; every derived view is computed on demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackAggregate {
    pub scene_id: String,
    #[serde(default)]
    pub packages: Vec<ComprehensiveFeedback>,
}

impl FeedbackAggregate {
    pub fn new(scene_id: impl Into<String>) -> Self {
        Self {
            scene_id: scene_id.into(),
            packages: Vec::new(),
        }
    }

    pub fn add(&mut self, feedback: ComprehensiveFeedback) {
        self.packages.push(feedback);
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Mean quality score across packages (0.0 when empty).
    pub fn consensus_score(&self) -> f64 {
        mean_of(self.packages.iter().map(|p| p.score()))
    }

    /// Every blocker with its agent, in package-insertion order.
    pub fn blockers(&self) -> Vec<(&str, &FeedbackItem)> {
        self.packages
            .iter()
            .flat_map(|p| p.blockers().map(move |item| (p.agent_name.as_str(), item)))
            .collect()
    }

    /// Dialogue lines that received two or more distinct rewrites.
    ///
    /// Lines are keyed by `(character, line_reference)` and reported in the
    /// order they were first mentioned.
    pub fn conflicts(&self) -> Vec<DialogueConflict> {
        let mut index: HashMap<(&str, &str), usize> = HashMap::new();
        let mut groups: Vec<DialogueConflict> = Vec::new();

        for package in &self.packages {
            for df in &package.dialogue_feedback {
                let key = (df.character_name.as_str(), df.line_reference.as_str());
                let slot = *index.entry(key).or_insert_with(|| {
                    groups.push(DialogueConflict {
                        character: df.character_name.clone(),
                        line_reference: df.line_reference.clone(),
                        proposals: Vec::new(),
                    });
                    groups.len() - 1
                });
                groups[slot].proposals.push(DialogueProposal {
                    agent: package.agent_name.clone(),
                    suggestion: df.improved_version.clone(),
                    reasoning: df.reasoning.clone(),
                });
            }
        }

        groups
            .into_iter()
            .filter(|group| {
                let mut distinct: Vec<&str> = group
                    .proposals
                    .iter()
                    .filter_map(|p| p.suggestion.as_deref())
                    .filter(|s| !s.trim().is_empty())
                    .collect();
                distinct.sort_unstable();
                distinct.dedup();
                distinct.len() > 1
            })
            .collect()
    }

    /// Unified revision plan text.
    ///
    /// Layout: score header, blockers, conflicts needing arbitration, then
    /// the remaining items per category (category order of
    /// [`FeedbackType::ALL`]), most severe first, at most
    /// [`MAX_ITEMS_PER_CATEGORY`] each.
    pub fn revision_plan(&self) -> String {
        let mut sections: Vec<String> = vec![
            format!("OVERALL QUALITY SCORE: {:.2}/1.0", self.consensus_score()),
            format!("FEEDBACK FROM {} AGENTS\n", self.packages.len()),
        ];

        let blockers = self.blockers();
        if !blockers.is_empty() {
            sections.push("BLOCKING ISSUES (MUST FIX):".to_string());
            for (agent, item) in blockers {
                sections.push(format!("- [{}] {}", agent, item.description));
            }
        }

        let conflicts = self.conflicts();
        if !conflicts.is_empty() {
            sections.push("\nCONFLICTING FEEDBACK (NEEDS RESOLUTION):".to_string());
            for conflict in &conflicts {
                sections.push(format!("- dialogue: {}", conflict.location()));
                for proposal in &conflict.proposals {
                    sections.push(format!(
                        "  • {}: {}",
                        proposal.agent,
                        proposal.suggestion.as_deref().unwrap_or("(no rewrite)")
                    ));
                }
            }
        }

        for category in FeedbackType::ALL {
            let mut items: Vec<(&str, &FeedbackItem)> = self
                .packages
                .iter()
                .flat_map(|p| {
                    p.items_of(category)
                        .filter(|i| !i.is_blocker())
                        .map(move |i| (p.agent_name.as_str(), i))
                })
                .collect();
            if items.is_empty() {
                continue;
            }
            // Stable: insertion order within a severity
            items.sort_by_key(|(_, item)| item.severity);

            sections.push(format!("\n{} FEEDBACK:", category.as_str().to_uppercase()));
            for (agent, item) in items.into_iter().take(MAX_ITEMS_PER_CATEGORY) {
                sections.push(format!("- [{}] {}", agent, item.description));
            }
        }

        sections.join("\n")
    }
}
