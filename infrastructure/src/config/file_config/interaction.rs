//! Interaction configuration from TOML (`[interaction]` section)

use serde::{Deserialize, Serialize};
use stagecraft_domain::{ConfigIssue, ConfigIssueCode, VoteRule};

/// Raw interaction configuration from TOML
///
/// ```toml
/// [interaction]
/// vote_rule = "majority"    # or "unanimous", "share:60", "75%"
/// resolve_conflicts = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileInteractionConfig {
    /// Rule a position must satisfy to win a vote
    pub vote_rule: String,
    /// Put conflicting dialogue rewrites to a vote after review
    pub resolve_conflicts: bool,
}

impl Default for FileInteractionConfig {
    fn default() -> Self {
        Self {
            vote_rule: "majority".to_string(),
            resolve_conflicts: true,
        }
    }
}

impl FileInteractionConfig {
    pub fn parse_vote_rule(&self) -> (VoteRule, Vec<ConfigIssue>) {
        match self.vote_rule.parse() {
            Ok(rule) => (rule, Vec::new()),
            Err(message) => (
                VoteRule::default(),
                vec![ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "interaction.vote_rule".to_string(),
                        value: self.vote_rule.clone(),
                        valid_values: vec![
                            "majority".to_string(),
                            "unanimous".to_string(),
                            "share:N".to_string(),
                            "N%".to_string(),
                        ],
                    },
                    format!("{message}, falling back to 'majority'"),
                )],
            ),
        }
    }
}
