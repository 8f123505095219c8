//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod expansion;
mod generator;
mod interaction;
mod output;
mod refinement;
mod scene;

pub use expansion::FileExpansionConfig;
pub use generator::FileGeneratorConfig;
pub use interaction::FileInteractionConfig;
pub use output::FileOutputConfig;
pub use refinement::FileRefinementConfig;
pub use scene::FileSceneConfig;

use serde::{Deserialize, Serialize};
use stagecraft_domain::ConfigIssue;
use thiserror::Error;

/// Configuration that cannot be used at all
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Refinement loop settings
    pub refinement: FileRefinementConfig,
    /// Expansion stage settings
    pub expansion: FileExpansionConfig,
    /// Default scene requirements
    pub scene: FileSceneConfig,
    /// Conflict resolution settings
    pub interaction: FileInteractionConfig,
    /// Content generator endpoint
    pub generator: FileGeneratorConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Numeric ranges (thresholds, iterations, length bounds, timeout)
    /// 2. Enum parse failures (revision_policy, extraction_fallback, vote_rule)
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Range validation
        issues.extend(self.refinement.validate());
        issues.extend(self.scene.validate());
        issues.extend(self.generator.validate());

        // 2. Enum parse validation
        issues.extend(self.refinement.parse_revision_policy().1);
        issues.extend(self.refinement.parse_extraction_fallback().1);
        issues.extend(self.interaction.parse_vote_rule().1);

        issues
    }

    /// Validate and fail on errors, returning the remaining warnings.
    pub fn ensure_valid(&self) -> Result<Vec<ConfigIssue>, ConfigValidationError> {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            self.validate().into_iter().partition(ConfigIssue::is_error);
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigValidationError::Invalid(
                errors.into_iter().map(|i| i.message).collect(),
            ))
        }
    }
}
