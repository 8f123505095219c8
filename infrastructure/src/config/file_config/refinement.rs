//! Refinement loop configuration from TOML (`[refinement]` section)
//!
//! ```toml
//! [refinement]
//! max_iterations = 5
//! quality_threshold = 0.85
//! improvement_threshold = 0.02
//! focus_area_count = 3
//! revision_policy = "greedy"          # or "best_of"
//! extraction_fallback = "skip_round"  # or "whole_response"
//! ```

use serde::{Deserialize, Serialize};
use stagecraft_application::RefinementParams;
use stagecraft_domain::{ConfigIssue, ConfigIssueCode, ExtractionFallback, RevisionPolicy};

/// Raw refinement configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRefinementConfig {
    pub max_iterations: usize,
    pub quality_threshold: f64,
    pub improvement_threshold: f64,
    pub focus_area_count: usize,
    /// "greedy" or "best_of"
    pub revision_policy: String,
    /// "skip_round" or "whole_response"
    pub extraction_fallback: String,
}

impl Default for FileRefinementConfig {
    fn default() -> Self {
        let params = RefinementParams::default();
        Self {
            max_iterations: params.max_iterations,
            quality_threshold: params.quality_threshold,
            improvement_threshold: params.improvement_threshold,
            focus_area_count: params.focus_area_count,
            revision_policy: params.revision_policy.as_str().to_string(),
            extraction_fallback: "skip_round".to_string(),
        }
    }
}

impl FileRefinementConfig {
    /// Range checks for the numeric fields.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.max_iterations == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroIterations,
                "refinement.max_iterations must be at least 1",
            ));
        }

        for (field, value) in [
            ("refinement.quality_threshold", self.quality_threshold),
            ("refinement.improvement_threshold", self.improvement_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ThresholdOutOfRange {
                        field: field.to_string(),
                    },
                    format!("{field}: {value} is outside [0, 1]"),
                ));
            }
        }

        issues
    }

    pub fn parse_revision_policy(&self) -> (RevisionPolicy, Vec<ConfigIssue>) {
        match self.revision_policy.parse() {
            Ok(policy) => (policy, Vec::new()),
            Err(message) => (
                RevisionPolicy::default(),
                vec![ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "refinement.revision_policy".to_string(),
                        value: self.revision_policy.clone(),
                        valid_values: vec!["greedy".to_string(), "best_of".to_string()],
                    },
                    format!("{message}, falling back to 'greedy'"),
                )],
            ),
        }
    }

    pub fn parse_extraction_fallback(&self) -> (ExtractionFallback, Vec<ConfigIssue>) {
        match self.extraction_fallback.parse() {
            Ok(fallback) => (fallback, Vec::new()),
            Err(message) => (
                ExtractionFallback::default(),
                vec![ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "refinement.extraction_fallback".to_string(),
                        value: self.extraction_fallback.clone(),
                        valid_values: vec!["skip_round".to_string(), "whole_response".to_string()],
                    },
                    format!("{message}, falling back to 'skip_round'"),
                )],
            ),
        }
    }

    /// Convert to application parameters, collecting parse issues.
    pub fn to_params(&self) -> (RefinementParams, Vec<ConfigIssue>) {
        let (policy, mut issues) = self.parse_revision_policy();
        let (fallback, fallback_issues) = self.parse_extraction_fallback();
        issues.extend(fallback_issues);

        let params = RefinementParams::default()
            .with_max_iterations(self.max_iterations)
            .with_quality_threshold(self.quality_threshold)
            .with_improvement_threshold(self.improvement_threshold)
            .with_focus_area_count(self.focus_area_count)
            .with_revision_policy(policy)
            .with_extraction_fallback(fallback);
        (params, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_params() {
        let (params, issues) = FileRefinementConfig::default().to_params();
        assert_eq!(params, RefinementParams::default());
        assert!(issues.is_empty());
    }

    #[test]
    fn test_to_params() {
        let toml_str = r#"
[refinement]
max_iterations = 2
focus_area_count = 1
revision_policy = "best-of"
extraction_fallback = "whole"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let (params, issues) = config.refinement.to_params();
        assert!(issues.is_empty());
        assert_eq!(params.max_iterations, 2);
        assert_eq!(params.focus_area_count, 1);
        assert_eq!(params.revision_policy, RevisionPolicy::BestOf);
        assert_eq!(params.extraction_fallback, ExtractionFallback::WholeResponse);
    }

    #[test]
    fn test_unknown_policy_falls_back() {
        let config = FileRefinementConfig {
            revision_policy: "random".to_string(),
            ..Default::default()
        };
        let (policy, issues) = config.parse_revision_policy();
        assert_eq!(policy, RevisionPolicy::Greedy);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("falling back"));
    }

    #[test]
    fn test_negative_improvement_threshold_rejected() {
        let config = FileRefinementConfig {
            improvement_threshold: -0.1,
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
    }
}
