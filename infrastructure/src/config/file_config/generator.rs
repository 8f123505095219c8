//! Content generator configuration from TOML (`[generator]` section)
//!
//! Any OpenAI-compatible chat-completions endpoint works:
//!
//! ```toml
//! [generator]
//! base_url = "https://api.openai.com/v1"
//! model = "gpt-4o-mini"
//! api_key_env = "OPENAI_API_KEY"
//! temperature = 0.7
//! timeout_secs = 120
//! ```

use serde::{Deserialize, Serialize};
use stagecraft_domain::{ConfigIssue, ConfigIssueCode};

/// Raw generator configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGeneratorConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
}

impl Default for FileGeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.7,
            max_tokens: None,
            timeout_secs: 120,
        }
    }
}

impl FileGeneratorConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "generator.timeout_secs cannot be 0",
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidTemperature,
                format!("generator.temperature: {} is outside [0, 2]", self.temperature),
            ));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ranges() {
        assert!(FileGeneratorConfig::default().validate().is_empty());

        let config = FileGeneratorConfig {
            timeout_secs: 0,
            temperature: 3.0,
            ..Default::default()
        };
        let codes: Vec<_> = config.validate().into_iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![ConfigIssueCode::ZeroTimeout, ConfigIssueCode::InvalidTemperature]
        );
    }
}
