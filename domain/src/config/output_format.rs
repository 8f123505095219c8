//! Output format value object

use serde::{Deserialize, Serialize};

/// How refinement results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Content plus scores, iteration table and stop reason
    Full,
    /// Only the final scene text (default)
    #[default]
    Content,
    /// JSON output
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(OutputFormat::Full),
            "content" => Ok(OutputFormat::Content),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}. Valid: full, content, json", s)),
        }
    }
}
