//! Expansion configuration from TOML (`[expansion]` section)

use serde::{Deserialize, Serialize};
use stagecraft_application::ExpansionParams;

/// Raw expansion configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExpansionConfig {
    /// Length (bytes) an expanded scene must reach
    pub target_length: usize,
}

impl Default for FileExpansionConfig {
    fn default() -> Self {
        Self {
            target_length: ExpansionParams::default().target_length,
        }
    }
}

impl FileExpansionConfig {
    pub fn to_params(&self) -> ExpansionParams {
        ExpansionParams::default().with_target_length(self.target_length)
    }
}
