//! Scene requirements from TOML (`[scene]` section)
//!
//! ```toml
//! [scene]
//! min_length = 3000
//! max_length = 10000
//!
//! [scene.extra]
//! characters = ["HAMLET", "HORATIO"]
//! style = "gothic"
//! props = ["lantern"]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stagecraft_domain::refinement::requirements::{DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH};
use stagecraft_domain::{ConfigIssue, ConfigIssueCode, SceneRequirements};

/// Raw scene configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSceneConfig {
    pub min_length: usize,
    pub max_length: usize,
    /// Evaluator fields (characters, style, period, props, lighting, sound)
    pub extra: Map<String, Value>,
}

impl Default for FileSceneConfig {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
            extra: Map::new(),
        }
    }
}

impl FileSceneConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        if self.min_length > self.max_length {
            vec![ConfigIssue::error(
                ConfigIssueCode::LengthBoundsInverted,
                format!(
                    "scene.min_length ({}) exceeds scene.max_length ({})",
                    self.min_length, self.max_length
                ),
            )]
        } else {
            Vec::new()
        }
    }

    /// Requirements for one scene, seeded from this section.
    pub fn to_requirements(&self, scene_id: impl Into<String>) -> SceneRequirements {
        let mut requirements = SceneRequirements::new()
            .with_scene_id(scene_id)
            .with_length_bounds(self.min_length, self.max_length);
        requirements.extra = self.extra.clone();
        requirements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_requirements_carries_extra() {
        let toml_str = r#"
[scene]
min_length = 100
max_length = 500

[scene.extra]
characters = ["HAMLET"]
style = "gothic"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let requirements = config.scene.to_requirements("act1");
        assert_eq!(requirements.scene_label(), "act1");
        assert_eq!(requirements.min_length, 100);
        assert_eq!(requirements.extra_list("characters"), vec!["HAMLET"]);
        assert_eq!(requirements.extra_str("style"), "gothic");
    }
}
