//! Scene requirements passed through to evaluators.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default lower bound on scene length (characters).
pub const DEFAULT_MIN_LENGTH: usize = 3000;
/// Default upper bound on scene length (characters).
pub const DEFAULT_MAX_LENGTH: usize = 10000;

/// Requirements for one scene.
///
/// The refinement loop only reads the length bounds; everything else is
/// carried in `extra` for the evaluator to interpret (characters, style,
/// props and so on).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneRequirements {
    /// Identifier used in logs and feedback packages
    pub scene_id: Option<String>,
    /// Minimum target length in characters
    pub min_length: usize,
    /// Maximum target length in characters
    pub max_length: usize,
    /// Evaluator-specific fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SceneRequirements {
    fn default() -> Self {
        Self {
            scene_id: None,
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
            extra: Map::new(),
        }
    }
}

impl SceneRequirements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scene_id(mut self, id: impl Into<String>) -> Self {
        self.scene_id = Some(id.into());
        self
    }

    pub fn with_length_bounds(mut self, min_length: usize, max_length: usize) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    /// Attach an evaluator-specific field.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Scene identifier, or `"scene"` when none was given.
    pub fn scene_label(&self) -> &str {
        self.scene_id.as_deref().unwrap_or("scene")
    }

    /// String field from `extra` (empty when absent or not a string).
    pub fn extra_str(&self, key: &str) -> &str {
        self.extra.get(key).and_then(Value::as_str).unwrap_or("")
    }

    /// List-of-strings field from `extra`; non-string entries are skipped.
    pub fn extra_list(&self, key: &str) -> Vec<&str> {
        self.extra
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}
