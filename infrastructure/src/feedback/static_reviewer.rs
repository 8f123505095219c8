//! Reviewer that replays a stored feedback package

use async_trait::async_trait;
use stagecraft_application::{ReviewError, SceneReviewer};
use stagecraft_domain::ComprehensiveFeedback;
use tracing::warn;

/// A reviewer whose answer was written ahead of time
///
/// The package is returned for any scene; a mismatched `scene_id` is logged
/// and rewritten to the scene under review.
#[derive(Debug, Clone)]
pub struct StaticReviewer {
    package: ComprehensiveFeedback,
}

impl StaticReviewer {
    pub fn new(package: ComprehensiveFeedback) -> Self {
        Self { package }
    }
}

#[async_trait]
impl SceneReviewer for StaticReviewer {
    fn name(&self) -> &str {
        &self.package.agent_name
    }

    async fn review(
        &self,
        scene_id: &str,
        _content: &str,
    ) -> Result<ComprehensiveFeedback, ReviewError> {
        let mut package = self.package.clone();
        if package.scene_id != scene_id {
            warn!(
                "Package from {} targets scene '{}', applying it to '{}'",
                package.agent_name, package.scene_id, scene_id
            );
            package.scene_id = scene_id.to_string();
        }
        Ok(package)
    }
}
