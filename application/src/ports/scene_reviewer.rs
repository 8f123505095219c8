//! Scene reviewer port
//!
//! A reviewer is one role (director, actor, designer, stage manager) that
//! reads a scene and answers with a structured feedback package.

use async_trait::async_trait;
use stagecraft_domain::ComprehensiveFeedback;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReviewError {
    #[error("Reviewer {agent} failed: {message}")]
    Failed { agent: String, message: String },

    #[error("Reviewer {agent} returned an invalid feedback package: {message}")]
    InvalidPackage { agent: String, message: String },
}

#[async_trait]
pub trait SceneReviewer: Send + Sync {
    /// Agent name used as message sender and plan attribution
    fn name(&self) -> &str;

    async fn review(
        &self,
        scene_id: &str,
        content: &str,
    ) -> Result<ComprehensiveFeedback, ReviewError>;
}
