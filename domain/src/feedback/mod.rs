//! Feedback domain
//!
//! Typed critique packages produced by reviewer roles, and the aggregate that
//! merges several packages for one scene into a single revision plan.

pub mod aggregate;
pub mod schema;

pub use aggregate::{DialogueConflict, DialogueProposal, FeedbackAggregate, MAX_ITEMS_PER_CATEGORY};
pub use schema::{
    AtmosphereFeedback, CharacterFeedback, ComprehensiveFeedback, DialogueFeedback, FeedbackItem,
    FeedbackType, PacingFeedback, Severity, StructuralFeedback, TechnicalFeedback, UnitScore,
};
