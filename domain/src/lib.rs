//! Domain layer for stagecraft
//!
//! This crate contains the value objects and pure logic of scene refinement
//! and reviewer interaction. It performs no I/O and has no dependencies on
//! infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Refinement
//!
//! A scene is scored by an evaluator on several named dimensions
//! ([`QualityVector`]) and revised round by round. Each round leaves an
//! immutable [`IterationRecord`]; the loop ends in a [`RefinementResult`].
//!
//! ## Feedback
//!
//! Reviewer roles (director, actors, designer, stage manager) submit typed
//! [`ComprehensiveFeedback`] packages that a [`FeedbackAggregate`] merges
//! into one revision plan.
//!
//! ## Interaction
//!
//! Reviewers exchange [`AgentMessage`]s in [`ConversationThread`]s; conflicts
//! are settled by director override or vote.

pub mod config;
pub mod core;
pub mod feedback;
pub mod interaction;
pub mod prompt;
pub mod refinement;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, IssueSeverity, OutputFormat};
pub use core::error::DomainError;
pub use feedback::{
    ComprehensiveFeedback, DialogueConflict, DialogueFeedback, FeedbackAggregate, FeedbackItem,
    FeedbackType, Severity,
};
pub use interaction::{
    AgentMessage, ConflictResolution, ConversationThread, MessageId, MessageKind, MessagePayload,
    Participant, Priority, Recipient, ResolutionMethod, ThreadError, ThreadId, ThreadStatus,
    ThreadSummary, VoteRule,
};
pub use prompt::{RefinementPromptTemplate, RevisionPrompt};
pub use refinement::{
    ExpansionOutcome, ExpansionRejection, ExpansionResult, ExpansionValidator, ExtractionFallback,
    IterationRecord, QualityVector, RefinementResult, RevisionPolicy, SceneRequirements,
    SectionMarkers, SectionParseError, StopReason,
};
