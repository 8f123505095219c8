//! Interaction domain
//!
//! Structured messages between reviewer agents, conversation threads and
//! the conflict-resolution strategies applied to them.

pub mod message;
pub mod participant;
pub mod resolution;
pub mod thread;
pub mod vote_rule;

pub use message::{
    AgentMessage, AgentMessageBuilder, BROADCAST, MessageContext, MessageId, MessageKind,
    MessagePayload, Priority, Recipient,
};
pub use participant::Participant;
pub use resolution::{ConflictResolution, Decision, ResolutionMethod, VoteTally, is_director};
pub use thread::{ConversationThread, ThreadError, ThreadId, ThreadStatus, ThreadSummary};
pub use vote_rule::VoteRule;
