//! Conflict resolution strategies
//!
//! Strategies are pure functions over the unresolved CONFLICT messages of a
//! thread. They are tried in precedence order by the coordinator:
//!
//! 1. [`director_override`]: the most recent conflict posted by a director
//!    is binding.
//! 2. [`majority_vote`]: a position backed by enough conflicting messages
//!    (see [`VoteRule`]) wins.
//!
//! When neither applies the coordinator reports
//! [`ConflictResolution::RequiresCompromise`]; no compromise is invented.

use super::message::{AgentMessage, MessageId};
use super::vote_rule::VoteRule;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role marker identifying a director (matched case-insensitively).
pub const DIRECTOR_ROLE: &str = "director";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    DirectorOverride,
    MajorityVote,
}

impl ResolutionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionMethod::DirectorOverride => "director_override",
            ResolutionMethod::MajorityVote => "majority_vote",
        }
    }
}

impl std::fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Number of conflicting messages backing one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteTally {
    pub position: Value,
    pub votes: usize,
}

/// Outcome of a resolution attempt on a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConflictResolution {
    /// The thread had no unresolved conflicts
    NoConflicts,
    /// A strategy settled the conflicts and a CONSENSUS message was posted
    Resolved {
        method: ResolutionMethod,
        resolution: Value,
        /// Id of the CONSENSUS message appended to the thread
        consensus: MessageId,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        votes: Vec<VoteTally>,
    },
    /// No strategy applied; the listed conflicts need a human decision
    RequiresCompromise { conflicts: Vec<MessageId> },
}

impl ConflictResolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ConflictResolution::Resolved { .. })
    }

    pub fn method(&self) -> Option<ResolutionMethod> {
        match self {
            ConflictResolution::Resolved { method, .. } => Some(*method),
            _ => None,
        }
    }
}

/// Outcome of a successful strategy, before it is posted to the thread.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub method: ResolutionMethod,
    pub resolution: Value,
    /// Message the consensus replies to (director override only)
    pub in_reply_to: Option<MessageId>,
    pub votes: Vec<VoteTally>,
}

/// Whether a sender name identifies a director role.
pub fn is_director(sender: &str) -> bool {
    sender.to_lowercase().contains(DIRECTOR_ROLE)
}

/// The most recent conflict posted by a director is binding.
pub fn director_override(conflicts: &[&AgentMessage]) -> Option<Decision> {
    conflicts
        .iter()
        .rev()
        .find(|m| is_director(m.sender()))
        .map(|m| Decision {
            method: ResolutionMethod::DirectorOverride,
            resolution: m.payload().stance(),
            in_reply_to: Some(m.id()),
            votes: Vec::new(),
        })
}

/// Group conflicting stances by structural equality, in first-seen order.
pub fn tally(conflicts: &[&AgentMessage]) -> Vec<VoteTally> {
    let mut tallies: Vec<VoteTally> = Vec::new();
    for message in conflicts {
        let stance = message.payload().stance();
        match tallies.iter_mut().find(|t| t.position == stance) {
            Some(t) => t.votes += 1,
            None => tallies.push(VoteTally {
                position: stance,
                votes: 1,
            }),
        }
    }
    tallies
}

/// The leading position wins when its support satisfies `rule`.
pub fn majority_vote(conflicts: &[&AgentMessage], rule: VoteRule) -> Option<Decision> {
    let tallies = tally(conflicts);
    let mut leader: Option<&VoteTally> = None;
    for t in &tallies {
        if leader.is_none_or(|l| t.votes > l.votes) {
            leader = Some(t);
        }
    }
    let leader = leader?;
    if !rule.is_satisfied(leader.votes, conflicts.len()) {
        return None;
    }
    Some(Decision {
        method: ResolutionMethod::MajorityVote,
        resolution: leader.position.clone(),
        in_reply_to: None,
        votes: tallies.clone(),
    })
}
