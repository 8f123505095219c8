//! Conversation threads - ordered message logs with a small state machine.

use super::message::{AgentMessage, MessageId, MessageKind};
use super::resolution::ConflictResolution;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier of a thread (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(Uuid);

impl ThreadId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ThreadId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ThreadId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle of a thread.
///
/// ```text
/// active ──resolve──▶ resolved
///    │
///    └──defer──▶ deferred
/// ```
///
/// Neither terminal state can return to `active`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    #[default]
    Active,
    Resolved,
    Deferred,
}

impl ThreadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadStatus::Active => "active",
            ThreadStatus::Resolved => "resolved",
            ThreadStatus::Deferred => "deferred",
        }
    }
}

impl std::fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThreadError {
    #[error("Cannot move thread from {from} to {to}")]
    InvalidTransition { from: ThreadStatus, to: ThreadStatus },
}

/// Point-in-time overview of a thread.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadSummary {
    pub id: ThreadId,
    pub topic: String,
    pub participants: Vec<String>,
    pub message_count: usize,
    pub status: ThreadStatus,
    /// Count per kind, including kinds with no messages
    pub messages_by_kind: BTreeMap<MessageKind, usize>,
    pub unresolved_conflicts: usize,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution: Option<ConflictResolution>,
}

/// An append-only log of related messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationThread {
    id: ThreadId,
    topic: String,
    participants: Vec<String>,
    messages: Vec<AgentMessage>,
    status: ThreadStatus,
    created_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
    resolution: Option<ConflictResolution>,
}

impl ConversationThread {
    pub fn new(topic: impl Into<String>, participants: impl IntoIterator<Item = String>) -> Self {
        let mut thread = Self {
            id: ThreadId::new(),
            topic: topic.into(),
            participants: Vec::new(),
            messages: Vec::new(),
            status: ThreadStatus::Active,
            created_at: Utc::now(),
            resolved_at: None,
            resolution: None,
        };
        for name in participants {
            thread.add_participant(name);
        }
        thread
    }

    pub fn id(&self) -> ThreadId {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Participant names in the order they joined.
    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn messages(&self) -> &[AgentMessage] {
        &self.messages
    }

    pub fn status(&self) -> ThreadStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    pub fn resolution(&self) -> Option<&ConflictResolution> {
        self.resolution.as_ref()
    }

    pub fn summary(&self) -> ThreadSummary {
        let mut messages_by_kind: BTreeMap<MessageKind, usize> =
            MessageKind::ALL.iter().map(|k| (*k, 0)).collect();
        for message in &self.messages {
            *messages_by_kind.entry(message.kind()).or_default() += 1;
        }
        ThreadSummary {
            id: self.id,
            topic: self.topic.clone(),
            participants: self.participants.clone(),
            message_count: self.messages.len(),
            status: self.status,
            messages_by_kind,
            unresolved_conflicts: self.unresolved_conflicts().len(),
            created_at: self.created_at,
            resolved_at: self.resolved_at,
            resolution: self.resolution.clone(),
        }
    }

    pub fn add_participant(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.participants.contains(&name) {
            self.participants.push(name);
        }
    }

    /// Append a message; its sender becomes a participant.
    pub fn add_message(&mut self, message: AgentMessage) {
        self.add_participant(message.sender());
        self.messages.push(message);
    }

    pub fn messages_of(&self, kind: MessageKind) -> impl Iterator<Item = &AgentMessage> {
        self.messages.iter().filter(move |m| m.kind() == kind)
    }

    /// CONFLICT messages not yet answered or covered by a CONSENSUS.
    pub fn unresolved_conflicts(&self) -> Vec<&AgentMessage> {
        let mut settled: HashSet<MessageId> = HashSet::new();
        for consensus in self.messages_of(MessageKind::Consensus) {
            settled.extend(consensus.in_reply_to());
            settled.extend(consensus.payload().covered().iter().copied());
        }
        self.messages_of(MessageKind::Conflict)
            .filter(|c| !settled.contains(&c.id()))
            .collect()
    }

    /// Record a successful resolution.
    ///
    /// Allowed from `active`, and again from `resolved` when later conflicts
    /// are settled. A deferred thread stays deferred.
    pub fn mark_resolved(&mut self, resolution: ConflictResolution) -> Result<(), ThreadError> {
        if self.status == ThreadStatus::Deferred {
            return Err(ThreadError::InvalidTransition {
                from: self.status,
                to: ThreadStatus::Resolved,
            });
        }
        self.status = ThreadStatus::Resolved;
        self.resolved_at = Some(Utc::now());
        self.resolution = Some(resolution);
        Ok(())
    }

    pub fn defer(&mut self) -> Result<(), ThreadError> {
        if self.status != ThreadStatus::Active {
            return Err(ThreadError::InvalidTransition {
                from: self.status,
                to: ThreadStatus::Deferred,
            });
        }
        self.status = ThreadStatus::Deferred;
        Ok(())
    }
}
