//! Interaction coordinator
//!
//! Routes [`AgentMessage`]s between registered [`Participant`]s, keeps the
//! conversation threads they belong to and settles the conflicts raised in
//! them.

use stagecraft_domain::interaction::resolution::{director_override, majority_vote};
use stagecraft_domain::{
    AgentMessage, ConflictResolution, ConversationThread, MessageKind, MessagePayload,
    Participant, Recipient, ThreadError, ThreadId, ThreadSummary, VoteRule,
};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Sender name used for coordinator-authored messages.
pub const SYSTEM_SENDER: &str = "System";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinatorError {
    #[error("Thread not found: {0}")]
    ThreadNotFound(ThreadId),

    #[error(transparent)]
    Thread(#[from] ThreadError),
}

/// Message router and thread keeper for a set of agents
///
/// Synchronous and single-writer: every operation takes `&mut self`, and
/// agents are called one at a time in registration order.
pub struct InteractionCoordinator {
    agents: Vec<(String, Box<dyn Participant>)>,
    threads: HashMap<ThreadId, ConversationThread>,
    history: Vec<AgentMessage>,
    vote_rule: VoteRule,
}

impl Default for InteractionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionCoordinator {
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
            threads: HashMap::new(),
            history: Vec::new(),
            vote_rule: VoteRule::default(),
        }
    }

    pub fn with_vote_rule(mut self, rule: VoteRule) -> Self {
        self.vote_rule = rule;
        self
    }

    pub fn vote_rule(&self) -> VoteRule {
        self.vote_rule
    }

    /// Register an agent under `name`.
    ///
    /// Re-registering a name replaces the agent but keeps its delivery slot.
    pub fn register(&mut self, name: impl Into<String>, agent: Box<dyn Participant>) {
        let name = name.into();
        match self.agents.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => {
                debug!("Replacing agent '{}'", name);
                slot.1 = agent;
            }
            None => {
                debug!("Registering agent '{}'", name);
                self.agents.push((name, agent));
            }
        }
    }

    /// Registered agent names in delivery order.
    pub fn agent_names(&self) -> Vec<&str> {
        self.agents.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Open a thread and notify the registered agents among `participants`.
    pub fn create_thread(
        &mut self,
        topic: impl Into<String>,
        participants: impl IntoIterator<Item = String>,
    ) -> ThreadId {
        let thread = ConversationThread::new(topic, participants);
        for (name, agent) in self.agents.iter_mut() {
            if thread.participants().contains(&*name) {
                agent.join(&thread);
            }
        }
        let id = thread.id();
        info!("Opened thread {} ({})", id, thread.topic());
        self.threads.insert(id, thread);
        id
    }

    pub fn thread(&self, id: ThreadId) -> Option<&ConversationThread> {
        self.threads.get(&id)
    }

    /// Every routed message, in routing order.
    pub fn history(&self) -> &[AgentMessage] {
        &self.history
    }

    /// Record and deliver a message, returning the agents' responses.
    ///
    /// The message is appended to its thread when it names a known one.
    /// Responses are returned to the caller, not routed further.
    pub fn route(&mut self, message: AgentMessage) -> Vec<AgentMessage> {
        debug!(
            "Routing {} from '{}' to {}",
            message.kind(),
            message.sender(),
            message.recipient()
        );
        self.history.push(message.clone());
        if let Some(thread_id) = message.thread_id() {
            match self.threads.get_mut(&thread_id) {
                Some(thread) => thread.add_message(message.clone()),
                None => warn!("Message names unknown thread {}", thread_id),
            }
        }

        let mut responses = Vec::new();
        match message.recipient() {
            Recipient::All => {
                for (name, agent) in self.agents.iter_mut() {
                    if name.as_str() == message.sender() {
                        continue;
                    }
                    responses.extend(agent.receive(&message));
                }
            }
            Recipient::Agent(target) => {
                match self.agents.iter_mut().find(|(n, _)| n == target) {
                    Some((_, agent)) => responses.extend(agent.receive(&message)),
                    None => warn!("No agent named '{}' is registered", target),
                }
            }
        }
        responses
    }

    /// Settle the unresolved conflicts of a thread.
    ///
    /// A director's most recent conflict is binding; otherwise the leading
    /// position wins when it satisfies the vote rule. A successful strategy
    /// posts a CONSENSUS message covering every open conflict and marks the
    /// thread resolved.
    pub fn resolve(&mut self, thread_id: ThreadId) -> Result<ConflictResolution, CoordinatorError> {
        let vote_rule = self.vote_rule;
        let thread = self
            .threads
            .get_mut(&thread_id)
            .ok_or(CoordinatorError::ThreadNotFound(thread_id))?;

        let conflicts = thread.unresolved_conflicts();
        if conflicts.is_empty() {
            debug!("Thread {} has no conflicts to resolve", thread_id);
            return Ok(ConflictResolution::NoConflicts);
        }
        let covers: Vec<_> = conflicts.iter().map(|m| m.id()).collect();

        let decision = director_override(&conflicts).or_else(|| majority_vote(&conflicts, vote_rule));
        let Some(decision) = decision else {
            info!(
                "Thread {}: {} conflict(s) need a compromise",
                thread_id,
                covers.len()
            );
            return Ok(ConflictResolution::RequiresCompromise { conflicts: covers });
        };

        let mut builder = AgentMessage::builder(SYSTEM_SENDER, MessageKind::Consensus)
            .broadcast()
            .in_thread(thread_id)
            .payload(MessagePayload::Resolution {
                resolution: decision.resolution.clone(),
                method: decision.method,
                votes: decision.votes.clone(),
                covers,
            });
        if let Some(reply_to) = decision.in_reply_to {
            builder = builder.in_reply_to(reply_to);
        }
        let consensus = builder.build();

        let resolution = ConflictResolution::Resolved {
            method: decision.method,
            resolution: decision.resolution,
            consensus: consensus.id(),
            votes: decision.votes,
        };
        thread.mark_resolved(resolution.clone())?;
        thread.add_message(consensus.clone());
        self.history.push(consensus);

        info!("Thread {} resolved by {}", thread_id, decision.method);
        Ok(resolution)
    }

    /// Park a thread; deferred threads cannot be resolved.
    pub fn defer(&mut self, thread_id: ThreadId) -> Result<(), CoordinatorError> {
        let thread = self
            .threads
            .get_mut(&thread_id)
            .ok_or(CoordinatorError::ThreadNotFound(thread_id))?;
        thread.defer()?;
        info!("Thread {} deferred", thread_id);
        Ok(())
    }

    pub fn thread_summary(&self, thread_id: ThreadId) -> Result<ThreadSummary, CoordinatorError> {
        self.threads
            .get(&thread_id)
            .map(ConversationThread::summary)
            .ok_or(CoordinatorError::ThreadNotFound(thread_id))
    }

    /// FEEDBACK messages of a thread, most urgent first.
    ///
    /// Messages of equal priority keep their insertion order.
    pub fn prioritized_feedback(
        &self,
        thread_id: ThreadId,
    ) -> Result<Vec<&AgentMessage>, CoordinatorError> {
        let thread = self
            .threads
            .get(&thread_id)
            .ok_or(CoordinatorError::ThreadNotFound(thread_id))?;
        let mut feedback: Vec<&AgentMessage> = thread.messages_of(MessageKind::Feedback).collect();
        feedback.sort_by_key(|m| m.priority().rank());
        Ok(feedback)
    }
}
