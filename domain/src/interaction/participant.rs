//! Participant trait - the delivery seam between the coordinator and agents.

use super::message::AgentMessage;
use super::thread::ConversationThread;

/// An agent that can take part in coordinated conversations.
///
/// Implementations are called synchronously by the coordinator, one at a
/// time, in registration order.
pub trait Participant: Send {
    /// Handle a delivered message, optionally answering it.
    fn receive(&mut self, message: &AgentMessage) -> Option<AgentMessage>;

    /// Called when the participant is added to a new thread.
    fn join(&mut self, _thread: &ConversationThread) {}
}
