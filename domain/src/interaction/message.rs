//! Agent messages exchanged through the interaction coordinator.

use super::resolution::{ResolutionMethod, VoteTally};
use super::thread::ThreadId;
use crate::feedback::{ComprehensiveFeedback, FeedbackItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Broadcast sentinel used on the wire.
pub const BROADCAST: &str = "all";

/// Unique identifier of a message (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Addressee of a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Recipient {
    /// Every registered agent except the sender
    All,
    Agent(String),
}

impl Recipient {
    pub fn agent(name: impl Into<String>) -> Self {
        Recipient::Agent(name.into())
    }

    pub fn is_broadcast(&self) -> bool {
        matches!(self, Recipient::All)
    }
}

impl From<String> for Recipient {
    fn from(value: String) -> Self {
        if value == BROADCAST {
            Recipient::All
        } else {
            Recipient::Agent(value)
        }
    }
}

impl From<Recipient> for String {
    fn from(value: Recipient) -> Self {
        match value {
            Recipient::All => BROADCAST.to_string(),
            Recipient::Agent(name) => name,
        }
    }
}

impl std::fmt::Display for Recipient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recipient::All => write!(f, "{}", BROADCAST),
            Recipient::Agent(name) => write!(f, "{}", name),
        }
    }
}

/// Kind of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Feedback,
    Suggestion,
    Question,
    Response,
    Directive,
    Approval,
    RevisionRequest,
    Conflict,
    Consensus,
}

impl MessageKind {
    pub const ALL: [MessageKind; 9] = [
        MessageKind::Feedback,
        MessageKind::Suggestion,
        MessageKind::Question,
        MessageKind::Response,
        MessageKind::Directive,
        MessageKind::Approval,
        MessageKind::RevisionRequest,
        MessageKind::Conflict,
        MessageKind::Consensus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Feedback => "feedback",
            MessageKind::Suggestion => "suggestion",
            MessageKind::Question => "question",
            MessageKind::Response => "response",
            MessageKind::Directive => "directive",
            MessageKind::Approval => "approval",
            MessageKind::RevisionRequest => "revision_request",
            MessageKind::Conflict => "conflict",
            MessageKind::Consensus => "consensus",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Urgency of a message; `Critical` sorts first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Must be addressed
    Critical,
    /// Should be addressed
    High,
    /// Consider addressing
    #[default]
    Medium,
    /// Optional to address
    Low,
    /// Informational only
    Info,
}

impl Priority {
    /// 1 (critical) through 5 (info)
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Critical => 1,
            Priority::High => 2,
            Priority::Medium => 3,
            Priority::Low => 4,
            Priority::Info => 5,
        }
    }
}

/// Typed message body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum MessagePayload {
    Text(String),
    /// A stance taken in a disagreement; compared structurally when voting
    Position { position: Value, reasoning: String },
    Critique(FeedbackItem),
    Review(Box<ComprehensiveFeedback>),
    Revision { content: String, reasoning: String },
    Verdict { approved: bool, comments: String },
    Resolution {
        resolution: Value,
        method: ResolutionMethod,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        votes: Vec<VoteTally>,
        /// Conflicts settled by this resolution
        #[serde(default)]
        covers: Vec<MessageId>,
    },
}

impl MessagePayload {
    pub fn text(text: impl Into<String>) -> Self {
        MessagePayload::Text(text.into())
    }

    pub fn position(position: impl Into<Value>, reasoning: impl Into<String>) -> Self {
        MessagePayload::Position {
            position: position.into(),
            reasoning: reasoning.into(),
        }
    }

    /// The declared stance of this payload.
    ///
    /// `Position` payloads yield their position, text yields the string, and
    /// every other payload has no stance (`Null`).
    pub fn stance(&self) -> Value {
        match self {
            MessagePayload::Position { position, .. } => position.clone(),
            MessagePayload::Text(text) => Value::String(text.clone()),
            _ => Value::Null,
        }
    }

    /// Conflicts listed by a resolution payload.
    pub fn covered(&self) -> &[MessageId] {
        match self {
            MessagePayload::Resolution { covers, .. } => covers,
            _ => &[],
        }
    }
}

impl Default for MessagePayload {
    fn default() -> Self {
        MessagePayload::Text(String::new())
    }
}

/// Routing context: an optional thread plus free-form data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<ThreadId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A message between agents.
///
/// Built with [`AgentMessage::builder`]; there are no setters, so a message
/// cannot change after it has been routed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    id: MessageId,
    sender: String,
    recipient: Recipient,
    kind: MessageKind,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    payload: MessagePayload,
    #[serde(default)]
    context: MessageContext,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    in_reply_to: Option<MessageId>,
    #[serde(default)]
    requires_response: bool,
}

impl AgentMessage {
    pub fn builder(sender: impl Into<String>, kind: MessageKind) -> AgentMessageBuilder {
        AgentMessageBuilder::new(sender.into(), kind)
    }

    /// Start a reply addressed to this message's sender, in the same thread.
    pub fn reply(&self, sender: impl Into<String>, kind: MessageKind) -> AgentMessageBuilder {
        let mut builder = AgentMessageBuilder::new(sender.into(), kind)
            .to(self.sender.clone())
            .in_reply_to(self.id);
        if let Some(thread_id) = self.context.thread_id {
            builder = builder.in_thread(thread_id);
        }
        builder
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &Recipient {
        &self.recipient
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn payload(&self) -> &MessagePayload {
        &self.payload
    }

    pub fn context(&self) -> &MessageContext {
        &self.context
    }

    pub fn thread_id(&self) -> Option<ThreadId> {
        self.context.thread_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn in_reply_to(&self) -> Option<MessageId> {
        self.in_reply_to
    }

    pub fn requires_response(&self) -> bool {
        self.requires_response
    }
}

/// Builder for [`AgentMessage`]; broadcast, medium priority and empty text by default.
#[derive(Debug, Clone)]
pub struct AgentMessageBuilder {
    sender: String,
    recipient: Recipient,
    kind: MessageKind,
    priority: Priority,
    payload: MessagePayload,
    context: MessageContext,
    in_reply_to: Option<MessageId>,
    requires_response: bool,
}

impl AgentMessageBuilder {
    fn new(sender: String, kind: MessageKind) -> Self {
        Self {
            sender,
            recipient: Recipient::All,
            kind,
            priority: Priority::default(),
            payload: MessagePayload::default(),
            context: MessageContext::default(),
            in_reply_to: None,
            requires_response: false,
        }
    }

    pub fn to(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Recipient::from(recipient.into());
        self
    }

    pub fn broadcast(mut self) -> Self {
        self.recipient = Recipient::All;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn payload(mut self, payload: MessagePayload) -> Self {
        self.payload = payload;
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.payload(MessagePayload::text(text))
    }

    pub fn in_thread(mut self, thread_id: ThreadId) -> Self {
        self.context.thread_id = Some(thread_id);
        self
    }

    pub fn context_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.extra.insert(key.into(), value.into());
        self
    }

    pub fn in_reply_to(mut self, id: MessageId) -> Self {
        self.in_reply_to = Some(id);
        self
    }

    pub fn requires_response(mut self) -> Self {
        self.requires_response = true;
        self
    }

    pub fn build(self) -> AgentMessage {
        AgentMessage {
            id: MessageId::new(),
            sender: self.sender,
            recipient: self.recipient,
            kind: self.kind,
            priority: self.priority,
            payload: self.payload,
            context: self.context,
            timestamp: Utc::now(),
            in_reply_to: self.in_reply_to,
            requires_response: self.requires_response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_defaults() {
        let message = AgentMessage::builder("Director", MessageKind::Directive)
            .text("Places, please")
            .build();
        assert_eq!(message.sender(), "Director");
        assert!(message.recipient().is_broadcast());
        assert_eq!(message.priority(), Priority::Medium);
        assert_eq!(message.payload(), &MessagePayload::text("Places, please"));
        assert!(message.thread_id().is_none());
        assert!(!message.requires_response());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = AgentMessage::builder("A", MessageKind::Question).build();
        let b = AgentMessage::builder("A", MessageKind::Question).build();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_recipient_wire_format() {
        assert_eq!(serde_json::to_value(Recipient::All).unwrap(), json!("all"));
        assert_eq!(
            serde_json::from_value::<Recipient>(json!("Hamlet Actor")).unwrap(),
            Recipient::agent("Hamlet Actor")
        );
        assert_eq!(
            serde_json::from_value::<Recipient>(json!("all")).unwrap(),
            Recipient::All
        );
    }

    #[test]
    fn test_priority_orders_critical_first() {
        let mut priorities = vec![Priority::Info, Priority::Critical, Priority::Medium, Priority::High];
        priorities.sort();
        assert_eq!(
            priorities,
            vec![Priority::Critical, Priority::High, Priority::Medium, Priority::Info]
        );
        assert_eq!(Priority::Critical.rank(), 1);
        assert_eq!(Priority::Info.rank(), 5);
    }

    #[test]
    fn test_reply_targets_sender_in_same_thread() {
        let thread_id = ThreadId::new();
        let question = AgentMessage::builder("Director", MessageKind::Question)
            .to("Designer")
            .in_thread(thread_id)
            .requires_response()
            .build();
        let answer = question.reply("Designer", MessageKind::Response).build();

        assert_eq!(answer.recipient(), &Recipient::agent("Director"));
        assert_eq!(answer.in_reply_to(), Some(question.id()));
        assert_eq!(answer.thread_id(), Some(thread_id));
    }

    #[test]
    fn test_message_json_shape() {
        let message = AgentMessage::builder("Hamlet Actor", MessageKind::Conflict)
            .payload(MessagePayload::position(json!({"tempo": "slow"}), "grief needs room"))
            .context_value("scene", "1.2")
            .build();
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["recipient"], json!("all"));
        assert_eq!(value["kind"], json!("conflict"));
        assert_eq!(value["payload"]["type"], json!("position"));
        assert_eq!(value["payload"]["data"]["position"], json!({"tempo": "slow"}));
        assert_eq!(value["context"]["scene"], json!("1.2"));

        let back: AgentMessage = serde_json::from_value(value).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_stance() {
        assert_eq!(MessagePayload::position(json!(3), "").stance(), json!(3));
        assert_eq!(MessagePayload::text("cut it").stance(), json!("cut it"));
        assert_eq!(
            MessagePayload::Verdict {
                approved: true,
                comments: String::new()
            }
            .stance(),
            Value::Null
        );
    }
}
