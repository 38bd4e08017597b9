use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

use crate::hint;
use crate::types::{MessageRole, WireMessage};

/// Opaque identifier of a message within one chat session.
///
/// Ids are handed out by the session from a counter that is never rewound,
/// so an id is never reused, not even after the history is cleared.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    /// Wraps a raw counter value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw counter value.
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg_{}", self.0)
    }
}

/// A message held in session history.
///
/// User messages store the text exactly as it was sent, hint block included.
/// Assistant messages store the completion text verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Stable identifier assigned by the session.
    pub id: MessageId,

    /// Who authored the message.
    pub role: MessageRole,

    /// Raw stored text.
    pub content: String,

    /// Creation instant.
    #[serde(with = "crate::utils::time")]
    pub timestamp: OffsetDateTime,
}

impl ChatMessage {
    /// Creates a message stamped with the current time.
    pub fn new(id: MessageId, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// Creates a user message.
    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self::new(id, MessageRole::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(id: MessageId, content: impl Into<String>) -> Self {
        Self::new(id, MessageRole::Assistant, content)
    }

    /// Returns true if the user authored this message.
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    /// Returns true if the assistant authored this message.
    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }

    /// Text to show for this message, with any hint block removed.
    pub fn display_text(&self) -> &str {
        match self.role {
            MessageRole::User => hint::decode(&self.content),
            MessageRole::Assistant => &self.content,
        }
    }

    /// Sort key: creation time first, id second.
    pub fn sort_key(&self) -> (OffsetDateTime, MessageId) {
        (self.timestamp, self.id)
    }

    /// Reduces the message to its `{role, content}` wire form.
    pub fn to_wire(&self) -> WireMessage {
        WireMessage::new(self.role.into(), self.content.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Intent, Language, WireRole};
    use serde_json::{json, to_value};
    use time::macros::datetime;

    #[test]
    fn id_display() {
        assert_eq!(MessageId::new(7).to_string(), "msg_7");
        assert_eq!(MessageId::new(7).get(), 7);
    }

    #[test]
    fn serialization() {
        let mut message = ChatMessage::assistant(MessageId::new(3), "Hello!");
        message.timestamp = datetime!(2024-05-01 09:30:00 UTC);
        assert_eq!(
            to_value(&message).unwrap(),
            json!({
                "id": 3,
                "role": "assistant",
                "content": "Hello!",
                "timestamp": "2024-05-01T09:30:00Z"
            })
        );
    }

    #[test]
    fn user_display_text_strips_hint() {
        let wire = hint::encode("  Show me your resume ", Intent::Work, Language::English);
        let message = ChatMessage::user(MessageId::new(1), wire.clone());
        assert_eq!(message.content, wire);
        assert_eq!(message.display_text(), "Show me your resume");
    }

    #[test]
    fn assistant_display_text_is_verbatim() {
        let message = ChatMessage::assistant(MessageId::new(2), "[[PORTFOLIO_HINT]] literal");
        assert_eq!(message.display_text(), "[[PORTFOLIO_HINT]] literal");
    }

    #[test]
    fn wire_form_drops_id_and_timestamp() {
        let message = ChatMessage::user(MessageId::new(9), "hola");
        let wire = message.to_wire();
        assert_eq!(wire.role, WireRole::User);
        assert_eq!(wire.content, "hola");
        assert_eq!(to_value(&wire).unwrap(), json!({"role": "user", "content": "hola"}));
    }

    #[test]
    fn sort_key_breaks_ties_by_id() {
        let at = datetime!(2024-05-01 09:30:00 UTC);
        let mut first = ChatMessage::user(MessageId::new(1), "a");
        let mut second = ChatMessage::assistant(MessageId::new(2), "b");
        first.timestamp = at;
        second.timestamp = at;
        assert!(first.sort_key() < second.sort_key());
    }
}
