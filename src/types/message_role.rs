use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a message stored in session history.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

/// Role of a message on the wire.
///
/// `System` only ever appears in requests sent to the completion endpoint;
/// it is never stored in session history.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    /// System role.
    System,

    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

impl From<MessageRole> for WireRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => WireRole::User,
            MessageRole::Assistant => WireRole::Assistant,
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization() {
        assert_eq!(serde_json::to_string(&MessageRole::User).unwrap(), r#""user""#);
        assert_eq!(serde_json::to_string(&WireRole::System).unwrap(), r#""system""#);
    }

    #[test]
    fn stored_roles_map_onto_wire_roles() {
        assert_eq!(WireRole::from(MessageRole::User), WireRole::User);
        assert_eq!(WireRole::from(MessageRole::Assistant), WireRole::Assistant);
    }
}
