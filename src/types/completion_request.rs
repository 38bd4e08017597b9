use serde::{Deserialize, Serialize};

use crate::types::WireMessage;

/// Body of a request to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System entry, prior history, and the new user message, in order.
    pub messages: Vec<WireMessage>,

    /// Optional display name of the visitor.
    #[serde(rename = "userName", skip_serializing_if = "Option::is_none", default)]
    pub user_name: Option<String>,

    /// Model identifier.
    pub model: String,

    /// Token budget for the reply.
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a new `CompletionRequest`.
    pub fn new(messages: Vec<WireMessage>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            messages,
            user_name: None,
            model: model.into(),
            max_tokens,
        }
    }

    /// Attach a display name.
    pub fn with_user_name(mut self, user_name: Option<String>) -> Self {
        self.user_name = user_name;
        self
    }

    /// Replace the token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Content of the final user message, if the request ends with one.
    pub fn last_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == crate::types::WireRole::User)
            .map(|m| m.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn serialization_omits_missing_name() {
        let request = CompletionRequest::new(
            vec![WireMessage::system("Be brief."), WireMessage::user("hi")],
            "portfolio-assistant",
            600,
        );
        assert_eq!(
            to_value(&request).unwrap(),
            json!({
                "messages": [
                    {"role": "system", "content": "Be brief."},
                    {"role": "user", "content": "hi"}
                ],
                "model": "portfolio-assistant",
                "max_tokens": 600
            })
        );
    }

    #[test]
    fn serialization_with_name() {
        let request = CompletionRequest::new(vec![WireMessage::user("hi")], "m", 10)
            .with_user_name(Some("Ada".to_string()));
        let json = to_value(&request).unwrap();
        assert_eq!(json["userName"], "Ada");
    }

    #[test]
    fn last_user_content_skips_assistant_entries() {
        let request = CompletionRequest::new(
            vec![
                WireMessage::user("first"),
                WireMessage::assistant("reply"),
                WireMessage::user("second"),
            ],
            "m",
            10,
        );
        assert_eq!(request.last_user_content(), Some("second"));
        let empty = CompletionRequest::new(vec![WireMessage::system("s")], "m", 10);
        assert_eq!(empty.last_user_content(), None);
    }
}
