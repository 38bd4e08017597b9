use serde::{Deserialize, Serialize};

use crate::types::{FinishReason, Usage};

/// Successful reply from the completion endpoint.
///
/// Only `message` is required. Any metadata the endpoint adds beyond the
/// fields below is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Reply text to store as the assistant message.
    pub message: String,

    /// Why generation stopped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,

    /// Model that produced the reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Token accounting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl CompletionResponse {
    /// Create a response carrying only text.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            finish_reason: None,
            model: None,
            usage: None,
        }
    }

    /// Set the finish reason.
    pub fn with_finish_reason(mut self, finish_reason: FinishReason) -> Self {
        self.finish_reason = Some(finish_reason);
        self
    }

    /// Returns true if the reply contains something other than whitespace.
    pub fn has_visible_text(&self) -> bool {
        !self.message.trim().is_empty()
    }

    /// Returns true if the token budget ran out before any visible text.
    pub fn is_truncated_empty(&self) -> bool {
        !self.has_visible_text()
            && self
                .finish_reason
                .as_ref()
                .is_some_and(FinishReason::is_truncated)
    }
}
