use serde::{Deserialize, Serialize};

/// Token accounting reported by the completion endpoint.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    /// Tokens consumed by the prompt.
    #[serde(default, alias = "input_tokens", skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u32>,

    /// Tokens produced in the reply.
    #[serde(default, alias = "output_tokens", skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,
}

impl Usage {
    /// Create a new `Usage` with the given prompt and completion tokens.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens: Some(prompt_tokens),
            completion_tokens: Some(completion_tokens),
        }
    }

    /// Total tokens, counting missing values as zero.
    pub fn total(&self) -> u64 {
        u64::from(self.prompt_tokens.unwrap_or(0)) + u64::from(self.completion_tokens.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_either_naming() {
        let usage: Usage =
            serde_json::from_str(r#"{"prompt_tokens": 10, "completion_tokens": 4}"#).unwrap();
        assert_eq!(usage, Usage::new(10, 4));

        let usage: Usage =
            serde_json::from_str(r#"{"input_tokens": 10, "output_tokens": 4}"#).unwrap();
        assert_eq!(usage.total(), 14);
    }

    #[test]
    fn missing_fields_count_as_zero() {
        let usage: Usage = serde_json::from_str("{}").unwrap();
        assert_eq!(usage.total(), 0);
    }
}
