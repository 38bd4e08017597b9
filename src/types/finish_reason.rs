use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Why the model stopped producing the reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FinishReason {
    /// The model finished its turn.
    Stop,

    /// The reply hit the token budget.
    Length,

    /// The provider filtered the reply.
    ContentFilter,

    /// Any reason this crate does not know about.
    Other(String),
}

impl FinishReason {
    /// Returns true if the reply was cut off by the token budget.
    pub fn is_truncated(&self) -> bool {
        matches!(self, FinishReason::Length)
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishReason::Stop => write!(f, "stop"),
            FinishReason::Length => write!(f, "length"),
            FinishReason::ContentFilter => write!(f, "content_filter"),
            FinishReason::Other(other) => write!(f, "{other}"),
        }
    }
}

impl FromStr for FinishReason {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "stop" | "end_turn" | "stop_sequence" => FinishReason::Stop,
            "length" | "max_tokens" => FinishReason::Length,
            "content_filter" | "refusal" => FinishReason::ContentFilter,
            other => FinishReason::Other(other.to_string()),
        })
    }
}

impl Serialize for FinishReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FinishReason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or(FinishReason::Other(s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialization_accepts_both_vocabularies() {
        let reason: FinishReason = serde_json::from_str(r#""length""#).unwrap();
        assert_eq!(reason, FinishReason::Length);

        let reason: FinishReason = serde_json::from_str(r#""max_tokens""#).unwrap();
        assert_eq!(reason, FinishReason::Length);

        let reason: FinishReason = serde_json::from_str(r#""end_turn""#).unwrap();
        assert_eq!(reason, FinishReason::Stop);
    }

    #[test]
    fn unknown_reasons_are_preserved() {
        let reason: FinishReason = serde_json::from_str(r#""tool_calls""#).unwrap();
        assert_eq!(reason, FinishReason::Other("tool_calls".to_string()));
        assert_eq!(serde_json::to_string(&reason).unwrap(), r#""tool_calls""#);
    }

    #[test]
    fn truncation() {
        assert!(FinishReason::Length.is_truncated());
        assert!(!FinishReason::Stop.is_truncated());
    }
}
