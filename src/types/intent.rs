use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse conversational intent of a user message.
///
/// Used only to pick which hint template travels with the message.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Small talk, greetings, anything not about the portfolio.
    #[default]
    Casual,

    /// Questions about projects, experience, skills, or hiring.
    Work,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Casual => write!(f, "casual"),
            Intent::Work => write!(f, "work"),
        }
    }
}
