//! Data types shared by the chat core.

pub mod chat_message;
pub mod completion_request;
pub mod completion_response;
pub mod finish_reason;
pub mod intent;
pub mod language;
pub mod message_role;
pub mod usage;
pub mod wire_message;

pub use chat_message::{ChatMessage, MessageId};
pub use completion_request::CompletionRequest;
pub use completion_response::CompletionResponse;
pub use finish_reason::FinishReason;
pub use intent::Intent;
pub use language::{Language, LanguageParseError};
pub use message_role::{MessageRole, WireRole};
pub use usage::Usage;
pub use wire_message::WireMessage;
