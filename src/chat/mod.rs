//! Chat session and terminal application support.
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: message history, in-flight requests and failure state
//! - [`commands`]: slash command parsing

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, InFlightPolicy};
pub use session::{
    ChatSession, FailureNotice, PendingReply, SendOutcome, SessionSnapshot, SessionStats,
};
