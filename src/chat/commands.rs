//! Slash command parsing for the chat application.
//!
//! Input starting with `/` controls the session and is never sent to the
//! completion endpoint.

use crate::types::Language;

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Clear the conversation history.
    Clear,

    /// Switch the display language.
    Language(Language),

    /// Set or clear the visitor display name.
    /// `None` clears the current name.
    Name(Option<String>),

    /// Abandon the pending reply.
    Cancel,

    /// Display session statistics.
    Stats,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use portfolio_chat::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/lang es").is_some());
/// assert!(parse_command("What projects have you built?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" | "reset" => ChatCommand::Clear,
        "lang" | "language" | "idioma" => match argument {
            Some(arg) => match arg.parse::<Language>() {
                Ok(language) => ChatCommand::Language(language),
                Err(err) => ChatCommand::Invalid(format!("/lang {err}")),
            },
            None => ChatCommand::Invalid("/lang requires 'en' or 'es'".to_string()),
        },
        "name" => ChatCommand::Name(argument.map(|s| s.to_string())),
        "cancel" | "stop" => ChatCommand::Cancel,
        "stats" | "status" => ChatCommand::Stats,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /clear                 Clear conversation history
  /lang en|es            Switch the display language
  /name [name]           Set your display name (no argument clears it)
  /cancel                Abandon the pending reply
  /stats                 Show session statistics
  /help                  Show this help message
  /quit                  Exit the chat"#
}
