//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::time::Duration;

use arrrg_derive::CommandLine;
use tracing::warn;

use crate::reveal::{DEFAULT_FRAME_INTERVAL, DEFAULT_STEP};
use crate::types::Language;

/// Default completion endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api/";

/// Default model identifier sent with every request.
pub const DEFAULT_MODEL: &str = "portfolio-assistant";

/// Default maximum tokens per reply.
const DEFAULT_MAX_TOKENS: u32 = 600;

/// What to do with a send that arrives while a request is in flight.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum InFlightPolicy {
    /// Cancel the in-flight request and issue the new one.
    #[default]
    Supersede,
    /// Ignore the new send.
    Reject,
}

/// Command-line arguments for the portfolio-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Root URL of the completion endpoint.
    #[arrrg(optional, "Endpoint root URL (default: http://localhost:3000/api/)", "URL")]
    pub base_url: Option<String>,

    /// Model to use for chat.
    #[arrrg(optional, "Model to request (default: portfolio-assistant)", "MODEL")]
    pub model: Option<String>,

    /// Maximum tokens per reply.
    #[arrrg(optional, "Max tokens per reply (default: 600)", "TOKENS")]
    pub max_tokens: Option<u32>,

    /// Display language.
    #[arrrg(optional, "Display language, en or es (default: en)", "LANG")]
    pub language: Option<String>,

    /// Visitor display name.
    #[arrrg(optional, "Your display name", "NAME")]
    pub name: Option<String>,

    /// Persona prompt replacing the built-in one.
    #[arrrg(optional, "Custom persona prompt for the assistant", "PROMPT")]
    pub system: Option<String>,

    /// Characters revealed per frame.
    #[arrrg(optional, "Characters revealed per frame (default: 2)", "CHARS")]
    pub reveal_step: Option<u32>,

    /// Frame interval in milliseconds.
    #[arrrg(optional, "Milliseconds between reveal frames (default: 16)", "MS")]
    pub frame_ms: Option<u64>,

    /// Send messages without hint blocks.
    #[arrrg(flag, "Do not attach hint blocks to messages")]
    pub no_hints: bool,

    /// Ignore sends while a reply is pending instead of superseding.
    #[arrrg(flag, "Ignore new messages while a reply is pending")]
    pub reject_while_busy: bool,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Root URL of the completion endpoint.
    pub base_url: String,

    /// The model to request.
    pub model: String,

    /// Maximum tokens per reply.
    pub max_tokens: u32,

    /// Token budget for the one retry after an empty truncated reply.
    /// `None` means half of `max_tokens`.
    pub retry_max_tokens: Option<u32>,

    /// Display language at startup.
    pub language: Language,

    /// Visitor display name at startup.
    pub display_name: Option<String>,

    /// Replaces the built-in persona prompt when set.
    pub system_prompt: Option<String>,

    /// Whether outgoing messages carry a hint block.
    pub hints_enabled: bool,

    /// Behavior for sends that overlap an in-flight request.
    pub in_flight_policy: InFlightPolicy,

    /// Characters revealed per animation frame.
    pub reveal_step: usize,

    /// Time between animation frames.
    pub frame_interval: Duration,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Endpoint: http://localhost:3000/api/
    /// - Max tokens: 600
    /// - Language: English
    /// - Hints: enabled
    /// - Overlapping sends: supersede
    /// - Reveal: 2 characters every 16 ms
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            retry_max_tokens: None,
            language: Language::default(),
            display_name: None,
            system_prompt: None,
            hints_enabled: true,
            in_flight_policy: InFlightPolicy::default(),
            reveal_step: DEFAULT_STEP,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            use_color: true,
        }
    }

    /// Sets the endpoint root URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the model to request.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the maximum tokens per reply.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the truncation retry budget.
    pub fn with_retry_max_tokens(mut self, retry_max_tokens: Option<u32>) -> Self {
        self.retry_max_tokens = retry_max_tokens;
        self
    }

    /// Sets the display language.
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Sets the visitor display name.
    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = name;
        self
    }

    /// Replaces the persona prompt.
    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    /// Enables or disables hint blocks.
    pub fn with_hints(mut self, enabled: bool) -> Self {
        self.hints_enabled = enabled;
        self
    }

    /// Sets the overlapping-send policy.
    pub fn with_in_flight_policy(mut self, policy: InFlightPolicy) -> Self {
        self.in_flight_policy = policy;
        self
    }

    /// Sets the reveal speed.
    pub fn with_reveal(mut self, step: usize, frame_interval: Duration) -> Self {
        self.reveal_step = step.max(1);
        self.frame_interval = frame_interval;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        let language = match args.language.as_deref().map(str::parse::<Language>) {
            Some(Ok(language)) => language,
            Some(Err(err)) => {
                warn!(error = %err, fallback = %defaults.language, "ignoring --language");
                defaults.language
            }
            None => defaults.language,
        };
        let in_flight_policy = if args.reject_while_busy {
            InFlightPolicy::Reject
        } else {
            InFlightPolicy::Supersede
        };

        ChatConfig {
            base_url: args.base_url.unwrap_or(defaults.base_url.clone()),
            model: args.model.unwrap_or(defaults.model.clone()),
            max_tokens: args.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            language,
            display_name: args.name.filter(|n| !n.trim().is_empty()),
            system_prompt: args.system.filter(|p| !p.trim().is_empty()),
            hints_enabled: !args.no_hints,
            in_flight_policy,
            reveal_step: args
                .reveal_step
                .map(|s| (s as usize).max(1))
                .unwrap_or(DEFAULT_STEP),
            frame_interval: args
                .frame_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_FRAME_INTERVAL),
            use_color: !args.no_color,
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, 600);
        assert!(config.retry_max_tokens.is_none());
        assert_eq!(config.language, Language::English);
        assert!(config.display_name.is_none());
        assert!(config.system_prompt.is_none());
        assert!(config.hints_enabled);
        assert_eq!(config.in_flight_policy, InFlightPolicy::Supersede);
        assert_eq!(config.reveal_step, 2);
        assert_eq!(config.frame_interval, Duration::from_millis(16));
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::from(ChatArgs::default());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.language, Language::English);
        assert_eq!(config.in_flight_policy, InFlightPolicy::Supersede);
        assert!(config.hints_enabled);
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            base_url: Some("https://example.com/api".to_string()),
            model: Some("llama-3.1-8b".to_string()),
            max_tokens: Some(256),
            language: Some("es".to_string()),
            name: Some("Ada".to_string()),
            system: Some("You are Ada's portfolio guide.".to_string()),
            reveal_step: Some(0),
            frame_ms: Some(40),
            no_hints: true,
            reject_while_busy: true,
            no_color: true,
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.base_url, "https://example.com/api");
        assert_eq!(config.model, "llama-3.1-8b");
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.language, Language::Spanish);
        assert_eq!(config.display_name.as_deref(), Some("Ada"));
        assert_eq!(
            config.system_prompt.as_deref(),
            Some("You are Ada's portfolio guide.")
        );
        assert_eq!(config.reveal_step, 1);
        assert_eq!(config.frame_interval, Duration::from_millis(40));
        assert!(!config.hints_enabled);
        assert_eq!(config.in_flight_policy, InFlightPolicy::Reject);
        assert!(!config.use_color);
    }

    #[test]
    fn unknown_language_falls_back() {
        assert!("klingon".parse::<Language>().is_err());
        let args = ChatArgs {
            language: Some("klingon".to_string()),
            ..ChatArgs::default()
        };
        assert_eq!(ChatConfig::from(args).language, Language::English);
    }

    #[test]
    fn blank_system_prompt_keeps_the_persona() {
        let args = ChatArgs {
            system: Some("   ".to_string()),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::from(args).system_prompt.is_none());
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_base_url("https://example.com/")
            .with_model("m")
            .with_max_tokens(100)
            .with_retry_max_tokens(Some(40))
            .with_language(Language::Spanish)
            .with_display_name(Some("Ada".to_string()))
            .with_system_prompt(Some("Be terse.".to_string()))
            .with_hints(false)
            .with_in_flight_policy(InFlightPolicy::Reject)
            .with_reveal(0, Duration::from_millis(5))
            .without_color();

        assert_eq!(config.base_url, "https://example.com/");
        assert_eq!(config.model, "m");
        assert_eq!(config.max_tokens, 100);
        assert_eq!(config.retry_max_tokens, Some(40));
        assert_eq!(config.language, Language::Spanish);
        assert_eq!(config.display_name.as_deref(), Some("Ada"));
        assert_eq!(config.system_prompt.as_deref(), Some("Be terse."));
        assert!(!config.hints_enabled);
        assert_eq!(config.in_flight_policy, InFlightPolicy::Reject);
        assert_eq!(config.reveal_step, 1);
        assert_eq!(config.frame_interval, Duration::from_millis(5));
        assert!(!config.use_color);
    }
}
