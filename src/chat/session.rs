//! Core chat session management.
//!
//! [`ChatSession`] owns the message history and mediates every exchange with
//! the completion endpoint. Sends return immediately after the user message
//! is appended; the exchange runs on a spawned task whose result is applied
//! only if no newer send, cancel, or clear has happened in the meantime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::chat::config::{ChatConfig, InFlightPolicy};
use crate::client::{CompletionBackend, complete_with_truncation_retry};
use crate::error::{Error, Result};
use crate::hint;
use crate::intent;
use crate::observability::{
    SESSION_FAILURES, SESSION_IGNORED, SESSION_REPLIES, SESSION_SENDS, SESSION_SUPERSEDED,
};
use crate::persona;
use crate::types::{ChatMessage, CompletionRequest, CompletionResponse, Language, MessageId};

/////////////////////////////////////////// Outcomes ///////////////////////////////////////////

/// User-facing description of a failed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureNotice {
    /// Localized text for the error banner.
    pub message: String,
    /// The endpoint asked us to slow down.
    pub is_rate_limit: bool,
    /// The backend is cold-starting.
    pub is_waking_up: bool,
}

impl FailureNotice {
    /// Converts an endpoint error into the notice shown to the visitor.
    pub fn from_error(err: &Error, language: Language) -> Self {
        let mut notice = FailureNotice {
            message: String::new(),
            is_rate_limit: false,
            is_waking_up: false,
        };
        notice.message = if err.is_rate_limit() {
            notice.is_rate_limit = true;
            rate_limit_text(language, err.retry_after())
        } else if err.is_waking_up() {
            notice.is_waking_up = true;
            waking_up_text(language).to_string()
        } else if err.is_authentication() {
            misconfigured_text(language).to_string()
        } else if err.is_transport() {
            connection_text(language).to_string()
        } else if err.is_truncated() {
            generic_text(language).to_string()
        } else {
            match err.provider_message().map(str::trim) {
                Some(message) if !message.is_empty() => message.to_string(),
                _ => generic_text(language).to_string(),
            }
        };
        notice
    }
}

fn generic_text(language: Language) -> &'static str {
    match language {
        Language::English => "Sorry, something went wrong. Please try again.",
        Language::Spanish => "Lo siento, algo salió mal. Inténtalo de nuevo.",
    }
}

fn connection_text(language: Language) -> &'static str {
    match language {
        Language::English => "Connection problem. Please check your network and try again.",
        Language::Spanish => "Problema de conexión. Revisa tu red e inténtalo de nuevo.",
    }
}

fn waking_up_text(language: Language) -> &'static str {
    match language {
        Language::English => "The assistant is waking up. Please try again in a few seconds.",
        Language::Spanish => "El asistente se está despertando. Inténtalo de nuevo en unos segundos.",
    }
}

fn misconfigured_text(language: Language) -> &'static str {
    match language {
        Language::English => "The chat is not configured correctly.",
        Language::Spanish => "El chat no está configurado correctamente.",
    }
}

fn rate_limit_text(language: Language, retry_after: Option<u64>) -> String {
    match (language, retry_after) {
        (Language::English, Some(1)) => "Too many messages. Please wait 1 second.".to_string(),
        (Language::English, Some(secs)) => {
            format!("Too many messages. Please wait {secs} seconds.")
        }
        (Language::English, None) => "Too many messages. Please wait a moment.".to_string(),
        (Language::Spanish, Some(1)) => "Demasiados mensajes. Espera 1 segundo.".to_string(),
        (Language::Spanish, Some(secs)) => format!("Demasiados mensajes. Espera {secs} segundos."),
        (Language::Spanish, None) => "Demasiados mensajes. Espera un momento.".to_string(),
    }
}

/// How a send ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The assistant reply was appended to history.
    Replied(ChatMessage),
    /// The exchange failed; the notice was stored on the session.
    Failed(FailureNotice),
    /// A newer send, a cancel, or a clear made this result irrelevant.
    Superseded,
}

/// Handle to an exchange started by [`ChatSession::send_message`].
///
/// Dropping the handle does not cancel anything; the result is still applied
/// to the session when it arrives.
#[derive(Debug)]
pub struct PendingReply {
    user_message: MessageId,
    generation: u64,
    state: Arc<Mutex<SessionState>>,
    handle: JoinHandle<SendOutcome>,
}

impl PendingReply {
    /// Id of the user message this exchange answers.
    pub fn user_message(&self) -> MessageId {
        self.user_message
    }

    /// Waits for the exchange to settle.
    pub async fn settle(self) -> SendOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(err) => apply_result(
                &self.state,
                self.generation,
                Err(Error::unknown(format!("reply task failed: {err}"))),
            ),
        }
    }
}

/////////////////////////////////////////// Observers ///////////////////////////////////////////

/// Point-in-time copy of everything a view needs to draw the chat.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// History in insertion order.
    pub messages: Vec<ChatMessage>,
    /// A request is in flight.
    pub is_loading: bool,
    /// Banner text of the last failure, if it has not been cleared.
    pub error: Option<String>,
    /// The last failure was a rate limit.
    pub is_rate_limit: bool,
    /// The last failure was a cold start.
    pub is_waking_up: bool,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The model requested.
    pub model: String,
    /// The current display language.
    pub language: Language,
    /// The visitor display name, if any.
    pub display_name: Option<String>,
    /// The number of messages in the conversation.
    pub message_count: usize,
    /// Requests issued.
    pub requests: u64,
    /// Replies appended to history.
    pub replies: u64,
    /// Requests that failed while active.
    pub failures: u64,
    /// Requests cancelled by a newer send, a cancel, or a clear.
    pub superseded: u64,
    /// Sends ignored because they were empty or overlapped a pending reply.
    pub ignored: u64,
    /// Total prompt tokens reported by the endpoint.
    pub prompt_tokens: u64,
    /// Total completion tokens reported by the endpoint.
    pub completion_tokens: u64,
    /// A request is in flight.
    pub is_loading: bool,
}

//////////////////////////////////////////// State ////////////////////////////////////////////

#[derive(Debug, Default)]
struct Counters {
    requests: u64,
    replies: u64,
    failures: u64,
    superseded: u64,
    ignored: u64,
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug)]
struct SessionState {
    messages: Vec<ChatMessage>,
    next_id: u64,
    loading: bool,
    error: Option<String>,
    is_rate_limit: bool,
    is_waking_up: bool,
    // Bumped by every send, cancel and clear. A task applies its result only
    // while its generation is current.
    generation: u64,
    in_flight: Option<CancellationToken>,
    language: Language,
    display_name: Option<String>,
    counters: Counters,
}

impl SessionState {
    fn allocate_id(&mut self) -> MessageId {
        self.next_id += 1;
        MessageId::new(self.next_id)
    }

    fn clear_failure(&mut self) {
        self.error = None;
        self.is_rate_limit = false;
        self.is_waking_up = false;
    }

    /// Cancels the in-flight request, if any, and invalidates its result.
    fn abandon_in_flight(&mut self) -> bool {
        self.generation += 1;
        self.loading = false;
        match self.in_flight.take() {
            Some(token) => {
                token.cancel();
                self.counters.superseded += 1;
                SESSION_SUPERSEDED.click();
                true
            }
            None => false,
        }
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn apply_result(
    state: &Mutex<SessionState>,
    generation: u64,
    result: Result<CompletionResponse>,
) -> SendOutcome {
    let mut state = lock(state);
    if state.generation != generation {
        debug!(generation, "discarding superseded reply");
        return SendOutcome::Superseded;
    }
    state.loading = false;
    state.in_flight = None;

    match result {
        Ok(response) => {
            if let Some(usage) = response.usage {
                state.counters.prompt_tokens += u64::from(usage.prompt_tokens.unwrap_or(0));
                state.counters.completion_tokens +=
                    u64::from(usage.completion_tokens.unwrap_or(0));
            }
            let id = state.allocate_id();
            let message = ChatMessage::assistant(id, response.message);
            state.messages.push(message.clone());
            state.counters.replies += 1;
            SESSION_REPLIES.click();
            debug!(%id, generation, "reply applied");
            SendOutcome::Replied(message)
        }
        Err(err) => {
            let notice = FailureNotice::from_error(&err, state.language);
            warn!(error = %err, status = ?err.status_code(), generation, "chat request failed");
            state.error = Some(notice.message.clone());
            state.is_rate_limit = notice.is_rate_limit;
            state.is_waking_up = notice.is_waking_up;
            state.counters.failures += 1;
            SESSION_FAILURES.click();
            SendOutcome::Failed(notice)
        }
    }
}

/////////////////////////////////////////// Session ///////////////////////////////////////////

/// A chat session that owns history and talks to a [`CompletionBackend`].
///
/// All methods take `&self`; the session can be shared between the input
/// loop and whatever renders its state.
pub struct ChatSession {
    backend: Arc<dyn CompletionBackend>,
    config: ChatConfig,
    state: Arc<Mutex<SessionState>>,
}

impl ChatSession {
    /// Creates a new chat session with the given backend and configuration.
    pub fn new(backend: Arc<dyn CompletionBackend>, config: ChatConfig) -> Self {
        let state = SessionState {
            messages: Vec::new(),
            next_id: 0,
            loading: false,
            error: None,
            is_rate_limit: false,
            is_waking_up: false,
            generation: 0,
            in_flight: None,
            language: config.language,
            display_name: normalize_name(config.display_name.clone()),
            counters: Counters::default(),
        };
        Self {
            backend,
            config,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Sends a user message.
    ///
    /// Returns `None` when the trimmed text is empty, or when a reply is
    /// pending and the session rejects overlapping sends. Otherwise the user
    /// message is in history, the session is loading, and the returned
    /// handle resolves once the exchange settles.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn send_message(&self, text: &str) -> Option<PendingReply> {
        let text = text.trim();
        let mut state = lock(&self.state);
        if text.is_empty() {
            state.counters.ignored += 1;
            SESSION_IGNORED.click();
            return None;
        }
        if state.loading {
            match self.config.in_flight_policy {
                InFlightPolicy::Reject => {
                    debug!("reply pending; ignoring send");
                    state.counters.ignored += 1;
                    SESSION_IGNORED.click();
                    return None;
                }
                InFlightPolicy::Supersede => {
                    debug!(generation = state.generation, "superseding pending reply");
                    state.abandon_in_flight();
                }
            }
        }

        let language = state.language;
        let content = if self.config.hints_enabled {
            hint::encode(text, intent::classify(text, language), language)
        } else {
            text.to_string()
        };
        let user_message = state.allocate_id();
        state
            .messages
            .push(ChatMessage::user(user_message, content));
        state.loading = true;
        state.clear_failure();
        state.generation += 1;
        let generation = state.generation;
        let cancel = CancellationToken::new();
        state.in_flight = Some(cancel.clone());
        state.counters.requests += 1;
        let request = self.build_request(&state);
        drop(state);

        SESSION_SENDS.click();
        debug!(%user_message, generation, history = request.messages.len(), "sending message");

        let backend = Arc::clone(&self.backend);
        let shared = Arc::clone(&self.state);
        let retry_max_tokens = self.config.retry_max_tokens;
        let handle = tokio::spawn(async move {
            let result =
                complete_with_truncation_retry(backend.as_ref(), request, cancel, retry_max_tokens)
                    .await;
            apply_result(&shared, generation, result)
        });

        Some(PendingReply {
            user_message,
            generation,
            state: Arc::clone(&self.state),
            handle,
        })
    }

    fn build_request(&self, state: &SessionState) -> CompletionRequest {
        let mut messages = Vec::with_capacity(state.messages.len() + 1);
        messages.push(persona::system_message(
            state.language,
            self.config.system_prompt.as_deref(),
            state.display_name.as_deref(),
        ));
        messages.extend(state.messages.iter().map(ChatMessage::to_wire));
        CompletionRequest::new(messages, self.config.model.clone(), self.config.max_tokens)
            .with_user_name(state.display_name.clone())
    }

    /// Abandons the pending reply, if any. Its result will be discarded.
    ///
    /// Returns true if a request was in flight.
    pub fn cancel(&self) -> bool {
        let mut state = lock(&self.state);
        if !state.loading {
            return false;
        }
        state.abandon_in_flight()
    }

    /// Clears the conversation history and any failure flags.
    ///
    /// A pending reply is cancelled as well, so it cannot land in the empty
    /// history. Message ids keep increasing across clears.
    pub fn clear_messages(&self) {
        let mut state = lock(&self.state);
        state.abandon_in_flight();
        state.messages.clear();
        state.clear_failure();
    }

    /// Returns a copy of the history in insertion order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.state).messages.clone()
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        lock(&self.state).messages.len()
    }

    /// Returns true while a request is in flight.
    pub fn is_loading(&self) -> bool {
        lock(&self.state).loading
    }

    /// Returns the banner text of the last failure.
    pub fn error(&self) -> Option<String> {
        lock(&self.state).error.clone()
    }

    /// Returns true if the last failure was a rate limit.
    pub fn is_rate_limit(&self) -> bool {
        lock(&self.state).is_rate_limit
    }

    /// Returns true if the last failure was a cold start.
    pub fn is_waking_up(&self) -> bool {
        lock(&self.state).is_waking_up
    }

    /// Returns everything a view needs in one consistent copy.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = lock(&self.state);
        SessionSnapshot {
            messages: state.messages.clone(),
            is_loading: state.loading,
            error: state.error.clone(),
            is_rate_limit: state.is_rate_limit,
            is_waking_up: state.is_waking_up,
        }
    }

    /// Returns the current display language.
    pub fn language(&self) -> Language {
        lock(&self.state).language
    }

    /// Changes the display language used for hints, persona and notices.
    pub fn set_language(&self, language: Language) {
        lock(&self.state).language = language;
    }

    /// Returns the visitor display name, if any.
    pub fn display_name(&self) -> Option<String> {
        lock(&self.state).display_name.clone()
    }

    /// Sets or clears the visitor display name.
    pub fn set_display_name(&self, name: Option<String>) {
        lock(&self.state).display_name = normalize_name(name);
    }

    /// Returns the active chat configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Returns session statistics.
    pub fn stats(&self) -> SessionStats {
        let state = lock(&self.state);
        SessionStats {
            model: self.config.model.clone(),
            language: state.language,
            display_name: state.display_name.clone(),
            message_count: state.messages.len(),
            requests: state.counters.requests,
            replies: state.counters.replies,
            failures: state.counters.failures,
            superseded: state.counters.superseded,
            ignored: state.counters.ignored,
            prompt_tokens: state.counters.prompt_tokens,
            completion_tokens: state.counters.completion_tokens,
            is_loading: state.loading,
        }
    }
}

fn normalize_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}
