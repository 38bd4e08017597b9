use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("portfolio_chat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter =
    Counter::new("portfolio_chat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("portfolio_chat.client.request_duration_seconds");
pub(crate) static CLIENT_TRUNCATION_RETRIES: Counter =
    Counter::new("portfolio_chat.client.truncation_retries");

pub(crate) static SESSION_SENDS: Counter = Counter::new("portfolio_chat.session.sends");
pub(crate) static SESSION_IGNORED: Counter = Counter::new("portfolio_chat.session.ignored");
pub(crate) static SESSION_REPLIES: Counter = Counter::new("portfolio_chat.session.replies");
pub(crate) static SESSION_FAILURES: Counter = Counter::new("portfolio_chat.session.failures");
pub(crate) static SESSION_SUPERSEDED: Counter =
    Counter::new("portfolio_chat.session.superseded");

pub(crate) static REVEAL_FRAMES: Counter = Counter::new("portfolio_chat.reveal.frames");
pub(crate) static REVEAL_COMPLETED: Counter = Counter::new("portfolio_chat.reveal.completed");
pub(crate) static REVEAL_CANCELLED: Counter = Counter::new("portfolio_chat.reveal.cancelled");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);
    collector.register_counter(&CLIENT_TRUNCATION_RETRIES);

    collector.register_counter(&SESSION_SENDS);
    collector.register_counter(&SESSION_IGNORED);
    collector.register_counter(&SESSION_REPLIES);
    collector.register_counter(&SESSION_FAILURES);
    collector.register_counter(&SESSION_SUPERSEDED);

    collector.register_counter(&REVEAL_FRAMES);
    collector.register_counter(&REVEAL_COMPLETED);
    collector.register_counter(&REVEAL_CANCELLED);
}
