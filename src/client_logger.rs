//! Logging hook for completion endpoint traffic.
//!
//! This module provides the [`ClientLogger`] trait that allows users to capture
//! every exchange passing through a [`CompletionClient`](crate::CompletionClient).

use crate::{CompletionRequest, CompletionResponse, Error};

/// A trait for logging completion endpoint traffic.
///
/// # Example
///
/// ```rust,ignore
/// use portfolio_chat::{ClientLogger, CompletionRequest, CompletionResponse};
/// use std::io::Write;
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_request(&self, request: &CompletionRequest) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Request: {}", serde_json::to_string(request).unwrap()).unwrap();
///     }
///
///     fn log_response(&self, response: &CompletionResponse) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Response: {}", serde_json::to_string(response).unwrap()).unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a request just before it is sent.
    fn log_request(&self, request: &CompletionRequest);

    /// Log a successful response.
    fn log_response(&self, response: &CompletionResponse);

    /// Log a failed exchange.
    fn log_error(&self, error: &Error) {
        _ = error;
    }
}
