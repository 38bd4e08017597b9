use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS, CLIENT_TRUNCATION_RETRIES,
};
use crate::types::{CompletionRequest, CompletionResponse};

const API_KEY_ENV: &str = "PORTFOLIO_CHAT_API_KEY";
const CHAT_PATH: &str = "chat";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Error types a backend uses to say it is still starting up.
const WAKING_UP_TYPES: &[&str] = &["waking_up", "cold_start", "model_loading"];

/////////////////////////////////////////// Backend ///////////////////////////////////////////

/// Something that turns a [`CompletionRequest`] into a reply.
///
/// The chat session talks to the endpoint only through this trait, which
/// keeps the transport swappable in tests.
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Performs one exchange.
    ///
    /// `cancel` fires when the caller no longer wants the result. Honoring it
    /// is optional; the caller discards superseded results either way.
    async fn complete(
        &self,
        request: CompletionRequest,
        cancel: CancellationToken,
    ) -> Result<CompletionResponse>;
}

/// Runs one exchange and retries once when the reply ran out of tokens
/// before producing any visible text.
///
/// The retry uses `retry_max_tokens`, or half the original budget when unset.
/// A retry that yields text wins; a retry that is still empty or fails
/// surfaces as [`Error::Truncated`]. Cancellation is never retried.
pub async fn complete_with_truncation_retry(
    backend: &dyn CompletionBackend,
    request: CompletionRequest,
    cancel: CancellationToken,
    retry_max_tokens: Option<u32>,
) -> Result<CompletionResponse> {
    let first = backend.complete(request.clone(), cancel.clone()).await?;
    if !first.is_truncated_empty() {
        return Ok(first);
    }
    if cancel.is_cancelled() {
        return Err(Error::abort("request cancelled before truncation retry"));
    }

    let budget = retry_max_tokens
        .unwrap_or(request.max_tokens / 2)
        .max(1);
    CLIENT_TRUNCATION_RETRIES.click();
    debug!(
        original = request.max_tokens,
        retry = budget,
        "reply truncated before any text; retrying with a smaller budget"
    );

    match backend
        .complete(request.with_max_tokens(budget), cancel)
        .await
    {
        Ok(retry) if retry.has_visible_text() => Ok(retry),
        Ok(_) => Err(Error::truncated("retry produced no visible text", budget)),
        Err(err) if err.is_abort() => Err(err),
        Err(err) => {
            warn!(error = %err, "truncation retry failed");
            Err(Error::truncated(format!("retry failed: {err}"), budget))
        }
    }
}

//////////////////////////////////////// CompletionClient ////////////////////////////////////////

/// HTTP client for the completion endpoint.
#[derive(Clone)]
pub struct CompletionClient {
    api_key: Option<String>,
    client: ReqwestClient,
    endpoint: Url,
    timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionClient")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

impl CompletionClient {
    /// Create a new client for the endpoint rooted at `base_url`.
    ///
    /// The API key can be provided directly or read from the
    /// `PORTFOLIO_CHAT_API_KEY` environment variable. A key is optional: a
    /// same-origin proxy usually needs none.
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        Self::with_options(base_url, api_key, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        base_url: &str,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = api_key
            .or_else(|| env::var(API_KEY_ENV).ok())
            .filter(|key| !key.is_empty());
        let endpoint = chat_endpoint(base_url)?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            endpoint,
            timeout,
            logger: None,
        })
    }

    /// Attach a logger that sees every request and response.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The URL requests are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(api_key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
                Error::authentication("API key contains characters not allowed in a header")
            })?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {e}"),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {e}"), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
        }
    }

    /// Process an error response and convert it to our Error type.
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.trim().parse::<u64>().ok());

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {e}"),
                    Some(Box::new(e)),
                );
            }
        };
        error_from_status(status_code, &body, retry_after)
    }

    /// Send one request and wait for the reply.
    pub async fn send(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        if let Some(logger) = &self.logger {
            logger.log_request(request);
        }
        debug!(
            endpoint = %self.endpoint,
            messages = request.messages.len(),
            max_tokens = request.max_tokens,
            "sending completion request"
        );

        let result = self.send_inner(request).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        match &result {
            Ok(response) => {
                if let Some(logger) = &self.logger {
                    logger.log_response(response);
                }
            }
            Err(err) => {
                CLIENT_REQUEST_ERRORS.click();
                warn!(error = %err, "completion request failed");
                if let Some(logger) = &self.logger {
                    logger.log_error(err);
                }
            }
        }
        result
    }

    async fn send_inner(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(self.default_headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response.json::<CompletionResponse>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {e}"),
                Some(Box::new(e)),
            )
        })
    }
}

#[async_trait::async_trait]
impl CompletionBackend for CompletionClient {
    async fn complete(
        &self,
        request: CompletionRequest,
        cancel: CancellationToken,
    ) -> Result<CompletionResponse> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::abort("request superseded")),
            result = self.send(&request) => result,
        }
    }
}

/// Resolves `<base_url>/chat`, tolerating a missing trailing slash.
fn chat_endpoint(base_url: &str) -> Result<Url> {
    let trimmed = base_url.trim();
    let mut base = Url::parse(trimmed)?;
    if base.cannot_be_a_base() {
        return Err(Error::url(
            format!("{trimmed} cannot be used as a base URL"),
            None,
        ));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(CHAT_PATH)?)
}

#[derive(Deserialize, Default)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<ErrorField>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, alias = "wakingUp")]
    waking_up: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Detail(ErrorDetail),
    Text(String),
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: Option<String>,
}

/// Maps a non-2xx status and its body onto the error taxonomy.
pub(crate) fn error_from_status(status_code: u16, body: &str, retry_after: Option<u64>) -> Error {
    let parsed = serde_json::from_str::<ErrorResponse>(body).unwrap_or_default();
    let (error_type, detail_message) = match parsed.error {
        Some(ErrorField::Detail(detail)) => (detail.error_type, detail.message),
        Some(ErrorField::Text(text)) => (None, Some(text)),
        None => (None, None),
    };
    // Only a JSON body carries a message fit for display. Anything else (a
    // proxy's HTML page, a plain-text 404) is logged and left out.
    let message = match detail_message.or(parsed.message) {
        Some(message) => message,
        None => {
            if !body.trim().is_empty() {
                debug!(status_code, body = body.trim(), "unstructured error body");
            }
            String::new()
        }
    };

    let waking_up = parsed.waking_up
        || error_type
            .as_deref()
            .is_some_and(|t| WAKING_UP_TYPES.contains(&t))
        || (status_code == 503 && body.to_lowercase().contains("waking up"));
    if waking_up {
        return Error::waking_up(message, retry_after);
    }

    match status_code {
        400 => Error::bad_request(message),
        401 => Error::authentication(message),
        403 => Error::permission(message),
        404 => Error::not_found(message),
        408 => Error::timeout(message, None),
        429 => Error::rate_limit(message, retry_after),
        500 => Error::internal_server(message),
        502..=504 => Error::service_unavailable(message, retry_after),
        _ => Error::api(status_code, error_type, message),
    }
}
