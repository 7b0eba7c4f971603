//! API error types and status classification.
//!
//! Every failure surfaces as a typed [`ApiError`]; the client never folds
//! errors into sentinel values such as `false` or `null`.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by the ConvertKit API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Local validation failure. No network call was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The API rejected the request (4xx). Caller-correctable.
    #[error("client error (status {status}){}", api_message(.body))]
    Client {
        /// HTTP status code.
        status: u16,
        /// Decoded JSON error body, when the API returned one.
        body: Option<Value>,
    },

    /// The API failed to process the request (5xx).
    #[error("server error (status {status}){}", api_message(.body))]
    Server {
        /// HTTP status code.
        status: u16,
        /// Decoded JSON error body, when the API returned one.
        body: Option<Value>,
    },

    /// Network-level failure: DNS, TLS, connection reset, timeout.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The API reported success but the body could not be decoded.
    #[error("malformed response (status {status}): {detail}")]
    MalformedResponse {
        /// HTTP status code of the undecodable response.
        status: u16,
        /// Decoder diagnostic.
        detail: String,
    },

    /// Client construction or configuration problem.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Client { status, .. }
            | Self::Server { status, .. }
            | Self::MalformedResponse { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Decoded error body returned by the API, if any.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Client { body, .. } | Self::Server { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

/// Map a non-success HTTP status and its decoded body to a typed error.
///
/// 5xx maps to [`ApiError::Server`], everything else outside `[200, 400)`
/// to [`ApiError::Client`].
pub(crate) fn classify_status(status: StatusCode, body: Option<Value>) -> ApiError {
    if status.is_server_error() {
        ApiError::Server { status: status.as_u16(), body }
    } else {
        ApiError::Client { status: status.as_u16(), body }
    }
}

/// Extract the `message`/`errors` text the API commonly places in error
/// bodies, formatted as a `Display` suffix.
fn api_message(body: &Option<Value>) -> String {
    let Some(body) = body else {
        return String::new();
    };

    if let Some(message) = body.get("message").and_then(Value::as_str) {
        return format!(": {message}");
    }

    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        let joined = errors
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("; ");
        if !joined.is_empty() {
            return format!(": {joined}");
        }
    }

    String::new()
}
