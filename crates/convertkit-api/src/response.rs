//! Response envelope retained for diagnostics.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Status, headers and decoded JSON body of an API response.
///
/// Returned by every call for the caller's own use, and a clone of the most
/// recent one is retained by the client for inspection via
/// `last_response()`.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Value>,
}

impl ResponseEnvelope {
    pub(crate) fn new(status: StatusCode, headers: HeaderMap, body: Option<Value>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Decoded JSON body. `None` when the body was empty or not JSON
    /// (e.g. raw markup fetches).
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Deserialize the body into a typed value.
    ///
    /// An absent body decodes as JSON `null`, so unit responses (`()`)
    /// succeed for 204-style replies.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MalformedResponse`] when the body does not match
    /// the expected shape.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let value = self.body.clone().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|err| ApiError::MalformedResponse {
            status: self.status.as_u16(),
            detail: err.to_string(),
        })
    }
}
