//! Request specification consumed by the engine.
//!
//! Resource methods describe each call as a [`RequestSpec`] instead of
//! passing loose keyword arguments; the full set of recognized options is
//! visible at the type level.

use reqwest::Method;
use serde_json::{Map, Value};
use url::Url;

/// Default content type for API calls.
pub(crate) const JSON_CONTENT_TYPE: &str = "application/json";

/// Where a request is routed.
#[derive(Debug, Clone)]
pub enum RequestTarget {
    /// Path under the versioned API base, e.g. `subscribers/123/tags`.
    Api(String),
    /// Fully-qualified URL (OAuth token endpoint, legacy markup documents).
    Absolute(Url),
}

/// Scalar or list value carried in a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// String scalar.
    Str(String),
    /// Integer scalar.
    Int(i64),
    /// Boolean scalar, serialized as `true`/`false`.
    Bool(bool),
    /// List value, serialized as repeated `key[]` pairs.
    List(Vec<String>),
}

impl ParamValue {
    /// Whether this value would serialize to nothing and should be omitted.
    fn is_empty(&self) -> bool {
        match self {
            Self::Str(value) => value.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Int(_) | Self::Bool(_) => false,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Fully describes one API call: verb, target, query parameters, JSON body,
/// content type and whether an authentication header is required.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub(crate) method: Method,
    pub(crate) target: RequestTarget,
    pub(crate) query: Vec<(String, ParamValue)>,
    pub(crate) body: Option<Value>,
    pub(crate) auth: bool,
    pub(crate) content_type: String,
}

impl RequestSpec {
    fn new(method: Method, target: RequestTarget) -> Self {
        Self {
            method,
            target,
            query: Vec::new(),
            body: None,
            auth: true,
            content_type: JSON_CONTENT_TYPE.to_string(),
        }
    }

    /// GET request against an API path.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, RequestTarget::Api(path.into()))
    }

    /// POST request against an API path.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, RequestTarget::Api(path.into()))
    }

    /// PUT request against an API path.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, RequestTarget::Api(path.into()))
    }

    /// PATCH request against an API path.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, RequestTarget::Api(path.into()))
    }

    /// DELETE request against an API path.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, RequestTarget::Api(path.into()))
    }

    /// Request against a fully-qualified URL, bypassing the API base.
    pub fn absolute(method: Method, url: Url) -> Self {
        Self::new(method, RequestTarget::Absolute(url))
    }

    /// Append a query parameter. Empty values are omitted entirely rather
    /// than serialized as empty strings.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.query.push((key.into(), value));
        }
        self
    }

    /// Append a query parameter when a value is present.
    pub fn query_opt<V: Into<ParamValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Set the JSON body for write verbs.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Insert a single field into the JSON body, creating an object body if
    /// none was set.
    pub fn body_param(mut self, key: impl Into<String>, value: Value) -> Self {
        let object = match self.body.take() {
            Some(Value::Object(map)) => {
                let mut map = map;
                map.insert(key.into(), value);
                map
            }
            _ => {
                let mut map = Map::new();
                map.insert(key.into(), value);
                map
            }
        };
        self.body = Some(Value::Object(object));
        self
    }

    /// Skip the authentication header (OAuth token endpoint, public legacy
    /// markup documents).
    pub fn without_auth(mut self) -> Self {
        self.auth = false;
        self
    }

    /// Override the content type (default `application/json`).
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// HTTP method of this request.
    pub fn method(&self) -> &Method {
        &self.method
    }
}
