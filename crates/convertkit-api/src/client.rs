//! ConvertKit API client and request engine.
//!
//! Every resource method funnels through [`ConvertKitClient::execute`]: the
//! single place where headers are derived, parameters are encoded, the
//! response is decoded and classified, and the diagnostic state (last
//! response, debug log) is maintained.

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use moka::sync::Cache;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_LENGTH};
use reqwest::{Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::auth::{build_headers, Credential};
use crate::error::{classify_status, ApiError};
use crate::http::{HttpTransport, Transport};
use crate::logging::{DebugLog, LogLevel};
use crate::markup::MarkupCacheConfig;
use crate::oauth::TokenSet;
use crate::request::{ParamValue, RequestSpec, RequestTarget};
use crate::response::ResponseEnvelope;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API origin, without a trailing version segment.
    pub api_url: String,
    /// API version segment appended to `api_url`.
    pub api_version: String,
    /// OAuth authorization endpoint (browser redirect target).
    pub oauth_authorize_url: String,
    /// OAuth token endpoint (code exchange and refresh).
    pub oauth_token_url: String,
    /// Transport deadline per request.
    pub timeout: Duration,
    /// Legacy markup cache sizing.
    pub markup_cache: MarkupCacheConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.convertkit.com".to_string(),
            api_version: "v4".to_string(),
            oauth_authorize_url: "https://app.convertkit.com/oauth/authorize".to_string(),
            oauth_token_url: "https://api.convertkit.com/oauth/token".to_string(),
            timeout: Duration::from_secs(30),
            markup_cache: MarkupCacheConfig::default(),
        }
    }
}

/// ConvertKit v4 API client.
///
/// Holds one [`Credential`] for its lifetime. Safe to share behind an
/// [`Arc`]: the mutable slots (OAuth tokens, last response) are lock-guarded
/// and token refresh is single-flight.
pub struct ConvertKitClient {
    config: ClientConfig,
    pub(crate) credential: RwLock<Credential>,
    transport: Arc<dyn Transport>,
    pub(crate) debug_log: DebugLog,
    last_response: Mutex<Option<ResponseEnvelope>>,
    /// Serializes token refreshes so concurrent callers share one network
    /// call.
    pub(crate) refresh_flight: tokio::sync::Mutex<()>,
    /// Result of the most recent refresh, handed to callers that lost the
    /// refresh race.
    pub(crate) last_refresh: Mutex<Option<TokenSet>>,
    pub(crate) markup_cache: Cache<String, String>,
}

impl ConvertKitClient {
    /// Client over `credential` with default configuration.
    pub fn new(credential: Credential) -> Result<Self, ApiError> {
        Self::builder().credential(credential).build()
    }

    /// Start building a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Snapshot of the current credential. For OAuth clients this reflects
    /// token rotation, so hosts can persist refreshed tokens.
    pub fn credential(&self) -> Credential {
        self.credential
            .read()
            .expect("credential lock poisoned")
            .clone()
    }

    /// The envelope of the most recent call, or `None` before the first
    /// call.
    pub fn last_response(&self) -> Option<ResponseEnvelope> {
        self.last_response
            .lock()
            .expect("last response lock poisoned")
            .clone()
    }

    /// Write a line to the debug log. Masking is applied internally before
    /// anything reaches the sink, so `message` may contain raw values.
    pub fn log(&self, level: LogLevel, message: &str) {
        self.debug_log.log(level, message);
    }

    /// Execute a request and return its envelope.
    ///
    /// # Errors
    ///
    /// [`ApiError::Client`]/[`ApiError::Server`] for non-success statuses,
    /// [`ApiError::Transport`] for network failures and
    /// [`ApiError::MalformedResponse`] when a success body cannot be decoded.
    pub async fn execute(&self, spec: RequestSpec) -> Result<ResponseEnvelope, ApiError> {
        let (status, headers, text) = self.dispatch(&spec).await?;

        if !success(status) {
            return Err(self.fail(status, headers, &text));
        }

        let body = if text.trim().is_empty() {
            None
        } else {
            match serde_json::from_str(&text) {
                Ok(value) => Some(value),
                Err(err) => {
                    self.store_last(ResponseEnvelope::new(status, headers, None));
                    self.debug_log
                        .log(LogLevel::Info, "Failed to finish request.");
                    return Err(ApiError::MalformedResponse {
                        status: status.as_u16(),
                        detail: err.to_string(),
                    });
                }
            }
        };

        let envelope = ResponseEnvelope::new(status, headers, body);
        self.store_last(envelope.clone());
        self.debug_log
            .log(LogLevel::Info, "Finish request successfully.");
        Ok(envelope)
    }

    /// Execute a request and decode the body into `T`.
    pub async fn execute_json<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T, ApiError> {
        self.execute(spec).await?.decode()
    }

    /// Raw fetch used by the legacy markup utility: the status check and
    /// diagnostics apply, but the body is returned verbatim.
    pub(crate) async fn fetch_raw(&self, spec: RequestSpec) -> Result<String, ApiError> {
        let (status, headers, text) = self.dispatch(&spec).await?;

        if !success(status) {
            return Err(self.fail(status, headers, &text));
        }

        self.store_last(ResponseEnvelope::new(status, headers, None));
        self.debug_log
            .log(LogLevel::Info, "Finish request successfully.");
        Ok(text)
    }

    /// Attach the API secret to a secret-scoped call: as a query parameter
    /// for GET, in the body otherwise. OAuth clients carry their scope in
    /// the bearer token and pass through unchanged.
    pub(crate) fn with_secret(&self, spec: RequestSpec) -> Result<RequestSpec, ApiError> {
        let credential = self.credential.read().expect("credential lock poisoned");
        match &*credential {
            Credential::OAuth { .. } => Ok(spec),
            Credential::ApiKey {
                api_secret: Some(secret),
                ..
            } => {
                if spec.method() == Method::GET {
                    Ok(spec.query("api_secret", secret.as_str()))
                } else {
                    Ok(spec.body_param("api_secret", Value::String(secret.clone())))
                }
            }
            Credential::ApiKey {
                api_secret: None, ..
            } => Err(ApiError::Config(
                "this operation requires the API secret".into(),
            )),
        }
    }

    async fn dispatch(
        &self,
        spec: &RequestSpec,
    ) -> Result<(StatusCode, HeaderMap, String), ApiError> {
        let url = self.resolve_url(spec)?;
        let headers = {
            let credential = self.credential.read().expect("credential lock poisoned");
            build_headers(&credential, &spec.content_type, spec.auth)?
        };

        let mut request = Request::new(spec.method.clone(), url.clone());
        *request.headers_mut() = headers;

        if let Some(body) = &spec.body {
            let bytes = serde_json::to_vec(body)
                .map_err(|err| ApiError::Config(format!("failed to serialize body: {err}")))?;
            request
                .headers_mut()
                .insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
            *request.body_mut() = Some(bytes.into());
        }

        self.debug_log
            .log(LogLevel::Info, &format!("Making request on {url}."));
        if let Some(body) = &spec.body {
            self.debug_log.log(
                LogLevel::Info,
                &format!("{}, Request body: {body}", spec.method),
            );
        }
        debug!(method = %spec.method, %url, "dispatching API request");

        let response = self.transport.send(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await.map_err(ApiError::Transport)?;

        Ok((status, headers, text))
    }

    fn resolve_url(&self, spec: &RequestSpec) -> Result<Url, ApiError> {
        let mut url = match &spec.target {
            RequestTarget::Api(path) => {
                let base = self.config.api_url.trim_end_matches('/');
                let joined = format!(
                    "{base}/{}/{}",
                    self.config.api_version,
                    path.trim_start_matches('/')
                );
                Url::parse(&joined)
                    .map_err(|err| ApiError::Config(format!("invalid request URL: {err}")))?
            }
            RequestTarget::Absolute(url) => url.clone(),
        };

        if !spec.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &spec.query {
                match value {
                    ParamValue::Str(value) => {
                        pairs.append_pair(key, value);
                    }
                    ParamValue::Int(value) => {
                        pairs.append_pair(key, &value.to_string());
                    }
                    ParamValue::Bool(value) => {
                        pairs.append_pair(key, if *value { "true" } else { "false" });
                    }
                    ParamValue::List(items) => {
                        let key = format!("{key}[]");
                        for item in items {
                            pairs.append_pair(&key, item);
                        }
                    }
                }
            }
        }

        Ok(url)
    }

    fn fail(&self, status: StatusCode, headers: HeaderMap, text: &str) -> ApiError {
        self.debug_log.log(
            LogLevel::Info,
            &format!("Response code is {}.", status.as_u16()),
        );
        let body: Option<Value> = serde_json::from_str(text).ok();
        self.store_last(ResponseEnvelope::new(status, headers, body.clone()));
        classify_status(status, body)
    }

    fn store_last(&self, envelope: ResponseEnvelope) {
        *self
            .last_response
            .lock()
            .expect("last response lock poisoned") = Some(envelope);
    }
}

fn success(status: StatusCode) -> bool {
    (200..400).contains(&status.as_u16())
}

enum DebugTarget {
    Off,
    File(PathBuf),
    Writer(Box<dyn Write + Send>),
}

/// Builder for [`ConvertKitClient`].
pub struct ClientBuilder {
    config: ClientConfig,
    credential: Option<Credential>,
    transport: Option<Arc<dyn Transport>>,
    debug: DebugTarget,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            config: ClientConfig::default(),
            credential: None,
            transport: None,
            debug: DebugTarget::Off,
        }
    }
}

impl ClientBuilder {
    /// Set the credential (required).
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Override the API origin (primarily for tests).
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.config.api_url = api_url.into();
        self
    }

    /// Override the API version segment.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.config.api_version = api_version.into();
        self
    }

    /// Override the OAuth token endpoint (primarily for tests).
    pub fn oauth_token_url(mut self, url: impl Into<String>) -> Self {
        self.config.oauth_token_url = url.into();
        self
    }

    /// Override the OAuth authorization endpoint.
    pub fn oauth_authorize_url(mut self, url: impl Into<String>) -> Self {
        self.config.oauth_authorize_url = url.into();
        self
    }

    /// Transport deadline per request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Legacy markup cache sizing.
    pub fn markup_cache(mut self, config: MarkupCacheConfig) -> Self {
        self.config.markup_cache = config;
        self
    }

    /// Substitute the transport (tests, instrumentation).
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Enable masked debug logging to the file at `path`.
    pub fn debug_to_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug = DebugTarget::File(path.into());
        self
    }

    /// Enable masked debug logging to an arbitrary sink.
    pub fn debug_to_writer(mut self, writer: Box<dyn Write + Send>) -> Self {
        self.debug = DebugTarget::Writer(writer);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when the credential is missing, the
    /// transport cannot be constructed, or the debug log file cannot be
    /// opened.
    pub fn build(self) -> Result<ConvertKitClient, ApiError> {
        let credential = self
            .credential
            .ok_or_else(|| ApiError::Config("credential not set".into()))?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                HttpTransport::builder()
                    .timeout(self.config.timeout)
                    .build()?,
            ),
        };

        let secrets = credential.secret_values();
        let debug_log = match self.debug {
            DebugTarget::Off => DebugLog::disabled(),
            DebugTarget::File(path) => DebugLog::to_file(&path, secrets).map_err(|err| {
                ApiError::Config(format!(
                    "failed to open debug log {}: {err}",
                    path.display()
                ))
            })?,
            DebugTarget::Writer(writer) => DebugLog::to_writer(writer, secrets),
        };

        let markup_cache = Cache::builder()
            .time_to_live(self.config.markup_cache.ttl)
            .max_capacity(self.config.markup_cache.max_capacity)
            .build();

        Ok(ConvertKitClient {
            config: self.config,
            credential: RwLock::new(credential),
            transport,
            debug_log,
            last_response: Mutex::new(None),
            refresh_flight: tokio::sync::Mutex::new(()),
            last_refresh: Mutex::new(None),
            markup_cache,
        })
    }
}
