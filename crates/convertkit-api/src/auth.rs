//! Authentication credentials and request header derivation.

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT,
};

use crate::error::ApiError;

/// User agent reported on every request:
/// `ConvertKitRustSDK/<crate-version>;rust/<minimum-rust-version>`.
pub const USER_AGENT_VALUE: &str = concat!(
    "ConvertKitRustSDK/",
    env!("CARGO_PKG_VERSION"),
    ";rust/",
    env!("CARGO_PKG_RUST_VERSION"),
);

/// Header carrying the legacy API key.
const X_API_KEY: HeaderName = HeaderName::from_static("x-api-key");

/// Authentication modes supported by the API.
///
/// A client uses exactly one variant for its lifetime; mixing modes per call
/// is not supported. OAuth access/refresh tokens are replaced only through
/// the token lifecycle operations on the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Legacy API key/secret pair. The secret is optional; it is required
    /// only by secret-scoped read operations that expose subscriber PII,
    /// where call sites carry it as a query or body parameter.
    ApiKey {
        /// Public API key, sent as the `X-Api-Key` header.
        api_key: String,
        /// API secret, never sent as a header.
        api_secret: Option<String>,
    },

    /// OAuth application credentials plus bearer tokens.
    OAuth {
        /// OAuth application client ID.
        client_id: String,
        /// OAuth application client secret.
        client_secret: String,
        /// Bearer access token.
        access_token: String,
        /// Refresh token, when the provider issued one.
        refresh_token: Option<String>,
    },
}

impl Credential {
    /// Legacy API key credential.
    pub fn api_key(api_key: impl Into<String>, api_secret: Option<String>) -> Self {
        Self::ApiKey {
            api_key: api_key.into(),
            api_secret,
        }
    }

    /// OAuth credential.
    pub fn oauth(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
    ) -> Self {
        Self::OAuth {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            access_token: access_token.into(),
            refresh_token,
        }
    }

    /// Secret material that must never reach a log sink unmasked.
    pub(crate) fn secret_values(&self) -> Vec<String> {
        match self {
            Self::ApiKey {
                api_key,
                api_secret,
            } => {
                let mut secrets = vec![api_key.clone()];
                secrets.extend(api_secret.clone());
                secrets
            }
            Self::OAuth {
                client_id,
                client_secret,
                access_token,
                refresh_token,
            } => {
                let mut secrets = vec![
                    client_id.clone(),
                    client_secret.clone(),
                    access_token.clone(),
                ];
                secrets.extend(refresh_token.clone());
                secrets
            }
        }
    }

    /// API secret for secret-scoped legacy calls.
    pub(crate) fn api_secret(&self) -> Option<&str> {
        match self {
            Self::ApiKey { api_secret, .. } => api_secret.as_deref(),
            Self::OAuth { .. } => None,
        }
    }
}

/// Derive the header set for a request.
///
/// Always sets `Accept`, `Content-Type` (with `charset=utf-8`) and
/// `User-Agent`. With `auth` enabled, adds `X-Api-Key` for
/// [`Credential::ApiKey`] or `Authorization: Bearer` for
/// [`Credential::OAuth`]. Pure; the only failure mode is a value that is not
/// a valid header, surfaced as [`ApiError::Config`].
pub fn build_headers(
    credential: &Credential,
    content_type: &str,
    auth: bool,
) -> Result<HeaderMap, ApiError> {
    let accept = HeaderValue::from_str(content_type)
        .map_err(|_| ApiError::Config(format!("invalid content type: {content_type}")))?;
    let full_type = HeaderValue::from_str(&format!("{content_type}; charset=utf-8"))
        .map_err(|_| ApiError::Config(format!("invalid content type: {content_type}")))?;

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, accept);
    headers.insert(CONTENT_TYPE, full_type);
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

    if !auth {
        return Ok(headers);
    }

    match credential {
        Credential::ApiKey { api_key, .. } => {
            let value = HeaderValue::from_str(api_key)
                .map_err(|_| ApiError::Config("API key is not a valid header value".into()))?;
            headers.insert(X_API_KEY, value);
        }
        Credential::OAuth { access_token, .. } => {
            let value = HeaderValue::from_str(&format!("Bearer {access_token}")).map_err(|_| {
                ApiError::Config("access token is not a valid header value".into())
            })?;
            headers.insert(AUTHORIZATION, value);
        }
    }

    Ok(headers)
}
