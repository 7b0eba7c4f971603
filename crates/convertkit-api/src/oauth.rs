//! OAuth 2.0 token lifecycle: authorize URL, code exchange, refresh.
//!
//! Exchange and refresh POST to the token endpoint with authentication
//! headers disabled; the application credentials travel in the request body.
//! A successful call rotates the client's stored tokens in place.

use chrono::{DateTime, TimeZone, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::auth::Credential;
use crate::client::ConvertKitClient;
use crate::error::ApiError;
use crate::logging::LogLevel;
use crate::request::RequestSpec;

/// Tokens issued by the OAuth token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenSet {
    /// Bearer access token.
    pub access_token: String,
    /// Refresh token, when the provider rotated or issued one.
    pub refresh_token: Option<String>,
    /// Token type, `Bearer` in practice.
    pub token_type: String,
    /// Unix timestamp of issuance.
    pub created_at: i64,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// Granted scope.
    pub scope: Option<String>,
}

impl TokenSet {
    /// Absolute expiry instant derived from `created_at + expires_in`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.created_at + self.expires_in, 0).single()
    }

    /// Whether the access token is expired, or expires within
    /// `threshold_seconds`.
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        match self.expires_at() {
            Some(expires_at) => Utc::now() + chrono::Duration::seconds(threshold_seconds) >= expires_at,
            None => false,
        }
    }
}

/// Build the browser authorization URL for an OAuth application.
///
/// Pure query-string construction against `authorize_endpoint`; parameter
/// order is fixed: `client_id`, `redirect_uri`, `response_type=code`.
pub fn authorize_url(authorize_endpoint: &str, client_id: &str, redirect_uri: &str) -> String {
    let params = [
        ("client_id", client_id),
        ("redirect_uri", redirect_uri),
        ("response_type", "code"),
    ];

    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{authorize_endpoint}?{query}")
}

impl ConvertKitClient {
    /// Authorization URL to open in the account owner's browser.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] unless the client holds OAuth
    /// credentials.
    pub fn oauth_authorize_url(&self, redirect_uri: &str) -> Result<String, ApiError> {
        let Credential::OAuth { client_id, .. } = self.credential() else {
            return Err(ApiError::Config(
                "OAuth credentials are required to build an authorize URL".into(),
            ));
        };

        Ok(authorize_url(
            &self.config().oauth_authorize_url,
            &client_id,
            redirect_uri,
        ))
    }

    /// Exchange an authorization code for tokens and store them on the
    /// client.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenSet, ApiError> {
        let (client_id, client_secret) = self.oauth_app_credentials()?;

        self.log(LogLevel::Info, "Exchanging authorization code for tokens.");

        let body = json!({
            "client_id": client_id,
            "client_secret": client_secret,
            "code": code,
            "grant_type": "authorization_code",
            "redirect_uri": redirect_uri,
        });

        let tokens: TokenSet = self
            .execute_json(self.token_request(body)?)
            .await?;
        self.store_tokens(&tokens);
        Ok(tokens)
    }

    /// Obtain a fresh access token using the stored refresh token.
    ///
    /// Single-flight: a refresh that starts while another is in progress
    /// awaits it and adopts its result instead of issuing a second network
    /// call, so a rotated refresh token is never invalidated by a duplicate
    /// request.
    ///
    /// # Errors
    ///
    /// An invalid or expired refresh token surfaces with whatever status
    /// class the provider returns (observed in practice: 5xx, i.e.
    /// [`ApiError::Server`]).
    pub async fn refresh_access_token(&self, redirect_uri: &str) -> Result<TokenSet, ApiError> {
        let (client_id, client_secret) = self.oauth_app_credentials()?;
        let before = self.token_snapshot()?;

        let _flight = self.refresh_flight.lock().await;

        // Someone else completed a refresh while we waited for the guard;
        // adopt their result.
        if self.token_snapshot()? != before {
            if let Some(tokens) = self
                .last_refresh
                .lock()
                .expect("refresh slot poisoned")
                .clone()
            {
                return Ok(tokens);
            }
        }

        let (_, refresh_token) = before;
        let refresh_token = refresh_token.ok_or_else(|| {
            ApiError::Config("no refresh token available for this client".into())
        })?;

        self.log(LogLevel::Info, "Refreshing access token.");

        let body = json!({
            "client_id": client_id,
            "client_secret": client_secret,
            "grant_type": "refresh_token",
            "refresh_token": refresh_token,
            "redirect_uri": redirect_uri,
        });

        let tokens: TokenSet = self
            .execute_json(self.token_request(body)?)
            .await?;
        self.store_tokens(&tokens);
        *self.last_refresh.lock().expect("refresh slot poisoned") = Some(tokens.clone());
        Ok(tokens)
    }

    fn token_request(&self, body: serde_json::Value) -> Result<RequestSpec, ApiError> {
        let url = Url::parse(&self.config().oauth_token_url)
            .map_err(|err| ApiError::Config(format!("invalid OAuth token URL: {err}")))?;
        Ok(RequestSpec::absolute(Method::POST, url)
            .without_auth()
            .body(body))
    }

    fn oauth_app_credentials(&self) -> Result<(String, String), ApiError> {
        match self.credential() {
            Credential::OAuth {
                client_id,
                client_secret,
                ..
            } => Ok((client_id, client_secret)),
            Credential::ApiKey { .. } => Err(ApiError::Config(
                "OAuth credentials are required for token operations".into(),
            )),
        }
    }

    /// Current (access, refresh) token pair; changes whenever a refresh or
    /// exchange lands.
    fn token_snapshot(&self) -> Result<(String, Option<String>), ApiError> {
        match self.credential() {
            Credential::OAuth {
                access_token,
                refresh_token,
                ..
            } => Ok((access_token, refresh_token)),
            Credential::ApiKey { .. } => Err(ApiError::Config(
                "OAuth credentials are required for token operations".into(),
            )),
        }
    }

    /// Replace the stored tokens and keep the masking transform aware of the
    /// new secret material.
    fn store_tokens(&self, tokens: &TokenSet) {
        let mut credential = self.credential.write().expect("credential lock poisoned");
        if let Credential::OAuth {
            access_token,
            refresh_token,
            ..
        } = &mut *credential
        {
            *access_token = tokens.access_token.clone();
            if tokens.refresh_token.is_some() {
                *refresh_token = tokens.refresh_token.clone();
            }
        }
        drop(credential);

        self.debug_log.register_secret(&tokens.access_token);
        if let Some(refresh_token) = &tokens.refresh_token {
            self.debug_log.register_secret(refresh_token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_has_fixed_parameter_order_and_encoding() {
        let url = authorize_url(
            "https://app.convertkit.com/oauth/authorize",
            "client123",
            "https://app/cb",
        );
        assert_eq!(
            url,
            "https://app.convertkit.com/oauth/authorize\
             ?client_id=client123&redirect_uri=https%3A%2F%2Fapp%2Fcb&response_type=code"
        );
    }

    #[test]
    fn token_set_expiry_helpers() {
        let tokens = TokenSet {
            access_token: "access".into(),
            refresh_token: Some("refresh".into()),
            token_type: "Bearer".into(),
            created_at: Utc::now().timestamp(),
            expires_in: 3600,
            scope: Some("public".into()),
        };

        assert!(tokens.expires_at().is_some());
        assert!(!tokens.is_expired(300));
        assert!(tokens.is_expired(7200));
    }

    #[test]
    fn token_set_decodes_provider_response() {
        let tokens: TokenSet = serde_json::from_value(json!({
            "access_token": "example-access-token",
            "refresh_token": "example-refresh-token",
            "token_type": "Bearer",
            "created_at": 1_700_000_000,
            "expires_in": 86_400,
            "scope": "public",
        }))
        .unwrap();

        assert_eq!(tokens.access_token, "example-access-token");
        assert_eq!(tokens.refresh_token.as_deref(), Some("example-refresh-token"));
        assert_eq!(tokens.expires_in, 86_400);
    }
}
