//! Shared helpers for the integration suites.

#![allow(dead_code)]

use convertkit_api::{ConvertKitClient, Credential};

/// OAuth client pointed at a mock server.
pub fn oauth_client(base_url: &str) -> ConvertKitClient {
    ConvertKitClient::builder()
        .api_url(base_url)
        .oauth_token_url(format!("{base_url}/oauth/token"))
        .credential(Credential::oauth(
            "client-id",
            "client-secret",
            "access-token",
            Some("refresh-token".to_string()),
        ))
        .build()
        .expect("client")
}

/// Legacy API key client pointed at a mock server.
pub fn api_key_client(base_url: &str) -> ConvertKitClient {
    ConvertKitClient::builder()
        .api_url(base_url)
        .credential(Credential::api_key("api-key", Some("api-secret".to_string())))
        .build()
        .expect("client")
}
