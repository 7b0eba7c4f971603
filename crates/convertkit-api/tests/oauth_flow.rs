//! OAuth token lifecycle integration tests.

mod support;

use convertkit_api::{ApiError, Credential};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::oauth_client;

fn token_body(access: &str, refresh: &str) -> serde_json::Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "token_type": "Bearer",
        "created_at": 1_700_000_000,
        "expires_in": 86_400,
        "scope": "public",
    })
}

#[tokio::test]
async fn authorize_url_is_deterministic() {
    let client = oauth_client("http://unused.invalid");
    let url = client.oauth_authorize_url("https://app/cb").unwrap();
    assert_eq!(
        url,
        "https://app.convertkit.com/oauth/authorize\
         ?client_id=client-id&redirect_uri=https%3A%2F%2Fapp%2Fcb&response_type=code"
    );
}

#[tokio::test]
async fn exchange_code_posts_grant_and_rotates_stored_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_partial_json(json!({
            "client_id": "client-id",
            "client_secret": "client-secret",
            "code": "auth-code",
            "grant_type": "authorization_code",
            "redirect_uri": "https://app/cb",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("example-access-token", "example-refresh-token")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = oauth_client(&server.uri());
    let tokens = client.exchange_code("auth-code", "https://app/cb").await.unwrap();

    assert_eq!(tokens.access_token, "example-access-token");
    assert_eq!(tokens.token_type, "Bearer");
    assert_eq!(tokens.scope.as_deref(), Some("public"));

    // The client now authenticates with the exchanged token.
    match client.credential() {
        Credential::OAuth {
            access_token,
            refresh_token,
            ..
        } => {
            assert_eq!(access_token, "example-access-token");
            assert_eq!(refresh_token.as_deref(), Some("example-refresh-token"));
        }
        other => panic!("expected OAuth credential, got {other:?}"),
    }
}

#[tokio::test]
async fn refreshed_token_is_used_by_subsequent_calls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_partial_json(json!({
            "grant_type": "refresh_token",
            "refresh_token": "refresh-token",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("new-access-token", "new-refresh-token")),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v4/account"))
        .and(header("authorization", "Bearer new-access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "account": {"name": "Test", "plan_type": "free", "primary_email_address": "o@n.com"},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = oauth_client(&server.uri());
    let tokens = client.refresh_access_token("https://app/cb").await.unwrap();
    assert_eq!(tokens.access_token, "new-access-token");

    let account = client.get_account().await.unwrap();
    assert_eq!(account.account.name.as_deref(), Some("Test"));
}

// The 5xx class for a bad refresh token is the provider's observed
// behavior, pinned here as a recorded fixture rather than a contract.
#[tokio::test]
async fn invalid_refresh_token_surfaces_as_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "server_error"})),
        )
        .mount(&server)
        .await;

    let client = oauth_client(&server.uri());
    let err = client
        .refresh_access_token("https://app/cb")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 500, .. }));
}

#[tokio::test]
async fn concurrent_refreshes_share_one_network_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("rotated-access-token", "rotated-refresh-token")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = oauth_client(&server.uri());
    let (first, second) = tokio::join!(
        client.refresh_access_token("https://app/cb"),
        client.refresh_access_token("https://app/cb"),
    );

    let first = first.unwrap();
    let second = second.unwrap();
    assert_eq!(first.access_token, "rotated-access-token");
    assert_eq!(second.access_token, first.access_token);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn token_operations_require_oauth_credentials() {
    let client = support::api_key_client("http://unused.invalid");

    assert!(matches!(
        client.oauth_authorize_url("https://app/cb"),
        Err(ApiError::Config(_))
    ));
    assert!(matches!(
        client.refresh_access_token("https://app/cb").await,
        Err(ApiError::Config(_))
    ));
}
