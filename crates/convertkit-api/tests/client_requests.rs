//! Request engine integration tests: encoding, headers, status
//! classification and the last-response slot.

mod support;

use convertkit_api::resources::subscribers::SubscriberFilter;
use convertkit_api::resources::{SortOrder, SubscriberSortField, SubscriberState};
use convertkit_api::{ApiError, ListOptions, USER_AGENT_VALUE};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{api_key_client, oauth_client};

fn empty_subscriber_page() -> serde_json::Value {
    json!({
        "subscribers": [],
        "pagination": {
            "has_previous_page": false,
            "has_next_page": false,
            "start_cursor": null,
            "end_cursor": null,
            "per_page": 500,
        },
    })
}

#[tokio::test]
async fn get_serializes_filters_into_the_query_string() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/subscribers"))
        .and(query_param("status", "bounced"))
        .and(query_param("sort_field", "updated_at"))
        .and(query_param("sort_order", "asc"))
        .and(query_param("per_page", "25"))
        .and(query_param_is_missing("email_address"))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json; charset=utf-8"))
        .and(header("user-agent", USER_AGENT_VALUE))
        .and(header("authorization", "Bearer access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_subscriber_page()))
        .expect(1)
        .mount(&server)
        .await;

    let client = oauth_client(&server.uri());
    let filter = SubscriberFilter {
        status: Some(SubscriberState::Bounced),
        sort_field: Some(SubscriberSortField::UpdatedAt),
        sort_order: Some(SortOrder::Asc),
        ..SubscriberFilter::default()
    };

    let result = client
        .get_subscribers(&filter, &ListOptions::new().per_page(25))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn api_key_clients_send_x_api_key_instead_of_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/tags"))
        .and(header("x-api-key", "api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tags": [],
            "pagination": {
                "has_previous_page": false,
                "has_next_page": false,
                "per_page": 500,
            },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_key_client(&server.uri());
    let result = client.get_tags(&ListOptions::new()).await;
    assert!(result.is_ok());

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn write_verbs_send_json_bodies_with_content_length() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v4/tags"))
        .and(body_json(json!({"name": "newsletter"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "tag": {"id": 99, "name": "newsletter"},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = oauth_client(&server.uri());
    let result = client.create_tag("newsletter").await.unwrap();
    assert_eq!(result.tag.id, 99);
    assert_eq!(result.tag.name, "newsletter");

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    let content_length = request
        .headers
        .get("content-length")
        .expect("content-length header")
        .to_str()
        .unwrap()
        .parse::<usize>()
        .unwrap();
    assert_eq!(content_length, request.body.len());
}

#[tokio::test]
async fn status_404_with_message_is_a_client_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/broadcasts/12345"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Form does not exist"})),
        )
        .mount(&server)
        .await;

    let client = oauth_client(&server.uri());
    let err = client.get_broadcast(12345).await.unwrap_err();

    assert!(matches!(err, ApiError::Client { status: 404, .. }));
    assert!(err.to_string().contains("Form does not exist"));
}

#[tokio::test]
async fn status_500_is_a_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/segments"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let client = oauth_client(&server.uri());
    let err = client.get_segments(&ListOptions::new()).await.unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 500, body: None }));
}

#[tokio::test]
async fn undecodable_success_body_is_malformed_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/account"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = oauth_client(&server.uri());
    let err = client.get_account().await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::MalformedResponse { status: 200, .. }
    ));
}

#[tokio::test]
async fn last_response_tracks_the_most_recent_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"email": "owner@name.com"},
            "account": {"name": "Test", "plan_type": "free", "primary_email_address": "owner@name.com"},
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/broadcasts/1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .mount(&server)
        .await;

    let client = oauth_client(&server.uri());
    assert!(client.last_response().is_none());

    client.get_account().await.unwrap();
    let last = client.last_response().expect("envelope after success");
    assert_eq!(last.status().as_u16(), 200);
    assert!(last.body().is_some());

    let _ = client.get_broadcast(1).await.unwrap_err();
    let last = client.last_response().expect("envelope after failure");
    assert_eq!(last.status().as_u16(), 404);
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    // Bind then drop a listener so the port refuses connections.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = oauth_client(&format!("http://{addr}"));
    let err = client.get_account().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert!(client.last_response().is_none());
}

#[tokio::test]
async fn empty_filter_values_never_reach_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/subscribers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_subscriber_page()))
        .expect(1)
        .mount(&server)
        .await;

    let client = oauth_client(&server.uri());
    client
        .get_subscribers(&SubscriberFilter::default(), &ListOptions::new())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
}
