//! Cursor pagination integration tests.

mod support;

use convertkit_api::resources::subscribers::SubscriberFilter;
use convertkit_api::{ApiError, ListOptions};
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::oauth_client;

fn page(ids: &[i64], start: &str, end: &str, has_previous: bool, has_next: bool) -> serde_json::Value {
    json!({
        "subscribers": ids
            .iter()
            .map(|id| json!({"id": id, "email_address": format!("s{id}@example.com")}))
            .collect::<Vec<_>>(),
        "pagination": {
            "has_previous_page": has_previous,
            "has_next_page": has_next,
            "start_cursor": start,
            "end_cursor": end,
            "per_page": 1,
        },
    })
}

#[tokio::test]
async fn traversal_follows_end_cursors_until_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/subscribers"))
        .and(query_param_is_missing("after_cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&[1], "s1", "c1", false, true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/subscribers"))
        .and(query_param("after_cursor", "c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&[2], "s2", "c2", true, true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/subscribers"))
        .and(query_param("after_cursor", "c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&[3], "s3", "c3", true, false)))
        .expect(1)
        .mount(&server)
        .await;

    let client = oauth_client(&server.uri());
    let filter = SubscriberFilter::default();

    let mut ids = Vec::new();
    let mut options = ListOptions::new().per_page(1);
    loop {
        let result = client.get_subscribers(&filter, &options).await.unwrap();
        ids.extend(result.subscribers.iter().map(|subscriber| subscriber.id));
        match result.pagination.next_cursor() {
            Some(cursor) => options = ListOptions::after(cursor).per_page(1),
            None => break,
        }
    }

    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn total_count_is_present_only_when_requested() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/subscribers"))
        .and(query_param("include_total_count", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subscribers": [],
            "pagination": {
                "has_previous_page": false,
                "has_next_page": false,
                "per_page": 500,
                "total_count": 1234,
            },
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/subscribers"))
        .and(query_param_is_missing("include_total_count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subscribers": [],
            "pagination": {
                "has_previous_page": false,
                "has_next_page": false,
                "per_page": 500,
            },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = oauth_client(&server.uri());
    let filter = SubscriberFilter::default();

    let with_count = client
        .get_subscribers(&filter, &ListOptions::new().with_total_count())
        .await
        .unwrap();
    assert_eq!(with_count.pagination.total_count, Some(1234));

    let without_count = client
        .get_subscribers(&filter, &ListOptions::new())
        .await
        .unwrap();
    assert_eq!(without_count.pagination.total_count, None);
}

#[tokio::test]
async fn conflicting_cursors_fail_before_any_network_call() {
    let server = MockServer::start().await;
    // No mock mounted: a request would 404 and fail differently.

    let client = oauth_client(&server.uri());
    let options = ListOptions {
        after_cursor: Some("a".into()),
        before_cursor: Some("b".into()),
        ..ListOptions::default()
    };

    let err = client
        .get_subscribers(&SubscriberFilter::default(), &options)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidArgument(_)));

    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}
