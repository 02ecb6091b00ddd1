//! Integration tests for `UnlockerClient` against a wiremock proxy.

use std::time::Duration;

use common::{env_config::UnlockerConfig, error::AppError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unlocker::UnlockerClient;

fn test_client(server: &MockServer) -> UnlockerClient {
    UnlockerClient::new(UnlockerConfig {
        api_url: format!("{}/request", server.uri()),
        api_key: "proxy-key".to_string(),
        zone: "test_zone".to_string(),
        country: "US".to_string(),
        timeout: Duration::from_secs(5),
    })
    .expect("failed to build test UnlockerClient")
}

#[tokio::test]
async fn fetch_page_sends_clean_url_in_get_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/request"))
        .and(header("authorization", "Bearer proxy-key"))
        .and(body_partial_json(json!({
            "url": "https://site.example/stores/author/A123/allbooks",
            "zone": "test_zone",
            "format": "raw",
            "method": "GET",
            "country": "US"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let html = test_client(&server)
        .fetch_page("https://site.example/stores/author/A123/allbooks?ref=xyz")
        .await
        .expect("fetch should succeed");

    assert_eq!(html, "<html></html>");
}

#[tokio::test]
async fn fetch_page_surfaces_upstream_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/request"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let result = test_client(&server)
        .fetch_page("https://site.example/stores/author/A123/allbooks")
        .await;

    match result {
        Err(AppError::UpstreamFetch { status }) => assert_eq!(status, 429),
        other => panic!("expected UpstreamFetch, got: {other:?}"),
    }
}

#[tokio::test]
async fn post_json_wraps_body_and_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/request"))
        .and(body_partial_json(json!({
            "url": "https://site.example/juvec",
            "method": "POST",
            "body": "{\"ASINList\":[\"B02\"]}",
            "headers": { "X-Requested-With": "XMLHttpRequest" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let reply: serde_json::Value = test_client(&server)
        .post_json(
            "https://site.example/juvec",
            &json!({ "ASINList": ["B02"] }),
            &[("X-Requested-With", "XMLHttpRequest")],
        )
        .await
        .expect("post should succeed");

    assert_eq!(reply, json!({ "products": [] }));
}

#[tokio::test]
async fn slow_proxy_is_reported_as_gateway_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/request"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let client = UnlockerClient::new(UnlockerConfig {
        api_url: format!("{}/request", server.uri()),
        api_key: "proxy-key".to_string(),
        zone: "test_zone".to_string(),
        country: "US".to_string(),
        timeout: Duration::from_millis(200),
    })
    .unwrap();

    match client.fetch_page("https://site.example/").await {
        Err(AppError::UpstreamFetch { status }) => assert_eq!(status, 504),
        other => panic!("expected UpstreamFetch 504, got: {other:?}"),
    }
}
