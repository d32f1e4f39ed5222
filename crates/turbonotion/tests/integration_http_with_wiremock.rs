//! End-to-end tests against a mock HTTP server with the default reqwest transport.

use serde_json::{Value, json};
use std::time::Duration;
use turbonotion::{Client, Error, RateLimitConfig, Request};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> turbonotion::NotionClientBuilder {
    Client::builder()
        .auth("secret_test")
        .base_url(server.uri())
}

#[tokio::test]
async fn test_get_with_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/users/me"))
        .and(header("Authorization", "Bearer secret_test"))
        .and(header("Notion-Version", "2022-06-28"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "user",
            "id": "u1",
            "type": "bot",
            "name": "Integration"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).build().unwrap();
    let me = client.execute(&Request::get("/users/me")).await.unwrap();

    assert_eq!(me["name"], "Integration");
}

#[tokio::test]
async fn test_rate_limit_then_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "0")
                .set_body_json(json!({
                    "object": "error",
                    "status": 429,
                    "code": "rate_limited",
                    "message": "Rate limited"
                })),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .and(body_json(json!({ "query": "roadmap" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [],
            "next_cursor": null,
            "has_more": false
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).build().unwrap();
    let results: Vec<Value> = client
        .collect_all(&Request::post("/search").body(json!({ "query": "roadmap" })))
        .await
        .unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn test_pagination_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/blocks/b1/children"))
        .and(query_param("start_cursor", "c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [{ "id": "3" }],
            "next_cursor": null,
            "has_more": false
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/blocks/b1/children"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [{ "id": "1" }, { "id": "2" }],
            "next_cursor": "c2",
            "has_more": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).build().unwrap();
    let collection = client
        .collect_all_with_meta::<Value>(&Request::get("/blocks/b1/children"))
        .await
        .unwrap();

    assert_eq!(collection.page_count, 2);
    assert_eq!(collection.total_count, 3);
}

#[tokio::test]
async fn test_api_error_body_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/v1/pages/p1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "object": "error",
            "status": 401,
            "code": "unauthorized",
            "message": "API token is invalid."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).build().unwrap();
    let err = client
        .execute(&Request::patch("/pages/p1").body(json!({ "archived": true })))
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "API error 401 (unauthorized): API token is invalid.");
}

#[tokio::test]
async fn test_no_content_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/blocks/b1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).build().unwrap();
    let value = client.execute(&Request::delete("/blocks/b1")).await.unwrap();

    assert_eq!(value, json!({}));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "results": [] }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server)
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let err = client.execute(&Request::get("/users")).await.unwrap_err();

    assert!(matches!(err, Error::Timeout(d) if d == Duration::from_millis(200)));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = Client::builder()
        .auth("secret_test")
        .base_url(format!("http://{}", addr))
        .build()
        .unwrap();
    let err = client.execute(&Request::get("/users")).await.unwrap_err();

    assert!(err.is_network(), "expected a network failure, got {:?}", err);
}

#[tokio::test]
async fn test_client_side_rate_limit_still_delivers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1" })))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server)
        .rate_limit(RateLimitConfig {
            requests_per_second: 50,
            burst_size: 3,
        })
        .build()
        .unwrap();

    for _ in 0..3 {
        client.execute(&Request::get("/users/me")).await.unwrap();
    }
}
