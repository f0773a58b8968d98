//! E2E tests driving the mock server over real HTTP.
//!
//! These exercise the full path a test suite uses: register stubs, start the
//! server, point an HTTP client at `base_url()`, and assert on what comes
//! back over the wire.

use std::path::PathBuf;

use stubnet::{respond_with, FixtureStore, HttpMethod, MockServer, StubResponse};

fn fixture_store() -> FixtureStore {
    FixtureStore::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"))
}

// =============================================================================
// Dispatch Tests
// =============================================================================

#[tokio::test]
async fn test_stubbed_route_serves_fixture_body() {
    let fixtures = fixture_store();
    let expected = fixtures.load_json("sample").expect("sample fixture");

    let mut server = MockServer::new();
    server.register(
        HttpMethod::Get,
        "categories/1",
        respond_with(move |_| {
            fixture_store()
                .json_response("sample")
                .expect("sample fixture")
        }),
    );
    server.start().await.expect("server starts");

    let response = reqwest::get(format!("{}/categories/1", server.base_url()))
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 200);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body, expected);

    server.stop().await;
}

#[tokio::test]
async fn test_unmatched_route_is_not_found() {
    let mut server = MockServer::new();
    server.register(
        HttpMethod::Get,
        "known",
        respond_with(|_| StubResponse::ok()),
    );
    server.start().await.expect("server starts");

    let response = reqwest::get(format!("{}/unknown", server.base_url()))
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), 404);

    server.stop().await;
}

#[tokio::test]
async fn test_method_isolation() {
    let mut server = MockServer::new();
    server.register(HttpMethod::Get, "x", respond_with(|_| StubResponse::ok()));
    server.start().await.expect("server starts");

    let client = reqwest::Client::new();
    let get = client
        .get(format!("{}/x", server.base_url()))
        .send()
        .await
        .expect("GET succeeds");
    assert_eq!(get.status(), 200);

    let post = client
        .post(format!("{}/x", server.base_url()))
        .send()
        .await
        .expect("POST succeeds");
    assert_eq!(post.status(), 404);

    server.stop().await;
}

#[tokio::test]
async fn test_registration_overwrite_last_wins() {
    let mut server = MockServer::new();
    server.register(
        HttpMethod::Get,
        "a",
        respond_with(|_| StubResponse::ok().body("first")),
    );
    server.register(
        HttpMethod::Get,
        "a",
        respond_with(|_| StubResponse::ok().body("second")),
    );
    server.start().await.expect("server starts");

    let body = reqwest::get(format!("{}/a", server.base_url()))
        .await
        .expect("request succeeds")
        .text()
        .await
        .expect("body");
    assert_eq!(body, "second");

    server.stop().await;
}

#[tokio::test]
async fn test_wildcard_precedence_over_http() {
    let mut server = MockServer::new();
    server.register(
        HttpMethod::Get,
        "items/*",
        respond_with(|_| StubResponse::ok().body("wildcard")),
    );
    server.register(
        HttpMethod::Get,
        "items/42",
        respond_with(|_| StubResponse::ok().body("exact")),
    );
    server.start().await.expect("server starts");

    let base = server.base_url();
    let exact = reqwest::get(format!("{base}/items/42"))
        .await
        .expect("request")
        .text()
        .await
        .expect("body");
    assert_eq!(exact, "exact");

    let wild = reqwest::get(format!("{base}/items/7"))
        .await
        .expect("request")
        .text()
        .await
        .expect("body");
    assert_eq!(wild, "wildcard");

    server.stop().await;
}

#[tokio::test]
async fn test_registration_while_running_takes_effect() {
    let mut server = MockServer::new();
    server.start().await.expect("server starts");
    let url = format!("{}/late", server.base_url());

    let before = reqwest::get(&url).await.expect("request");
    assert_eq!(before.status(), 404);

    server.register(
        HttpMethod::Get,
        "late",
        respond_with(|_| StubResponse::ok().body("registered late")),
    );

    let after = reqwest::get(&url).await.expect("request");
    assert_eq!(after.status(), 200);
    assert_eq!(after.text().await.expect("body"), "registered late");

    server.stop().await;
}

#[tokio::test]
async fn test_response_fn_sees_request_details() {
    let mut server = MockServer::new();
    server.register(
        HttpMethod::Post,
        "echo",
        respond_with(|req| {
            let who = req.query_param("who").unwrap_or("nobody").to_string();
            let body = req.body_json().expect("json request body");
            StubResponse::ok().json(serde_json::json!({
                "who": who,
                "sent": body,
                "content_type": req.header("content-type"),
            }))
        }),
    );
    server.start().await.expect("server starts");

    let client = reqwest::Client::new();
    let response: serde_json::Value = client
        .post(format!("{}/echo?who=suite", server.base_url()))
        .json(&serde_json::json!({"id": 1}))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");

    assert_eq!(response["who"], "suite");
    assert_eq!(response["sent"]["id"], 1);
    assert_eq!(response["content_type"], "application/json");

    server.stop().await;
}

#[tokio::test]
async fn test_head_requests_route_like_any_other_method() {
    let mut server = MockServer::new();
    server.register(
        HttpMethod::Head,
        "ping",
        respond_with(|_| StubResponse::no_content()),
    );
    server.start().await.expect("server starts");

    let client = reqwest::Client::new();
    let response = client
        .head(format!("{}/ping", server.base_url()))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), 204);

    server.stop().await;
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[tokio::test]
async fn test_servers_are_isolated_instances() {
    let mut server1 = MockServer::new();
    let mut server2 = MockServer::new();
    server1.register(
        HttpMethod::Get,
        "who",
        respond_with(|_| StubResponse::ok().body("one")),
    );
    server2.register(
        HttpMethod::Get,
        "who",
        respond_with(|_| StubResponse::ok().body("two")),
    );

    server1.start().await.expect("server1 starts");
    server2.start().await.expect("server2 starts");
    assert_ne!(server1.base_url(), server2.base_url());

    let one = reqwest::get(format!("{}/who", server1.base_url()))
        .await
        .expect("request")
        .text()
        .await
        .expect("body");
    let two = reqwest::get(format!("{}/who", server2.base_url()))
        .await
        .expect("request")
        .text()
        .await
        .expect("body");
    assert_eq!(one, "one");
    assert_eq!(two, "two");

    server1.stop().await;
    server2.stop().await;
}

#[tokio::test]
async fn test_stopped_server_refuses_connections() {
    let mut server = MockServer::new();
    server.register(HttpMethod::Get, "up", respond_with(|_| StubResponse::ok()));
    server.start().await.expect("server starts");
    let url = format!("{}/up", server.base_url());

    assert_eq!(reqwest::get(&url).await.expect("request").status(), 200);

    server.stop().await;
    assert!(reqwest::get(&url).await.is_err());

    // Restart and serve again, possibly on a new port.
    server.start().await.expect("restart");
    let url = format!("{}/up", server.base_url());
    assert_eq!(reqwest::get(&url).await.expect("request").status(), 200);

    server.stop().await;
}
