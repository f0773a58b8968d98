//! Minimal end-to-end walkthrough: stub two endpoints, start the server,
//! hit it with a plain HTTP client and print what comes back.
//!
//! Run with: cargo run --example basic

use stubnet::{respond_with, HttpMethod, MockServer, StubResponse};

#[tokio::main]
async fn main() -> stubnet::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut server = MockServer::new();
    server.register(
        HttpMethod::Get,
        "categories/1",
        respond_with(|_| {
            StubResponse::ok().json(serde_json::json!({
                "id": 1,
                "name": "peripherals",
            }))
        }),
    );
    server.register(
        HttpMethod::Get,
        "api/orders/*/status",
        respond_with(|req| {
            StubResponse::ok().json(serde_json::json!({
                "path": req.path(),
                "status": "shipped",
            }))
        }),
    );

    let port = server.start().await?;
    println!("mock server listening on port {port}");

    let category = reqwest::get(format!("{}/categories/1", server.base_url()))
        .await
        .expect("category request")
        .text()
        .await
        .expect("category body");
    println!("GET /categories/1 -> {category}");

    let status = reqwest::get(format!("{}/api/orders/42/status", server.base_url()))
        .await
        .expect("status request")
        .text()
        .await
        .expect("status body");
    println!("GET /api/orders/42/status -> {status}");

    server.stop().await;
    Ok(())
}
