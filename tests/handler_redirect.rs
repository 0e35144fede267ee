mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use common::MockConnectInfoLayer;
use sqlx::PgPool;
use std::sync::Arc;
use tinylink::api::handlers::redirect_handler;
use tinylink::infrastructure::cache::NullCache;
use tinylink::state::AppSettings;

fn server_for(state: tinylink::AppState) -> TestServer {
    let app = Router::new()
        .route("/{code}", get(redirect_handler))
        .layer(MockConnectInfoLayer)
        .with_state(state);

    TestServer::new(app).unwrap()
}

#[sqlx::test]
async fn test_redirect_success(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool.clone());
    let server = server_for(state);

    common::create_test_link(&pool, "redir01", "https://example.com/target").await;

    let response = server.get("/redir01").await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "https://example.com/target");
}

#[sqlx::test]
async fn test_redirect_not_found(pool: PgPool) {
    let (state, mut rx) = common::create_test_state(pool);
    let server = server_for(state);

    let response = server.get("/notfound").await;

    response.assert_status_not_found();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["message"], "Short URL not found");
    assert!(rx.try_recv().is_err());
}

#[sqlx::test]
async fn test_redirect_malformed_code_not_found(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool);
    let server = server_for(state);

    let response = server.get("/favicon.ico").await;

    response.assert_status_not_found();
}

#[sqlx::test]
async fn test_redirect_records_click(pool: PgPool) {
    let (state, mut rx) = common::create_test_state(pool.clone());
    let server = server_for(state);

    common::create_test_link(&pool, "clickme", "https://example.com").await;

    let response = server.get("/clickme").await;
    assert_eq!(response.status_code(), 307);

    let event = rx.try_recv().unwrap();
    assert_eq!(event.short_code, "clickme");
    assert_eq!(event.client_address.as_deref(), Some("127.0.0.1"));
}

#[sqlx::test]
async fn test_redirect_ignores_forwarded_for_by_default(pool: PgPool) {
    let (state, mut rx) = common::create_test_state(pool.clone());
    let server = server_for(state);

    common::create_test_link(&pool, "direct1", "https://example.com").await;

    server
        .get("/direct1")
        .add_header("X-Forwarded-For", "203.0.113.7")
        .await;

    let event = rx.try_recv().unwrap();
    assert_eq!(event.client_address.as_deref(), Some("127.0.0.1"));
}

#[sqlx::test]
async fn test_redirect_behind_proxy_uses_forwarded_for(pool: PgPool) {
    let settings = AppSettings {
        behind_proxy: true,
        ..AppSettings::default()
    };
    let (state, mut rx) =
        common::create_test_state_with(pool.clone(), Arc::new(NullCache::new()), settings, 100);
    let server = server_for(state);

    common::create_test_link(&pool, "proxied", "https://example.com").await;

    server
        .get("/proxied")
        .add_header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
        .await;

    let event = rx.try_recv().unwrap();
    assert_eq!(event.client_address.as_deref(), Some("203.0.113.7"));
}

#[sqlx::test]
async fn test_redirect_survives_full_click_queue(pool: PgPool) {
    let (state, _rx) = common::create_test_state_with(
        pool.clone(),
        Arc::new(NullCache::new()),
        AppSettings::default(),
        1,
    );
    let server = server_for(state);

    common::create_test_link(&pool, "busy123", "https://example.com/busy").await;

    // The receiver is never drained: the second click finds the queue full.
    for _ in 0..3 {
        let response = server.get("/busy123").await;
        assert_eq!(response.status_code(), 307);
        assert_eq!(response.header("location"), "https://example.com/busy");
    }
}

#[sqlx::test]
async fn test_redirect_survives_closed_click_queue(pool: PgPool) {
    let (state, rx) = common::create_test_state(pool.clone());
    drop(rx);
    let server = server_for(state);

    common::create_test_link(&pool, "closed1", "https://example.com/closed").await;

    let response = server.get("/closed1").await;

    assert_eq!(response.status_code(), 307);
}

#[sqlx::test]
async fn test_redirect_encodes_unsafe_location_bytes(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool.clone());
    let server = server_for(state);

    common::create_test_link(&pool, "ctrl001", "https://a.example/\nx").await;
    common::create_test_link(&pool, "text001", "see the docs").await;
    common::create_test_link(&pool, "utf8001", "https://example.com/パス").await;

    let response = server.get("/ctrl001").await;
    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "https://a.example/%0Ax");

    let response = server.get("/text001").await;
    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "see%20the%20docs");

    let response = server.get("/utf8001").await;
    assert_eq!(response.status_code(), 307);
    assert_eq!(
        response.header("location"),
        "https://example.com/%E3%83%91%E3%82%B9"
    );
}

#[sqlx::test]
async fn test_shortened_url_with_newline_redirects(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool);
    let app = tinylink::api::routes::public_routes()
        .layer(MockConnectInfoLayer)
        .with_state(state);
    let server = TestServer::new(app).unwrap();

    let response = server
        .post("/shorten")
        .add_header("Host", "s.example.com")
        .json(&serde_json::json!({ "original_url": "https://a.example/\nx" }))
        .await;
    response.assert_status_ok();

    let short_url = response.json::<serde_json::Value>()["short_url"]
        .as_str()
        .unwrap()
        .to_string();
    let code = short_url.rsplit('/').next().unwrap();

    let response = server.get(&format!("/{code}")).await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "https://a.example/%0Ax");
}
