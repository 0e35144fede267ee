mod common;

use axum::{Router, routing::post};
use axum_test::TestServer;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tinylink::api::handlers::shorten_handler;
use tinylink::infrastructure::cache::NullCache;
use tinylink::state::AppSettings;

fn server_for(state: tinylink::AppState) -> TestServer {
    let app = Router::new()
        .route("/shorten", post(shorten_handler))
        .with_state(state);

    TestServer::new(app).unwrap()
}

#[sqlx::test]
async fn test_shorten_success(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool.clone());
    let server = server_for(state);

    let response = server
        .post("/shorten")
        .add_header("Host", "s.example.com")
        .json(&json!({ "original_url": "https://example.com/very/long/path" }))
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    let short_url = json["short_url"].as_str().unwrap();
    let code = short_url.strip_prefix("http://s.example.com/").unwrap();

    assert_eq!(code.len(), 7);
    assert!(code.bytes().all(|b| b.is_ascii_alphanumeric()));

    let stored: String = sqlx::query_scalar("SELECT original_url FROM urls WHERE short_code = $1")
        .bind(code)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, "https://example.com/very/long/path");
}

#[sqlx::test]
async fn test_shorten_response_has_only_short_url(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool);
    let server = server_for(state);

    let response = server
        .post("/shorten")
        .add_header("Host", "s.example.com")
        .json(&json!({ "original_url": "https://example.com" }))
        .await;

    let json = response.json::<serde_json::Value>();
    let fields = json.as_object().unwrap();
    assert_eq!(fields.len(), 1);
    assert!(fields.contains_key("short_url"));
}

#[sqlx::test]
async fn test_shorten_same_url_twice_gives_distinct_codes(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool.clone());
    let server = server_for(state);

    let mut short_urls = Vec::new();
    for _ in 0..2 {
        let response = server
            .post("/shorten")
            .add_header("Host", "s.example.com")
            .json(&json!({ "original_url": "https://example.com/same" }))
            .await;
        response.assert_status_ok();
        short_urls.push(response.json::<serde_json::Value>()["short_url"].clone());
    }

    assert_ne!(short_urls[0], short_urls[1]);
    assert_eq!(common::count_links(&pool).await, 2);
}

#[sqlx::test]
async fn test_shorten_accepts_non_url_text(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool);
    let server = server_for(state);

    let response = server
        .post("/shorten")
        .add_header("Host", "s.example.com")
        .json(&json!({ "original_url": "just some text" }))
        .await;

    response.assert_status_ok();
}

#[sqlx::test]
async fn test_shorten_empty_url_rejected(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool.clone());
    let server = server_for(state);

    let response = server
        .post("/shorten")
        .add_header("Host", "s.example.com")
        .json(&json!({ "original_url": "" }))
        .await;

    response.assert_status_bad_request();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(common::count_links(&pool).await, 0);
}

#[sqlx::test]
async fn test_shorten_missing_field_rejected(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool);
    let server = server_for(state);

    let response = server
        .post("/shorten")
        .add_header("Host", "s.example.com")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    assert!(response.status_code().is_client_error());
}

#[sqlx::test]
async fn test_shorten_uses_configured_base_url(pool: PgPool) {
    let settings = AppSettings {
        base_url: Some("https://sho.rt/".to_string()),
        ..AppSettings::default()
    };
    let (state, _rx) =
        common::create_test_state_with(pool, Arc::new(NullCache::new()), settings, 100);
    let server = server_for(state);

    let response = server
        .post("/shorten")
        .add_header("Host", "internal:3000")
        .json(&json!({ "original_url": "https://example.com" }))
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert!(
        json["short_url"]
            .as_str()
            .unwrap()
            .starts_with("https://sho.rt/")
    );
}

#[sqlx::test]
async fn test_shorten_behind_proxy_uses_forwarded_host(pool: PgPool) {
    let settings = AppSettings {
        behind_proxy: true,
        ..AppSettings::default()
    };
    let (state, _rx) =
        common::create_test_state_with(pool, Arc::new(NullCache::new()), settings, 100);
    let server = server_for(state);

    let response = server
        .post("/shorten")
        .add_header("Host", "app:3000")
        .add_header("X-Forwarded-Host", "s.example.com")
        .add_header("X-Forwarded-Proto", "https")
        .json(&json!({ "original_url": "https://example.com" }))
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert!(
        json["short_url"]
            .as_str()
            .unwrap()
            .starts_with("https://s.example.com/")
    );
}

#[sqlx::test]
async fn test_shorten_missing_host_header(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool);
    let server = server_for(state);

    let response = server
        .post("/shorten")
        .json(&json!({ "original_url": "https://example.com" }))
        .await;

    response.assert_status_bad_request();
}
