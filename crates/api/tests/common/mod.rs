//! Shared helpers for HTTP-level integration tests.
//!
//! [`build_test_app`] assembles the full production middleware stack via
//! [`build_app_router`], with stub scraper and trend-source implementations
//! so no test ever talks to an external provider.

// Each integration test binary uses its own subset of these helpers.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use postpilot_api::auth::jwt::JwtConfig;
use postpilot_api::config::ServerConfig;
use postpilot_api::router::build_app_router;
use postpilot_api::state::AppState;
use postpilot_core::channels::Channel;
use postpilot_events::EventBus;
use postpilot_llm::{LlmClient, LlmConfig};
use postpilot_scrape::{ChannelScraper, ScrapeError, TrendSource, TrendingKeyword};

/// `ServerConfig` used by every integration test.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a fixed JWT secret, and first-admin bootstrap enabled so the first
/// registered account in each test database is an admin.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        job_concurrency: 2,
        job_retention_days: 30,
        bootstrap_first_admin: true,
        jwt: JwtConfig {
            secret: "integration-test-secret-key".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Channel scraper stub returning a canned raw payload.
///
/// Handler tests only ever enqueue sync jobs; the executor that would call
/// this never runs because the dispatcher is not started in tests.
pub struct StubScraper;

#[async_trait]
impl ChannelScraper for StubScraper {
    async fn scrape(&self, _channel: Channel, handle: &str) -> Result<Value, ScrapeError> {
        Ok(json!([{ "username": handle, "followersCount": 1234, "postsCount": 56 }]))
    }
}

/// Trend source stub with a single fixed keyword.
pub struct StubTrendSource;

#[async_trait]
impl TrendSource for StubTrendSource {
    fn source_name(&self) -> &'static str {
        "stub"
    }

    async fn trending_keywords(&self) -> Result<Vec<TrendingKeyword>, ScrapeError> {
        Ok(vec![TrendingKeyword {
            keyword: "테스트 키워드".to_string(),
            category: None,
            rank: Some(1),
        }])
    }
}

/// Assemble the app router over `pool` with every middleware layer on.
///
/// Mirrors the production wiring in `main.rs` so integration tests exercise
/// the same middleware stack (CORS, request ID, timeout, tracing, panic
/// recovery). The LLM client points at a closed local port; nothing in the
/// handler layer calls it.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();

    let llm_config = LlmConfig {
        api_key: "test-key".to_string(),
        base_url: "http://127.0.0.1:9".to_string(),
        model: "test-model".to_string(),
    };
    let llm = LlmClient::new(llm_config).expect("test LLM client should build");

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(EventBus::default()),
        llm: Arc::new(llm),
        scraper: Arc::new(StubScraper),
        trend_source: Arc::new(StubTrendSource),
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn request(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    };
    app.oneshot(request).await.expect("request should not fail")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    request(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    request(app, Method::GET, uri, None, Some(token)).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    request(app, Method::POST, uri, Some(body), None).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    request(app, Method::POST, uri, Some(body), Some(token)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    request(app, Method::POST, uri, None, Some(token)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    request(app, Method::PUT, uri, Some(body), Some(token)).await
}

pub async fn patch_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    request(app, Method::PATCH, uri, Some(body), Some(token)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    request(app, Method::DELETE, uri, None, Some(token)).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

// ---------------------------------------------------------------------------
// Account helpers
// ---------------------------------------------------------------------------

/// Password used for every account created through [`register_user`].
pub const TEST_PASSWORD: &str = "test-password-123";

/// Register an account through the API and return the auth JSON
/// (`access_token`, `refresh_token`, `user`).
///
/// The first account registered against a fresh test database gets the
/// admin role; later accounts are marketers.
pub async fn register_user(app: Router, username: &str) -> Value {
    let body = json!({
        "username": username,
        "email": format!("{username}@test.com"),
        "password": TEST_PASSWORD,
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Register an account and return just its access token.
pub async fn register_and_token(app: Router, username: &str) -> String {
    let json = register_user(app, username).await;
    json["access_token"]
        .as_str()
        .expect("register response must contain access_token")
        .to_string()
}

/// Register an admin (first account) and a marketer, returning
/// `(admin_token, marketer_token)`.
pub async fn admin_and_marketer(app: &Router) -> (String, String) {
    let admin = register_and_token(app.clone(), "admin").await;
    let marketer = register_and_token(app.clone(), "marketer").await;
    (admin, marketer)
}
