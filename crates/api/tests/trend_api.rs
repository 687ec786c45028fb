//! HTTP-level integration tests for the shared trend pool.

mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{admin_and_marketer, body_json, get_auth, post_auth};
use postpilot_db::models::trend::UpsertTrend;
use postpilot_db::repositories::TrendRepo;
use sqlx::PgPool;

async fn seed_trend(pool: &PgPool, keyword: &str, rank: i32) {
    TrendRepo::upsert(
        pool,
        &UpsertTrend {
            keyword: keyword.to_string(),
            source: "google_trends".to_string(),
            category: Some("음식".to_string()),
            rank: Some(rank),
            collected_on: Utc::now().date_naive(),
        },
    )
    .await
    .expect("trend seed should succeed");
}

/// Trends are a shared pool: every authenticated user sees the same rows.
#[sqlx::test(migrations = "../db/migrations")]
async fn trends_are_shared_across_tenants(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (admin, marketer) = admin_and_marketer(&app).await;

    seed_trend(&pool, "흑백요리사", 1).await;
    seed_trend(&pool, "추석 선물", 2).await;

    for token in [&admin, &marketer] {
        let response = get_auth(app.clone(), "/api/v1/trends", token).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let rows = json["data"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        // Rank order.
        assert_eq!(rows[0]["keyword"], "흑백요리사");
    }
}

/// The listing requires authentication.
#[sqlx::test(migrations = "../db/migrations")]
async fn trends_require_auth(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::get(app, "/api/v1/trends").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// The source filter narrows the listing.
#[sqlx::test(migrations = "../db/migrations")]
async fn source_filter_narrows_results(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (admin, _) = admin_and_marketer(&app).await;
    seed_trend(&pool, "키워드", 1).await;

    let response = get_auth(app.clone(), "/api/v1/trends?source=google_trends", &admin).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let response = get_auth(app, "/api/v1/trends?source=naver", &admin).await;
    let json = body_json(response).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

/// Re-collecting the same keyword on the same day updates rank in place.
#[sqlx::test(migrations = "../db/migrations")]
async fn upsert_replaces_same_day_rank(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (admin, _) = admin_and_marketer(&app).await;

    seed_trend(&pool, "같은 키워드", 5).await;
    seed_trend(&pool, "같은 키워드", 1).await;

    let response = get_auth(app, "/api/v1/trends", &admin).await;
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1, "same-day upsert must not duplicate");
    assert_eq!(rows[0]["rank"], 1);
}

/// Only admins may trigger a manual trend refresh.
#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_is_admin_only(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (admin, marketer) = admin_and_marketer(&app).await;

    let response = post_auth(app.clone(), "/api/v1/trends/refresh", &marketer).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_auth(app, "/api/v1/trends/refresh", &admin).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["job_type"], "trends.refresh");
}
