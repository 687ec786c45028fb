//! HTTP-level integration tests for advertiser-scoped topics.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get_auth, post_json_auth, put_json_auth, register_and_token,
};
use serde_json::json;
use sqlx::PgPool;

async fn create_advertiser(app: &axum::Router, token: &str) -> i64 {
    let body = json!({ "name": "주제 테스트 광고주" });
    let response = post_json_auth(app.clone(), "/api/v1/advertisers", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn create_topic(app: &axum::Router, token: &str, advertiser_id: i64, title: &str) -> i64 {
    let body = json!({
        "month": "2025-09-01",
        "title": title,
        "keywords": ["가을", "신메뉴"],
    });
    let uri = format!("/api/v1/advertisers/{advertiser_id}/topics");
    let response = post_json_auth(app.clone(), &uri, body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Creating a topic normalizes the month to its first day and starts in draft.
#[sqlx::test(migrations = "../db/migrations")]
async fn create_normalizes_month_and_starts_draft(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_token(app.clone(), "owner").await;
    let advertiser_id = create_advertiser(&app, &token).await;

    let body = json!({ "month": "2025-09-17", "title": "가을 신메뉴 소개" });
    let uri = format!("/api/v1/advertisers/{advertiser_id}/topics");
    let response = post_json_auth(app, &uri, body, &token).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["month"], "2025-09-01");
    // draft
    assert_eq!(json["data"]["status_id"], 1);
}

/// The month filter accepts `YYYY-MM` and restricts the listing.
#[sqlx::test(migrations = "../db/migrations")]
async fn list_filters_by_month(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_token(app.clone(), "owner").await;
    let advertiser_id = create_advertiser(&app, &token).await;

    create_topic(&app, &token, advertiser_id, "9월 주제").await;
    let body = json!({ "month": "2025-10-01", "title": "10월 주제" });
    let uri = format!("/api/v1/advertisers/{advertiser_id}/topics");
    post_json_auth(app.clone(), &uri, body, &token).await;

    let response = get_auth(app, &format!("{uri}?month=2025-09"), &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "9월 주제");
}

/// A malformed month filter returns 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn malformed_month_filter_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_token(app.clone(), "owner").await;
    let advertiser_id = create_advertiser(&app, &token).await;

    let uri = format!("/api/v1/advertisers/{advertiser_id}/topics?month=September");
    let response = get_auth(app, &uri, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// A topic under one advertiser is invisible through another's path.
#[sqlx::test(migrations = "../db/migrations")]
async fn topics_are_scoped_to_their_advertiser(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_token(app.clone(), "owner").await;
    let first = create_advertiser(&app, &token).await;
    let second = create_advertiser(&app, &token).await;
    let topic_id = create_topic(&app, &token, first, "첫 광고주 주제").await;

    let uri = format!("/api/v1/advertisers/{second}/topics/{topic_id}");
    let response = get_auth(app, &uri, &token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Updating a topic changes only the supplied fields.
#[sqlx::test(migrations = "../db/migrations")]
async fn update_is_partial(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_token(app.clone(), "owner").await;
    let advertiser_id = create_advertiser(&app, &token).await;
    let topic_id = create_topic(&app, &token, advertiser_id, "수정 전 주제").await;

    let body = json!({ "description": "상세 설명 추가" });
    let uri = format!("/api/v1/advertisers/{advertiser_id}/topics/{topic_id}");
    let response = put_json_auth(app, &uri, body, &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "수정 전 주제");
    assert_eq!(json["data"]["description"], "상세 설명 추가");
}

/// Deleting a topic hides it from subsequent reads.
#[sqlx::test(migrations = "../db/migrations")]
async fn delete_hides_the_topic(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_token(app.clone(), "owner").await;
    let advertiser_id = create_advertiser(&app, &token).await;
    let topic_id = create_topic(&app, &token, advertiser_id, "삭제 대상").await;

    let uri = format!("/api/v1/advertisers/{advertiser_id}/topics/{topic_id}");
    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Topic access is authorized through the parent advertiser.
#[sqlx::test(migrations = "../db/migrations")]
async fn topic_access_requires_advertiser_ownership(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_and_token(app.clone(), "owner").await;
    let intruder = register_and_token(app.clone(), "intruder").await;
    let advertiser_id = create_advertiser(&app, &owner).await;

    let body = json!({ "month": "2025-09-01", "title": "남의 주제" });
    let uri = format!("/api/v1/advertisers/{advertiser_id}/topics");
    let response = post_json_auth(app, &uri, body, &intruder).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
