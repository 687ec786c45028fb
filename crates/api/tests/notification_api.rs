//! HTTP-level integration tests for the in-app notification inbox.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_auth, register_user};
use postpilot_db::models::notification::CreateNotification;
use postpilot_db::repositories::NotificationRepo;
use sqlx::PgPool;

async fn seed_notification(pool: &PgPool, user_id: i64, title: &str) -> i64 {
    let row = NotificationRepo::create(
        pool,
        &CreateNotification {
            user_id,
            event_id: None,
            title: title.to_string(),
            body: Some("상세 내용".to_string()),
        },
    )
    .await
    .expect("notification seed should succeed");
    row.id
}

/// The inbox lists only the caller's notifications, newest first.
#[sqlx::test(migrations = "../db/migrations")]
async fn inbox_is_per_user(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let first = register_user(app.clone(), "first").await;
    let second = register_user(app.clone(), "second").await;
    let first_id = first["user"]["id"].as_i64().unwrap();
    let second_id = second["user"]["id"].as_i64().unwrap();

    seed_notification(&pool, first_id, "첫 번째 알림").await;
    seed_notification(&pool, second_id, "남의 알림").await;

    let token = first["access_token"].as_str().unwrap();
    let response = get_auth(app, "/api/v1/notifications", token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "첫 번째 알림");
    assert_eq!(rows[0]["is_read"], false);
}

/// The unread counter matches the inbox state.
#[sqlx::test(migrations = "../db/migrations")]
async fn unread_count_tracks_reads(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let auth = register_user(app.clone(), "reader").await;
    let user_id = auth["user"]["id"].as_i64().unwrap();
    let token = auth["access_token"].as_str().unwrap();

    let first = seed_notification(&pool, user_id, "알림 1").await;
    seed_notification(&pool, user_id, "알림 2").await;

    let response = get_auth(app.clone(), "/api/v1/notifications/unread-count", token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["count"], 2);

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/notifications/{first}/read"),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app, "/api/v1/notifications/unread-count", token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["count"], 1);
}

/// `unread_only` filters out rows already read.
#[sqlx::test(migrations = "../db/migrations")]
async fn unread_only_filter_works(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let auth = register_user(app.clone(), "filter").await;
    let user_id = auth["user"]["id"].as_i64().unwrap();
    let token = auth["access_token"].as_str().unwrap();

    let first = seed_notification(&pool, user_id, "읽을 알림").await;
    seed_notification(&pool, user_id, "안 읽은 알림").await;

    post_auth(
        app.clone(),
        &format!("/api/v1/notifications/{first}/read"),
        token,
    )
    .await;

    let response = get_auth(app, "/api/v1/notifications?unread_only=true", token).await;
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "안 읽은 알림");
}

/// Marking another user's notification read returns 404, not 403: the row
/// simply does not exist in the caller's inbox.
#[sqlx::test(migrations = "../db/migrations")]
async fn cannot_read_someone_elses_notification(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let owner = register_user(app.clone(), "owner").await;
    let other = register_user(app.clone(), "other").await;
    let owner_id = owner["user"]["id"].as_i64().unwrap();

    let id = seed_notification(&pool, owner_id, "주인의 알림").await;

    let token = other["access_token"].as_str().unwrap();
    let response = post_auth(app, &format!("/api/v1/notifications/{id}/read"), token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// `read-all` clears the whole inbox in one call.
#[sqlx::test(migrations = "../db/migrations")]
async fn read_all_clears_the_inbox(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let auth = register_user(app.clone(), "bulk").await;
    let user_id = auth["user"]["id"].as_i64().unwrap();
    let token = auth["access_token"].as_str().unwrap();

    for i in 1..=3 {
        seed_notification(&pool, user_id, &format!("알림 {i}")).await;
    }

    let response = post_auth(app.clone(), "/api/v1/notifications/read-all", token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["marked"], 3);

    let response = get_auth(app, "/api/v1/notifications/unread-count", token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["count"], 0);
}
