//! HTTP-level integration tests for job tracking: listing, cancel, retry.
//!
//! Jobs are seeded directly through `JobRepo` because the dispatcher is not
//! running in tests; only the HTTP surface is under test here.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_auth, register_user};
use postpilot_db::models::job::{EnqueueJob, JOB_TYPE_SYNC};
use postpilot_db::repositories::JobRepo;
use serde_json::json;
use sqlx::PgPool;

async fn enqueue_job(pool: &PgPool, submitted_by: i64) -> i64 {
    let job = JobRepo::enqueue(
        pool,
        &EnqueueJob {
            job_type: JOB_TYPE_SYNC.to_string(),
            submitted_by,
            parameters: json!({ "advertiser_id": 1 }),
        },
    )
    .await
    .expect("enqueue should succeed");
    job.id
}

/// Drive a pending job to `failed` the way the dispatcher would.
async fn fail_job(pool: &PgPool, job_id: i64) {
    let claimed = JobRepo::claim_next(pool)
        .await
        .expect("claim should succeed")
        .expect("a pending job should exist");
    assert_eq!(claimed.id, job_id);
    JobRepo::mark_started(pool, job_id)
        .await
        .expect("mark_started should succeed");
    JobRepo::fail(pool, job_id, "수집 실패", None)
        .await
        .expect("fail should succeed");
}

/// Marketers see only their own jobs; admins see everything.
#[sqlx::test(migrations = "../db/migrations")]
async fn listing_is_owner_scoped(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let admin = register_user(app.clone(), "admin").await;
    let marketer = register_user(app.clone(), "marketer").await;
    let admin_id = admin["user"]["id"].as_i64().unwrap();
    let marketer_id = marketer["user"]["id"].as_i64().unwrap();

    enqueue_job(&pool, admin_id).await;
    enqueue_job(&pool, marketer_id).await;

    let token = marketer["access_token"].as_str().unwrap();
    let response = get_auth(app.clone(), "/api/v1/jobs", token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let token = admin["access_token"].as_str().unwrap();
    let response = get_auth(app, "/api/v1/jobs", token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

/// Reading another user's job returns 403.
#[sqlx::test(migrations = "../db/migrations")]
async fn cross_user_job_access_is_forbidden(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let _admin = register_user(app.clone(), "admin").await;
    let owner = register_user(app.clone(), "owner").await;
    let other = register_user(app.clone(), "other").await;
    let owner_id = owner["user"]["id"].as_i64().unwrap();

    let job_id = enqueue_job(&pool, owner_id).await;

    let token = other["access_token"].as_str().unwrap();
    let response = get_auth(app, &format!("/api/v1/jobs/{job_id}"), token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// A pending job can be cancelled; the status flips to `cancelled`.
#[sqlx::test(migrations = "../db/migrations")]
async fn pending_job_can_be_cancelled(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let auth = register_user(app.clone(), "owner").await;
    let user_id = auth["user"]["id"].as_i64().unwrap();
    let token = auth["access_token"].as_str().unwrap();

    let job_id = enqueue_job(&pool, user_id).await;

    let response = post_auth(app, &format!("/api/v1/jobs/{job_id}/cancel"), token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    // cancelled
    assert_eq!(json["data"]["status_id"], 5);
    assert!(json["data"]["completed_at"].is_string());
}

/// Cancelling a job that already finished returns 409.
#[sqlx::test(migrations = "../db/migrations")]
async fn terminal_job_cannot_be_cancelled(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let auth = register_user(app.clone(), "owner").await;
    let user_id = auth["user"]["id"].as_i64().unwrap();
    let token = auth["access_token"].as_str().unwrap();

    let job_id = enqueue_job(&pool, user_id).await;
    fail_job(&pool, job_id).await;

    let response = post_auth(app, &format!("/api/v1/jobs/{job_id}/cancel"), token).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Retrying a failed job enqueues a fresh job linked to the original.
#[sqlx::test(migrations = "../db/migrations")]
async fn failed_job_can_be_retried(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let auth = register_user(app.clone(), "owner").await;
    let user_id = auth["user"]["id"].as_i64().unwrap();
    let token = auth["access_token"].as_str().unwrap();

    let job_id = enqueue_job(&pool, user_id).await;
    fail_job(&pool, job_id).await;

    let response = post_auth(app, &format!("/api/v1/jobs/{job_id}/retry"), token).await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["retry_of_job_id"], job_id);
    assert_eq!(json["data"]["status_id"], 1);
    assert_eq!(json["data"]["job_type"], "advertiser.sync");
    // Parameters carry over.
    assert_eq!(json["data"]["parameters"]["advertiser_id"], 1);
}

/// Only failed jobs are retryable.
#[sqlx::test(migrations = "../db/migrations")]
async fn pending_job_cannot_be_retried(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let auth = register_user(app.clone(), "owner").await;
    let user_id = auth["user"]["id"].as_i64().unwrap();
    let token = auth["access_token"].as_str().unwrap();

    let job_id = enqueue_job(&pool, user_id).await;

    let response = post_auth(app, &format!("/api/v1/jobs/{job_id}/retry"), token).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// The status filter narrows the listing.
#[sqlx::test(migrations = "../db/migrations")]
async fn status_filter_narrows_listing(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let auth = register_user(app.clone(), "owner").await;
    let user_id = auth["user"]["id"].as_i64().unwrap();
    let token = auth["access_token"].as_str().unwrap();

    let failed_id = enqueue_job(&pool, user_id).await;
    fail_job(&pool, failed_id).await;
    enqueue_job(&pool, user_id).await;

    // 4 = failed
    let response = get_auth(app, "/api/v1/jobs?status_id=4", token).await;
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], failed_id);
}
