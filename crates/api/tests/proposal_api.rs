//! HTTP-level integration tests for proposal links: creation, the public
//! token page, the one-shot client decision, and revocation.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, get, get_auth, post_auth, post_json, post_json_auth, register_and_token,
};
use serde_json::json;
use sqlx::PgPool;

async fn create_advertiser(app: &axum::Router, token: &str) -> i64 {
    let body = json!({ "name": "제안 테스트 광고주" });
    let response = post_json_auth(app.clone(), "/api/v1/advertisers", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn create_topic(app: &axum::Router, token: &str, advertiser_id: i64, title: &str) -> i64 {
    let body = json!({ "month": "2025-09-01", "title": title });
    let uri = format!("/api/v1/advertisers/{advertiser_id}/topics");
    let response = post_json_auth(app.clone(), &uri, body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Create a proposal for September and return `(proposal_id, share_token)`.
async fn create_proposal(app: &axum::Router, token: &str, advertiser_id: i64) -> (i64, String) {
    let body = json!({
        "advertiser_id": advertiser_id,
        "month": "2025-09-01",
        "title": "9월 콘텐츠 제안",
        "message": "검토 부탁드립니다",
    });
    let response = post_json_auth(app.clone(), "/api/v1/proposals", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    (
        json["data"]["id"].as_i64().unwrap(),
        json["data"]["token"].as_str().unwrap().to_string(),
    )
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Creating a proposal issues a share token and flips the month's draft
/// topics to `proposed`.
#[sqlx::test(migrations = "../db/migrations")]
async fn create_issues_token_and_marks_topics(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_token(app.clone(), "owner").await;
    let advertiser_id = create_advertiser(&app, &token).await;
    let topic_id = create_topic(&app, &token, advertiser_id, "가을 신메뉴").await;

    let (_, share_token) = create_proposal(&app, &token, advertiser_id).await;
    assert!(share_token.len() >= 32, "share token should be unguessable");

    let uri = format!("/api/v1/advertisers/{advertiser_id}/topics/{topic_id}");
    let response = get_auth(app, &uri, &token).await;
    let json = body_json(response).await;
    // proposed
    assert_eq!(json["data"]["status_id"], 2);
}

/// A proposal for a month with no topics is rejected with 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn create_requires_topics(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_token(app.clone(), "owner").await;
    let advertiser_id = create_advertiser(&app, &token).await;

    let body = json!({
        "advertiser_id": advertiser_id,
        "month": "2025-09-01",
        "title": "빈 제안",
    });
    let response = post_json_auth(app, "/api/v1/proposals", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Only one pending proposal may exist per advertiser and month.
#[sqlx::test(migrations = "../db/migrations")]
async fn one_pending_proposal_per_month(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_token(app.clone(), "owner").await;
    let advertiser_id = create_advertiser(&app, &token).await;
    create_topic(&app, &token, advertiser_id, "주제").await;

    create_proposal(&app, &token, advertiser_id).await;

    let body = json!({
        "advertiser_id": advertiser_id,
        "month": "2025-09-15",
        "title": "중복 제안",
    });
    let response = post_json_auth(app, "/api/v1/proposals", body, &token).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Public page
// ---------------------------------------------------------------------------

/// The public page needs no auth and shows the advertiser name and topics,
/// but no internal ownership data.
#[sqlx::test(migrations = "../db/migrations")]
async fn public_page_shows_topics_without_auth(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_token(app.clone(), "owner").await;
    let advertiser_id = create_advertiser(&app, &token).await;
    create_topic(&app, &token, advertiser_id, "공개 주제").await;
    let (_, share_token) = create_proposal(&app, &token, advertiser_id).await;

    let response = get(app, &format!("/api/v1/p/{share_token}")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["advertiser_name"], "제안 테스트 광고주");
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["topics"][0]["title"], "공개 주제");
    // Internal fields stay internal.
    assert!(json["data"].get("advertiser_id").is_none());
    assert!(json["data"].get("created_by").is_none());
}

/// An unknown token returns 404 without leaking whether it ever existed.
#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_token_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/p/nonexistent-token-value").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// A revoked proposal link returns 410 Gone.
#[sqlx::test(migrations = "../db/migrations")]
async fn revoked_link_is_gone(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_token(app.clone(), "owner").await;
    let advertiser_id = create_advertiser(&app, &token).await;
    create_topic(&app, &token, advertiser_id, "주제").await;
    let (proposal_id, share_token) = create_proposal(&app, &token, advertiser_id).await;

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/proposals/{proposal_id}/revoke"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(app, &format!("/api/v1/p/{share_token}")).await;
    assert_eq!(response.status(), StatusCode::GONE);
}

/// A pending link past its deadline is treated as gone even before the
/// background sweep flips the row.
#[sqlx::test(migrations = "../db/migrations")]
async fn overdue_link_is_gone(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = register_and_token(app.clone(), "owner").await;
    let advertiser_id = create_advertiser(&app, &token).await;
    create_topic(&app, &token, advertiser_id, "주제").await;
    let (proposal_id, share_token) = create_proposal(&app, &token, advertiser_id).await;

    sqlx::query("UPDATE proposals SET expires_at = NOW() - INTERVAL '1 day' WHERE id = $1")
        .bind(proposal_id)
        .execute(&pool)
        .await
        .expect("expiry backdate should succeed");

    let response = get(app, &format!("/api/v1/p/{share_token}")).await;

    assert_eq!(response.status(), StatusCode::GONE);
}

// ---------------------------------------------------------------------------
// Client decision
// ---------------------------------------------------------------------------

/// Approving every topic resolves the proposal as approved and flips the
/// topics.
#[sqlx::test(migrations = "../db/migrations")]
async fn full_approval_resolves_approved(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_token(app.clone(), "owner").await;
    let advertiser_id = create_advertiser(&app, &token).await;
    let first = create_topic(&app, &token, advertiser_id, "주제 1").await;
    let second = create_topic(&app, &token, advertiser_id, "주제 2").await;
    let (_, share_token) = create_proposal(&app, &token, advertiser_id).await;

    let body = json!({
        "decisions": [
            { "topic_id": first, "decision": "approve" },
            { "topic_id": second, "decision": "approve" },
        ],
        "comment": "좋아요, 진행해 주세요",
    });
    let response = post_json(app.clone(), &format!("/api/v1/p/{share_token}/decision"), body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "approved");
    assert_eq!(json["data"]["client_comment"], "좋아요, 진행해 주세요");
    assert!(json["data"]["responded_at"].is_string());

    // The decided page stays viewable.
    let response = get(app, &format!("/api/v1/p/{share_token}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["topics"][0]["status"], "approved");
}

/// Any rejection resolves the proposal as rejected.
#[sqlx::test(migrations = "../db/migrations")]
async fn partial_rejection_resolves_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_token(app.clone(), "owner").await;
    let advertiser_id = create_advertiser(&app, &token).await;
    let first = create_topic(&app, &token, advertiser_id, "주제 1").await;
    let second = create_topic(&app, &token, advertiser_id, "주제 2").await;
    let (_, share_token) = create_proposal(&app, &token, advertiser_id).await;

    let body = json!({
        "decisions": [
            { "topic_id": first, "decision": "approve" },
            { "topic_id": second, "decision": "reject" },
        ],
    });
    let response = post_json(app, &format!("/api/v1/p/{share_token}/decision"), body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "rejected");
}

/// The decision endpoint is one-shot; a second submission returns 409.
#[sqlx::test(migrations = "../db/migrations")]
async fn decision_is_one_shot(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_token(app.clone(), "owner").await;
    let advertiser_id = create_advertiser(&app, &token).await;
    let topic_id = create_topic(&app, &token, advertiser_id, "주제").await;
    let (_, share_token) = create_proposal(&app, &token, advertiser_id).await;

    let body = json!({ "decisions": [ { "topic_id": topic_id, "decision": "approve" } ] });
    let uri = format!("/api/v1/p/{share_token}/decision");

    let response = post_json(app.clone(), &uri, body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(app, &uri, body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Decisions naming topics outside the proposal are rejected with 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn decision_rejects_foreign_topics(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_token(app.clone(), "owner").await;
    let advertiser_id = create_advertiser(&app, &token).await;
    create_topic(&app, &token, advertiser_id, "주제").await;
    let (_, share_token) = create_proposal(&app, &token, advertiser_id).await;

    let body = json!({ "decisions": [ { "topic_id": 999999, "decision": "approve" } ] });
    let response = post_json(app, &format!("/api/v1/p/{share_token}/decision"), body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// An unknown decision verb is rejected with 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn decision_rejects_unknown_verbs(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_token(app.clone(), "owner").await;
    let advertiser_id = create_advertiser(&app, &token).await;
    let topic_id = create_topic(&app, &token, advertiser_id, "주제").await;
    let (_, share_token) = create_proposal(&app, &token, advertiser_id).await;

    let body = json!({ "decisions": [ { "topic_id": topic_id, "decision": "maybe" } ] });
    let response = post_json(app, &format!("/api/v1/p/{share_token}/decision"), body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Revocation
// ---------------------------------------------------------------------------

/// Revoking is only possible while the proposal is pending.
#[sqlx::test(migrations = "../db/migrations")]
async fn revoke_requires_pending(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = register_and_token(app.clone(), "owner").await;
    let advertiser_id = create_advertiser(&app, &token).await;
    let topic_id = create_topic(&app, &token, advertiser_id, "주제").await;
    let (proposal_id, share_token) = create_proposal(&app, &token, advertiser_id).await;

    // Client responds first.
    let body = json!({ "decisions": [ { "topic_id": topic_id, "decision": "approve" } ] });
    let response = post_json(app.clone(), &format!("/api/v1/p/{share_token}/decision"), body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_auth(
        app,
        &format!("/api/v1/proposals/{proposal_id}/revoke"),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Proposals belonging to another marketer are not visible.
#[sqlx::test(migrations = "../db/migrations")]
async fn proposals_are_owner_scoped(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_and_token(app.clone(), "owner").await;
    let intruder = register_and_token(app.clone(), "intruder").await;
    let advertiser_id = create_advertiser(&app, &owner).await;
    create_topic(&app, &owner, advertiser_id, "주제").await;
    let (proposal_id, _) = create_proposal(&app, &owner, advertiser_id).await;

    let response = get_auth(
        app,
        &format!("/api/v1/proposals/{proposal_id}"),
        &intruder,
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
