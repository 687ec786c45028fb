//! HTTP-level integration tests for the auth endpoints.
//!
//! Covers registration (with first-admin bootstrap), login, account
//! lockout, token refresh with rotation, logout, and `/auth/me`.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json, register_user, TEST_PASSWORD};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// The first registered account gets the admin role and a full token pair.
#[sqlx::test(migrations = "../db/migrations")]
async fn first_registration_bootstraps_admin(pool: PgPool) {
    let app = common::build_test_app(pool);

    let json = register_user(app, "founder").await;

    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert!(json["expires_in"].is_number());
    assert_eq!(json["user"]["username"], "founder");
    assert_eq!(json["user"]["role"], "admin");
}

/// Accounts after the first are marketers.
#[sqlx::test(migrations = "../db/migrations")]
async fn later_registrations_are_marketers(pool: PgPool) {
    let app = common::build_test_app(pool);

    register_user(app.clone(), "founder").await;
    let json = register_user(app, "second").await;

    assert_eq!(json["user"]["role"], "marketer");
}

/// Registering a taken username returns 409.
#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_username_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_user(app.clone(), "taken").await;

    let body = serde_json::json!({
        "username": "taken",
        "email": "other@test.com",
        "password": TEST_PASSWORD,
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
}

/// Registering a taken email returns 409 even with a fresh username.
#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_email_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_user(app.clone(), "original").await;

    let body = serde_json::json!({
        "username": "different",
        "email": "original@test.com",
        "password": TEST_PASSWORD,
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// A password shorter than the minimum is rejected with 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn short_password_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "username": "weakling",
        "email": "weakling@test.com",
        "password": "short",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

/// A malformed email is rejected with 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_email_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "username": "bademail",
        "email": "not-an-email",
        "password": TEST_PASSWORD,
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Successful login returns 200 with a token pair and user info.
#[sqlx::test(migrations = "../db/migrations")]
async fn login_success(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_user(app.clone(), "loginuser").await;

    let body = serde_json::json!({ "username": "loginuser", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["user"]["username"], "loginuser");
}

/// A wrong password gets a 401, same as an unknown username.
#[sqlx::test(migrations = "../db/migrations")]
async fn login_wrong_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_user(app.clone(), "wrongpw").await;

    let body = serde_json::json!({ "username": "wrongpw", "password": "incorrect-password" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Login with a nonexistent username returns 401, not 404.
#[sqlx::test(migrations = "../db/migrations")]
async fn login_nonexistent_user(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "username": "ghost", "password": "whatever-secret" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Five failed attempts lock the account; even the correct password is
/// then rejected with 403 until the lock expires.
#[sqlx::test(migrations = "../db/migrations")]
async fn repeated_failures_lock_the_account(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_user(app.clone(), "lockme").await;

    for _ in 0..5 {
        let body = serde_json::json!({ "username": "lockme", "password": "wrong-password" });
        let response = post_json(app.clone(), "/api/v1/auth/login", body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let body = serde_json::json!({ "username": "lockme", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Refresh and logout
// ---------------------------------------------------------------------------

/// A valid refresh token returns a new token pair.
#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_rotates_tokens(pool: PgPool) {
    let app = common::build_test_app(pool);
    let json = register_user(app.clone(), "refresher").await;
    let refresh_token = json["refresh_token"].as_str().unwrap();

    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app.clone(), "/api/v1/auth/refresh", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let new_json = body_json(response).await;
    assert!(new_json["refresh_token"].is_string());
    assert_ne!(new_json["refresh_token"], json["refresh_token"]);

    // The old refresh token was revoked by the rotation.
    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// An unknown refresh token returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_with_garbage_token_fails(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "refresh_token": "not-a-real-token" });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Logout revokes every session; the refresh token stops working.
#[sqlx::test(migrations = "../db/migrations")]
async fn logout_revokes_sessions(pool: PgPool) {
    let app = common::build_test_app(pool);
    let json = register_user(app.clone(), "leaver").await;
    let access_token = json["access_token"].as_str().unwrap();
    let refresh_token = json["refresh_token"].as_str().unwrap();

    let response = common::post_auth(app.clone(), "/api/v1/auth/logout", access_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// /auth/me
// ---------------------------------------------------------------------------

/// The profile endpoint returns the authenticated user.
#[sqlx::test(migrations = "../db/migrations")]
async fn me_returns_current_user(pool: PgPool) {
    let app = common::build_test_app(pool);
    let json = register_user(app.clone(), "profile").await;
    let token = json["access_token"].as_str().unwrap();

    let response = get_auth(app, "/api/v1/auth/me", token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "profile");
    assert_eq!(json["data"]["email"], "profile@test.com");
}

/// Requests without a bearer token are rejected with 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn me_requires_authentication(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::get(app, "/api/v1/auth/me").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// A syntactically invalid bearer token is rejected with 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn garbage_bearer_token_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/auth/me", "garbage.token.here").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
