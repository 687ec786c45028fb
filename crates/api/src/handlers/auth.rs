//! Handlers for the `/auth` resource (register, login, refresh, logout, me).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use postpilot_core::error::CoreError;
use postpilot_core::roles::{ROLE_ADMIN, ROLE_MARKETER};
use postpilot_core::types::DbId;
use postpilot_db::models::session::CreateSession;
use postpilot_db::models::user::{CreateUser, PublicUser, RegisterRequest, User};
use postpilot_db::repositories::{RoleRepo, SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Consecutive failures allowed before the account locks.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// How long a locked account stays locked, in minutes.
const LOCK_DURATION_MINS: i64 = 15;

/// Shared 401 for both unknown-username and wrong-password logins, so the
/// response never reveals which usernames exist.
const BAD_CREDENTIALS: &str = "아이디 또는 비밀번호가 올바르지 않습니다";

const INACTIVE_ACCOUNT: &str = "비활성화된 계정입니다";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Credentials for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair handed out by register, login, and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until the access token expires.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Slimmed-down account info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Public signup. The very first account gets the admin role when
/// `BOOTSTRAP_FIRST_ADMIN` is enabled; everyone else is a marketer.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    if input.validate().is_err() {
        return Err(AppError::Core(CoreError::Validation(
            "아이디, 이메일, 비밀번호 형식을 확인해 주세요".into(),
        )));
    }
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    if UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "이미 사용 중인 아이디입니다".into(),
        )));
    }
    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "이미 사용 중인 이메일입니다".into(),
        )));
    }

    let role_name = if state.config.bootstrap_first_admin && user_count(&state.pool).await? == 0 {
        ROLE_ADMIN
    } else {
        ROLE_MARKETER
    };
    let role = RoleRepo::find_by_name(&state.pool, role_name)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("Role '{role_name}' not seeded")))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create = CreateUser {
        username: input.username,
        email: input.email,
        password_hash,
        display_name: input.display_name,
        role_id: role.id,
    };
    let user = UserRepo::create(&state.pool, &create).await?;

    tracing::info!(user_id = user.id, role = %role.name, "New account registered");

    let response =
        create_auth_response(&state, user.id, &user.username, &user.email, &role.name).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Username + password login with an account-lockout counter.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| unauthorized(BAD_CREDENTIALS))?;

    if !user.is_active {
        return Err(forbidden(INACTIVE_ACCOUNT));
    }
    if user.locked_until.is_some_and(|until| until > Utc::now()) {
        return Err(forbidden(
            "로그인 시도가 너무 많아 계정이 일시적으로 잠겼습니다. 잠시 후 다시 시도해 주세요",
        ));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        note_failed_attempt(&state.pool, &user).await?;
        return Err(unauthorized(BAD_CREDENTIALS));
    }

    // Success clears the failure counter and stamps last_login_at.
    UserRepo::record_successful_login(&state.pool, user.id).await?;

    let role = role_name_for(&state.pool, user.role_id).await?;
    let response =
        create_auth_response(&state, user.id, &user.username, &user.email, &role).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a refresh token for a new pair. The presented session is
/// revoked before the new one is issued, so each refresh token works
/// exactly once.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);
    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| unauthorized("세션이 만료되었습니다. 다시 로그인해 주세요"))?;

    SessionRepo::revoke(&state.pool, session.id).await?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| unauthorized("존재하지 않는 계정입니다"))?;
    if !user.is_active {
        return Err(forbidden(INACTIVE_ACCOUNT));
    }

    let role = role_name_for(&state.pool, user.role_id).await?;
    let response =
        create_auth_response(&state, user.id, &user.username, &user.email, &role).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke every session the caller owns. Returns 204.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
///
/// Current user profile.
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<PublicUser>>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "사용자",
            id: auth_user.user_id,
        }))?;
    Ok(Json(DataResponse {
        data: user.into_public(),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.into()))
}

fn forbidden(message: &str) -> AppError {
    AppError::Core(CoreError::Forbidden(message.into()))
}

async fn user_count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
}

/// Resolve a role id to its name for the JWT claims. A missing role row
/// means the seed data is broken, so that surfaces as a 500.
async fn role_name_for(pool: &PgPool, role_id: DbId) -> AppResult<String> {
    let role = RoleRepo::find_by_id(pool, role_id)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("Unknown role id {role_id}")))?;
    Ok(role.name)
}

/// Bump the failure counter and lock the account once it crosses the
/// threshold.
async fn note_failed_attempt(pool: &PgPool, user: &User) -> AppResult<()> {
    UserRepo::increment_failed_login(pool, user.id).await?;
    if user.failed_login_count + 1 >= MAX_FAILED_ATTEMPTS {
        let until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
        UserRepo::lock_account(pool, user.id, until).await?;
        tracing::warn!(user_id = user.id, "Account locked after repeated login failures");
    }
    Ok(())
}

/// Mint an access + refresh token pair, persist the session row, and
/// assemble the response body.
async fn create_auth_response(
    state: &AppState,
    user_id: DbId,
    username: &str,
    email: &str,
    role: &str,
) -> AppResult<AuthResponse> {
    let jwt = &state.config.jwt;
    let access_token = generate_access_token(user_id, role, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let (refresh_plaintext, refresh_hash) = generate_refresh_token();

    let session = CreateSession {
        user_id,
        refresh_token_hash: refresh_hash,
        expires_at: Utc::now() + chrono::Duration::days(jwt.refresh_token_expiry_days),
    };
    SessionRepo::create(&state.pool, &session).await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: jwt.access_token_expiry_mins * 60,
        user: UserInfo {
            id: user_id,
            username: username.to_string(),
            email: email.to_string(),
            role: role.to_string(),
        },
    })
}
