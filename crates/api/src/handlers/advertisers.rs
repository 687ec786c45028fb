//! Handlers for the `/advertisers` resource, including the sync trigger.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use postpilot_core::channels::Channel;
use postpilot_core::error::CoreError;
use postpilot_core::types::DbId;
use postpilot_db::models::advertiser::{Advertiser, CreateAdvertiser, UpdateAdvertiser};
use postpilot_db::models::job::{EnqueueJob, JOB_TYPE_SYNC};
use postpilot_db::models::status::SyncStatus;
use postpilot_db::repositories::{AdvertiserRepo, JobRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch an advertiser and verify the caller owns it (or is admin).
///
/// Shared with the topic, content, and proposal handlers -- every
/// advertiser-scoped row is authorized through its parent advertiser.
pub(crate) async fn load_owned_advertiser(
    pool: &sqlx::PgPool,
    advertiser_id: DbId,
    auth: &AuthUser,
) -> AppResult<Advertiser> {
    let advertiser = AdvertiserRepo::find_by_id(pool, advertiser_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "광고주",
            id: advertiser_id,
        }))?;

    if advertiser.owner_id != auth.user_id && !auth.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "다른 사용자의 광고주에는 접근할 수 없습니다".into(),
        )));
    }

    Ok(advertiser)
}

/// Validate a `channels` JSONB payload: an object keyed by channel name
/// with non-blank string handles.
fn validate_channels(channels: &serde_json::Value) -> AppResult<()> {
    let Some(map) = channels.as_object() else {
        return Err(AppError::Core(CoreError::Validation(
            "채널 정보는 채널 이름을 키로 하는 객체여야 합니다".into(),
        )));
    };

    for (name, handle) in map {
        if Channel::parse(name).is_none() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "지원하지 않는 채널입니다: {name}"
            ))));
        }
        let is_blank = handle.as_str().map(|s| s.trim().is_empty()).unwrap_or(true);
        if is_blank {
            return Err(AppError::Core(CoreError::Validation(format!(
                "{name} 채널의 계정 또는 주소를 입력해 주세요"
            ))));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/advertisers
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateAdvertiser>,
) -> AppResult<impl IntoResponse> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "광고주 이름을 입력해 주세요".into(),
        )));
    }
    input.validate().map_err(|_| {
        AppError::Core(CoreError::Validation("입력값 형식을 확인해 주세요".into()))
    })?;
    if let Some(channels) = &input.channels {
        validate_channels(channels)?;
    }

    let advertiser = AdvertiserRepo::create(&state.pool, auth.user_id, &input).await?;

    tracing::info!(advertiser_id = advertiser.id, owner_id = auth.user_id, "Advertiser created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: advertiser })))
}

/// GET /api/v1/advertisers
///
/// Owner-scoped listing; admins see every tenant.
pub async fn list(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let advertisers = match auth.owner_scope() {
        Some(owner_id) => AdvertiserRepo::list_by_owner(&state.pool, owner_id).await?,
        None => AdvertiserRepo::list_all(&state.pool).await?,
    };
    Ok(Json(DataResponse { data: advertisers }))
}

/// GET /api/v1/advertisers/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let advertiser = load_owned_advertiser(&state.pool, id, &auth).await?;
    Ok(Json(DataResponse { data: advertiser }))
}

/// PUT /api/v1/advertisers/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAdvertiser>,
) -> AppResult<impl IntoResponse> {
    load_owned_advertiser(&state.pool, id, &auth).await?;

    if let Some(name) = &input.name {
        if name.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "광고주 이름을 입력해 주세요".into(),
            )));
        }
    }
    input.validate().map_err(|_| {
        AppError::Core(CoreError::Validation("입력값 형식을 확인해 주세요".into()))
    })?;
    if let Some(channels) = &input.channels {
        validate_channels(channels)?;
    }

    let advertiser = AdvertiserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "광고주",
            id,
        }))?;
    Ok(Json(DataResponse { data: advertiser }))
}

/// DELETE /api/v1/advertisers/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_owned_advertiser(&state.pool, id, &auth).await?;

    let deleted = AdvertiserRepo::soft_delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "광고주",
            id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Sync trigger
// ---------------------------------------------------------------------------

/// POST /api/v1/advertisers/{id}/sync
///
/// Enqueue a profile sync job for the advertiser's registered channels and
/// respond 202 immediately with the job row. The dispatcher picks the job
/// up, flips `sync_status` to `syncing`, and scrapes the channels in
/// parallel.
pub async fn trigger_sync(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let advertiser = load_owned_advertiser(&state.pool, id, &auth).await?;

    let has_channels = advertiser
        .channels
        .as_object()
        .map(|m| !m.is_empty())
        .unwrap_or(false);
    if !has_channels {
        return Err(AppError::Core(CoreError::Validation(
            "등록된 채널이 없습니다. 채널을 먼저 등록해 주세요".into(),
        )));
    }

    if advertiser.sync_status_id == SyncStatus::Syncing.id() {
        return Err(AppError::Core(CoreError::Conflict(
            "이미 동기화가 진행 중입니다".into(),
        )));
    }

    let job = JobRepo::enqueue(
        &state.pool,
        &EnqueueJob {
            job_type: JOB_TYPE_SYNC.to_string(),
            submitted_by: auth.user_id,
            parameters: serde_json::json!({ "advertiser_id": id }),
        },
    )
    .await?;

    tracing::info!(advertiser_id = id, job_id = job.id, "Sync job enqueued");

    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: job })))
}
