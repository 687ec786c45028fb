//! Handlers for the `/contents` resource: CRUD, status transitions, and
//! the bulk generation trigger.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use postpilot_core::channels::Channel;
use postpilot_core::error::CoreError;
use postpilot_core::types::{parse_month, DbId};
use postpilot_db::models::content::{
    BulkGenerationRequest, Content, ContentListQuery, CreateContent, UpdateContent,
    UpdateContentStatus,
};
use postpilot_db::models::job::{EnqueueJob, JOB_TYPE_BULK_GENERATE};
use postpilot_db::models::status::ContentStatus;
use postpilot_db::repositories::{ContentRepo, JobRepo, TopicRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::advertisers::load_owned_advertiser;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum advertiser × channel pairs accepted by one bulk request.
const MAX_BULK_PAIRS: usize = 50;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a content row and authorize through its parent advertiser.
async fn load_owned_content(
    state: &AppState,
    content_id: DbId,
    auth: &AuthUser,
) -> AppResult<Content> {
    let content = ContentRepo::find_by_id(&state.pool, content_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "콘텐츠",
            id: content_id,
        }))?;
    load_owned_advertiser(&state.pool, content.advertiser_id, auth).await?;
    Ok(content)
}

fn validate_channel_name(channel: &str) -> AppResult<()> {
    if Channel::parse(channel).is_none() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "지원하지 않는 채널입니다: {channel}"
        ))));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/contents
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateContent>,
) -> AppResult<impl IntoResponse> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "콘텐츠 제목을 입력해 주세요".into(),
        )));
    }
    input.validate().map_err(|_| {
        AppError::Core(CoreError::Validation("입력값 형식을 확인해 주세요".into()))
    })?;
    validate_channel_name(&input.channel)?;

    load_owned_advertiser(&state.pool, input.advertiser_id, &auth).await?;

    // A linked topic must belong to the same advertiser.
    if let Some(topic_id) = input.topic_id {
        let valid = TopicRepo::find_by_id(&state.pool, topic_id)
            .await?
            .map(|t| t.advertiser_id == input.advertiser_id)
            .unwrap_or(false);
        if !valid {
            return Err(AppError::Core(CoreError::Validation(
                "해당 광고주의 주제가 아닙니다".into(),
            )));
        }
    }

    let content = ContentRepo::create(&state.pool, auth.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: content })))
}

/// GET /api/v1/contents
///
/// Filters: `advertiser_id`, `channel`, `status_id`, `month` (scheduled
/// month, `YYYY-MM`), `limit`, `offset`. Owner-scoped; admins see all.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ContentListQuery>,
) -> AppResult<impl IntoResponse> {
    let month = match &params.month {
        Some(raw) => Some(parse_month(raw).ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "월 형식이 올바르지 않습니다 (YYYY-MM)".into(),
            ))
        })?),
        None => None,
    };

    // Filtering by a specific advertiser still pins the ownership check.
    if let Some(advertiser_id) = params.advertiser_id {
        load_owned_advertiser(&state.pool, advertiser_id, &auth).await?;
    }

    let contents = ContentRepo::list(&state.pool, auth.owner_scope(), &params, month).await?;
    Ok(Json(DataResponse { data: contents }))
}

/// GET /api/v1/contents/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let content = load_owned_content(&state, id, &auth).await?;
    Ok(Json(DataResponse { data: content }))
}

/// PUT /api/v1/contents/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateContent>,
) -> AppResult<impl IntoResponse> {
    let existing = load_owned_content(&state, id, &auth).await?;

    if let Some(title) = &input.title {
        if title.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "콘텐츠 제목을 입력해 주세요".into(),
            )));
        }
    }
    input.validate().map_err(|_| {
        AppError::Core(CoreError::Validation("입력값 형식을 확인해 주세요".into()))
    })?;
    if let Some(topic_id) = input.topic_id {
        let valid = TopicRepo::find_by_id(&state.pool, topic_id)
            .await?
            .map(|t| t.advertiser_id == existing.advertiser_id)
            .unwrap_or(false);
        if !valid {
            return Err(AppError::Core(CoreError::Validation(
                "해당 광고주의 주제가 아닙니다".into(),
            )));
        }
    }

    let content = ContentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "콘텐츠",
            id,
        }))?;
    Ok(Json(DataResponse { data: content }))
}

/// PATCH /api/v1/contents/{id}/status
///
/// Validates the transition against the content lifecycle before writing.
/// Moving to `scheduled` requires a date (in the request or already on
/// the row).
pub async fn set_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateContentStatus>,
) -> AppResult<impl IntoResponse> {
    let content = load_owned_content(&state, id, &auth).await?;

    let target = ContentStatus::parse_name(&input.status).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "알 수 없는 상태입니다: {}",
            input.status
        )))
    })?;

    let current = ContentStatus::from_id(content.status_id).unwrap_or(ContentStatus::Draft);
    if !current.can_transition_to(target) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "{} 상태에서 {} 상태로 변경할 수 없습니다",
            current.as_str(),
            target.as_str()
        ))));
    }

    if target == ContentStatus::Scheduled
        && input.scheduled_date.is_none()
        && content.scheduled_date.is_none()
    {
        return Err(AppError::Core(CoreError::Validation(
            "예약 발행일을 입력해 주세요".into(),
        )));
    }

    let updated = ContentRepo::set_status(&state.pool, id, target.id(), input.scheduled_date)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "콘텐츠",
            id,
        }))?;

    tracing::info!(
        content_id = id,
        from = current.as_str(),
        to = target.as_str(),
        "Content status changed",
    );

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/contents/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_owned_content(&state, id, &auth).await?;

    let deleted = ContentRepo::soft_delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "콘텐츠",
            id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Bulk generation
// ---------------------------------------------------------------------------

/// POST /api/v1/contents/bulk
///
/// Validates the request, enqueues a `content.bulk_generate` job, and
/// responds 202 with the job row. The runner crosses every advertiser
/// with every channel and drafts one content row per pair.
pub async fn bulk_generate(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<BulkGenerationRequest>,
) -> AppResult<impl IntoResponse> {
    if input.advertiser_ids.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "광고주를 한 명 이상 선택해 주세요".into(),
        )));
    }
    if input.channels.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "채널을 하나 이상 선택해 주세요".into(),
        )));
    }
    for channel in &input.channels {
        validate_channel_name(channel)?;
    }

    let pair_count = input.advertiser_ids.len() * input.channels.len();
    if pair_count > MAX_BULK_PAIRS {
        return Err(AppError::Core(CoreError::Validation(format!(
            "한 번에 최대 {MAX_BULK_PAIRS}건까지 생성할 수 있습니다 (요청: {pair_count}건)"
        ))));
    }

    if input.topic_id.is_some() && input.advertiser_ids.len() > 1 {
        return Err(AppError::Core(CoreError::Validation(
            "주제를 지정한 생성은 광고주 한 명에 대해서만 가능합니다".into(),
        )));
    }

    // Every targeted advertiser must be owned by the caller.
    for &advertiser_id in &input.advertiser_ids {
        load_owned_advertiser(&state.pool, advertiser_id, &auth).await?;
    }

    let parameters = serde_json::to_value(&input)
        .map_err(|e| AppError::InternalError(format!("Parameter serialization error: {e}")))?;

    let job = JobRepo::enqueue(
        &state.pool,
        &EnqueueJob {
            job_type: JOB_TYPE_BULK_GENERATE.to_string(),
            submitted_by: auth.user_id,
            parameters,
        },
    )
    .await?;

    tracing::info!(
        job_id = job.id,
        pairs = pair_count,
        user_id = auth.user_id,
        "Bulk generation job enqueued",
    );

    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: job })))
}
