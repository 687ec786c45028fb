//! Handlers for advertiser-scoped topics
//! (`/advertisers/{advertiser_id}/topics`).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use postpilot_core::error::CoreError;
use postpilot_core::types::{first_of_month, parse_month, DbId};
use postpilot_db::models::topic::{CreateTopic, Topic, TopicListQuery, UpdateTopic};
use postpilot_db::repositories::TopicRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::advertisers::load_owned_advertiser;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a topic scoped to the given advertiser.
///
/// The advertiser itself must already be authorized; the scope check stops
/// `/advertisers/1/topics/99` from reaching a topic under advertiser 2.
async fn load_scoped_topic(
    pool: &sqlx::PgPool,
    advertiser_id: DbId,
    topic_id: DbId,
) -> AppResult<Topic> {
    let topic = TopicRepo::find_by_id(pool, topic_id)
        .await?
        .filter(|t| t.advertiser_id == advertiser_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "주제",
            id: topic_id,
        }))?;
    Ok(topic)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/advertisers/{advertiser_id}/topics
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(advertiser_id): Path<DbId>,
    Json(input): Json<CreateTopic>,
) -> AppResult<impl IntoResponse> {
    load_owned_advertiser(&state.pool, advertiser_id, &auth).await?;

    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "주제 제목을 입력해 주세요".into(),
        )));
    }
    input.validate().map_err(|_| {
        AppError::Core(CoreError::Validation("입력값 형식을 확인해 주세요".into()))
    })?;

    let month = first_of_month(input.month);
    let topic = TopicRepo::create(&state.pool, advertiser_id, month, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: topic })))
}

/// GET /api/v1/advertisers/{advertiser_id}/topics?month=2025-09
///
/// Ordered by position, then title. The optional `month` filter accepts
/// `YYYY-MM` or a full date.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(advertiser_id): Path<DbId>,
    Query(params): Query<TopicListQuery>,
) -> AppResult<impl IntoResponse> {
    load_owned_advertiser(&state.pool, advertiser_id, &auth).await?;

    let month = match &params.month {
        Some(raw) => Some(parse_month(raw).ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "월 형식이 올바르지 않습니다 (YYYY-MM)".into(),
            ))
        })?),
        None => None,
    };

    let topics = TopicRepo::list_by_advertiser(&state.pool, advertiser_id, month).await?;
    Ok(Json(DataResponse { data: topics }))
}

/// GET /api/v1/advertisers/{advertiser_id}/topics/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((advertiser_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    load_owned_advertiser(&state.pool, advertiser_id, &auth).await?;
    let topic = load_scoped_topic(&state.pool, advertiser_id, id).await?;
    Ok(Json(DataResponse { data: topic }))
}

/// PUT /api/v1/advertisers/{advertiser_id}/topics/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((advertiser_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateTopic>,
) -> AppResult<impl IntoResponse> {
    load_owned_advertiser(&state.pool, advertiser_id, &auth).await?;
    load_scoped_topic(&state.pool, advertiser_id, id).await?;

    if let Some(title) = &input.title {
        if title.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "주제 제목을 입력해 주세요".into(),
            )));
        }
    }
    input.validate().map_err(|_| {
        AppError::Core(CoreError::Validation("입력값 형식을 확인해 주세요".into()))
    })?;

    let topic = TopicRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "주제",
            id,
        }))?;
    Ok(Json(DataResponse { data: topic }))
}

/// DELETE /api/v1/advertisers/{advertiser_id}/topics/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((advertiser_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    load_owned_advertiser(&state.pool, advertiser_id, &auth).await?;
    load_scoped_topic(&state.pool, advertiser_id, id).await?;

    let deleted = TopicRepo::soft_delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "주제",
            id,
        }))
    }
}
