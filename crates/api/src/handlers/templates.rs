//! Handlers for the `/templates` resource.
//!
//! Built-in templates (owner NULL, seeded by migration) are visible to
//! everyone; editing or deleting them requires the admin role. Channel
//! defaults (`is_default`) are global, so only admins may set the flag.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use postpilot_core::channels::Channel;
use postpilot_core::error::CoreError;
use postpilot_core::types::DbId;
use postpilot_db::models::template::{CreateTemplate, Template, UpdateTemplate};
use postpilot_db::repositories::TemplateRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a template and verify the caller may modify it.
///
/// Built-ins (owner NULL) are admin-only; owned templates require the
/// owner or an admin.
async fn find_and_authorize_edit(
    pool: &sqlx::PgPool,
    template_id: DbId,
    auth: &AuthUser,
) -> AppResult<Template> {
    let template = TemplateRepo::find_by_id(pool, template_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "템플릿",
            id: template_id,
        }))?;

    let allowed = match template.owner_id {
        None => auth.is_admin(),
        Some(owner_id) => owner_id == auth.user_id || auth.is_admin(),
    };
    if !allowed {
        let msg = if template.owner_id.is_none() {
            "기본 제공 템플릿은 관리자만 수정할 수 있습니다"
        } else {
            "다른 사용자의 템플릿에는 접근할 수 없습니다"
        };
        return Err(AppError::Core(CoreError::Forbidden(msg.into())));
    }

    Ok(template)
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
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/templates
///
/// Create a template owned by the caller. Built-ins come only from seed
/// data, so `owner_id` is always the authenticated user here.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTemplate>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(|_| {
        AppError::Core(CoreError::Validation(
            "템플릿 이름과 프롬프트를 확인해 주세요".into(),
        ))
    })?;
    validate_channel_name(&input.channel)?;

    if input.is_default && !auth.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "기본 템플릿 지정은 관리자만 할 수 있습니다".into(),
        )));
    }

    let template = TemplateRepo::create(&state.pool, Some(auth.user_id), &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

/// GET /api/v1/templates
///
/// Lists the caller's templates plus built-ins. Admins see everything.
pub async fn list(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let templates = match auth.owner_scope() {
        Some(owner_id) => TemplateRepo::list_visible(&state.pool, owner_id).await?,
        None => TemplateRepo::list_all(&state.pool).await?,
    };
    Ok(Json(DataResponse { data: templates }))
}

/// GET /api/v1/templates/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = TemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "템플릿",
            id,
        }))?;

    // Built-ins are readable by everyone; owned templates only by their
    // owner or an admin.
    if let Some(owner_id) = template.owner_id {
        if owner_id != auth.user_id && !auth.is_admin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "다른 사용자의 템플릿에는 접근할 수 없습니다".into(),
            )));
        }
    }

    Ok(Json(DataResponse { data: template }))
}

/// PUT /api/v1/templates/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTemplate>,
) -> AppResult<impl IntoResponse> {
    find_and_authorize_edit(&state.pool, id, &auth).await?;

    input.validate().map_err(|_| {
        AppError::Core(CoreError::Validation(
            "템플릿 이름과 프롬프트를 확인해 주세요".into(),
        ))
    })?;
    if let Some(channel) = &input.channel {
        validate_channel_name(channel)?;
    }
    if input.is_default == Some(true) && !auth.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "기본 템플릿 지정은 관리자만 할 수 있습니다".into(),
        )));
    }

    let template = TemplateRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "템플릿",
            id,
        }))?;
    Ok(Json(DataResponse { data: template }))
}

/// DELETE /api/v1/templates/{id}
///
/// Deleting a channel default is rejected with 409; demote it first so
/// generation never loses its fallback template.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let template = find_and_authorize_edit(&state.pool, id, &auth).await?;

    if template.is_default {
        return Err(AppError::Core(CoreError::Conflict(
            "기본 템플릿은 삭제할 수 없습니다. 먼저 기본 지정을 해제해 주세요".into(),
        )));
    }

    let deleted = TemplateRepo::soft_delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "템플릿",
            id,
        }))
    }
}
