//! Role gate on top of [`AuthUser`].
//!
//! Handlers that take [`RequireAdmin`] instead of `AuthUser` can only be
//! reached by admins; everyone else gets the 403 before the handler body
//! runs. Ownership checks stay in the handlers, this only gates by role.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use postpilot_core::error::CoreError;
use postpilot_core::roles::ROLE_ADMIN;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Extractor that admits admins only.
///
/// Destructure it to get at the inner user:
///
/// ```ignore
/// async fn refresh(RequireAdmin(user): RequireAdmin) -> AppResult<...> { .. }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "관리자 권한이 필요합니다".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}
