//! Bearer-token extractor.
//!
//! Any handler parameter of type [`AuthUser`] makes the route require a
//! valid access token; the extractor answers 401 with a Korean message
//! before the handler runs otherwise.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use postpilot_core::error::CoreError;
use postpilot_core::roles::ROLE_ADMIN;
use postpilot_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The caller, as proven by the `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// `claims.sub`, the `users.id` of the caller.
    pub user_id: DbId,
    /// `"admin"` or `"marketer"`.
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Tenancy scope for list queries: `None` means "all rows" (admin),
    /// `Some(user_id)` restricts to the caller's own advertisers.
    pub fn owner_scope(&self) -> Option<DbId> {
        if self.is_admin() {
            None
        } else {
            Some(self.user_id)
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("로그인이 필요합니다"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("잘못된 인증 형식입니다. Bearer 토큰을 사용해 주세요"))?;

        // Signature or expiry problems all collapse to one message; the
        // client cannot act on the difference.
        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| unauthorized("인증이 만료되었거나 유효하지 않습니다"))?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.into()))
}
