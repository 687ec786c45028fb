//! `AppError` to HTTP response mapping.
//!
//! No server needed: each case renders an error through `IntoResponse` and
//! inspects the status plus the `{"error", "code"}` body.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use postpilot_api::error::AppError;
use postpilot_core::error::CoreError;

async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn entity_not_found_is_404_with_korean_particle() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "광고주",
        id: 42,
    });
    let (status, json) = render(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "광고주을(를) 찾을 수 없습니다 (id: 42)");
}

#[tokio::test]
async fn message_not_found_is_404_verbatim() {
    let err = AppError::NotFound("존재하지 않는 제안 링크입니다".into());
    let (status, json) = render(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "존재하지 않는 제안 링크입니다");
}

#[tokio::test]
async fn bad_request_is_400() {
    let (status, json) = render(AppError::BadRequest("잘못된 요청입니다".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "잘못된 요청입니다");
}

#[tokio::test]
async fn validation_is_400_with_its_own_code() {
    let err = AppError::Core(CoreError::Validation("이름을 입력해 주세요".into()));
    let (status, json) = render(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "이름을 입력해 주세요");
}

#[tokio::test]
async fn conflict_is_409() {
    let err = AppError::Core(CoreError::Conflict("이미 존재하는 값입니다".into()));
    let (status, json) = render(err).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn unauthorized_is_401() {
    let err = AppError::Core(CoreError::Unauthorized("로그인이 필요합니다".into()));
    let (status, json) = render(err).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn forbidden_is_403() {
    let err = AppError::Core(CoreError::Forbidden("권한이 없습니다".into()));
    let (status, json) = render(err).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn gone_is_410() {
    let err = AppError::Core(CoreError::Gone("만료되었거나 회수된 제안입니다".into()));
    let (status, json) = render(err).await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(json["code"], "GONE");
    assert_eq!(json["error"], "만료되었거나 회수된 제안입니다");
}

#[tokio::test]
async fn internal_error_hides_its_message() {
    let err = AppError::InternalError("secret database credentials leaked".into());
    let (status, json) = render(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "내부 오류가 발생했습니다");
    assert!(!json.to_string().contains("secret"));
}

#[tokio::test]
async fn core_internal_hides_its_message_too() {
    let err = AppError::Core(CoreError::Internal("panic stack trace here".into()));
    let (status, json) = render(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert!(!json.to_string().contains("panic stack trace"));
}

#[tokio::test]
async fn sqlx_row_not_found_is_404() {
    let (status, json) = render(AppError::Database(sqlx::Error::RowNotFound)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn other_sqlx_errors_sanitize_to_500() {
    let err = AppError::Database(sqlx::Error::Protocol("connection details".into()));
    let (status, json) = render(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert!(!json.to_string().contains("connection details"));
}
