pub mod advertisers;
pub mod auth;
pub mod contents;
pub mod health;
pub mod jobs;
pub mod notifications;
pub mod proposals;
pub mod templates;
pub mod trends;

use axum::Router;

use crate::state::AppState;

/// Assemble the `/api/v1` route tree.
///
/// ```text
/// /auth/register                           signup (public)
/// /auth/login                              login (public)
/// /auth/refresh                            refresh (public)
/// /auth/logout                             logout (requires auth)
/// /auth/me                                 current user (requires auth)
///
/// /advertisers                             list, create
/// /advertisers/{id}                        get, update, delete
/// /advertisers/{id}/sync                   trigger channel sync (POST, 202)
/// /advertisers/{advertiser_id}/topics      list (?month), create
/// /advertisers/{advertiser_id}/topics/{id} get, update, delete
///
/// /contents                                list (?advertiser_id, ?channel,
///                                          ?status_id, ?month), create
/// /contents/bulk                           bulk generation (POST, 202)
/// /contents/{id}                           get, update, delete
/// /contents/{id}/status                    lifecycle transition (PATCH)
///
/// /templates                               list, create
/// /templates/{id}                          get, update, delete
///
/// /proposals                               list, create
/// /proposals/{id}                          get
/// /proposals/{id}/revoke                   revoke pending link (POST)
///
/// /p/{token}                               public proposal view (GET)
/// /p/{token}/decision                      public one-shot decision (POST)
///
/// /trends                                  list (?source, ?category, ?date)
/// /trends/refresh                          manual refresh (POST, admin, 202)
///
/// /notifications                           list (?unread_only, limit, offset)
/// /notifications/unread-count              unread count (GET)
/// /notifications/read-all                  mark all read (POST)
/// /notifications/{id}/read                 mark read (POST)
///
/// /jobs                                    list (?status_id, ?job_type)
/// /jobs/{id}                               get
/// /jobs/{id}/cancel                        cancel (POST)
/// /jobs/{id}/retry                         retry failed job (POST, 202)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication and the current-user endpoint.
        .nest("/auth", auth::router())
        // Advertiser CRUD, sync trigger, and nested monthly topics.
        .nest("/advertisers", advertisers::router())
        // Content CRUD, status transitions, and bulk generation.
        .nest("/contents", contents::router())
        // Prompt template management.
        .nest("/templates", templates::router())
        // Authenticated proposal management.
        .nest("/proposals", proposals::router())
        // Public share-link endpoints (token is the only credential).
        .nest("/p", proposals::public_router())
        // Shared trending keyword pool.
        .nest("/trends", trends::router())
        // In-app notification inbox.
        .nest("/notifications", notifications::router())
        // Background job visibility and control.
        .nest("/jobs", jobs::router())
}
