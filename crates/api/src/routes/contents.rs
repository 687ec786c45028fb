//! Route definitions for the `/contents` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::contents;
use crate::state::AppState;

/// Routes mounted at `/contents`.
///
/// ```text
/// GET    /              -> list (?advertiser_id, ?channel, ?status_id, ?month)
/// POST   /              -> create
/// POST   /bulk          -> bulk_generate (202)
/// GET    /{id}          -> get_by_id
/// PUT    /{id}          -> update
/// DELETE /{id}          -> delete
/// PATCH  /{id}/status   -> set_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(contents::list).post(contents::create))
        .route("/bulk", post(contents::bulk_generate))
        .route(
            "/{id}",
            get(contents::get_by_id)
                .put(contents::update)
                .delete(contents::delete),
        )
        .route("/{id}/status", patch(contents::set_status))
}
