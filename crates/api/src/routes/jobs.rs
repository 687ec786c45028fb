//! Route definitions for the `/jobs` resource.
//!
//! Jobs are only created through domain triggers (sync, bulk generation,
//! trend refresh); there is no generic submit endpoint.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// Routes mounted at `/jobs`.
///
/// ```text
/// GET  /               -> list (?status_id, ?job_type, limit, offset)
/// GET  /{id}           -> get_by_id
/// POST /{id}/cancel    -> cancel
/// POST /{id}/retry     -> retry (202)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(jobs::list))
        .route("/{id}", get(jobs::get_by_id))
        .route("/{id}/cancel", post(jobs::cancel))
        .route("/{id}/retry", post(jobs::retry))
}
