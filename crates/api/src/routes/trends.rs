//! Route definitions for the `/trends` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::trends;
use crate::state::AppState;

/// Routes mounted at `/trends`.
///
/// ```text
/// GET  /          -> list (?source, ?category, ?date)
/// POST /refresh   -> refresh (admin only, 202)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(trends::list))
        .route("/refresh", post(trends::refresh))
}
