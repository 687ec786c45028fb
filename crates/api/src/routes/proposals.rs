//! Route definitions for the `/proposals` resource and the public
//! `/p/{token}` share-link endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{proposals, public_proposals};
use crate::state::AppState;

/// Authenticated routes mounted at `/proposals`.
///
/// ```text
/// GET    /              -> list
/// POST   /              -> create
/// GET    /{id}          -> get_by_id
/// POST   /{id}/revoke   -> revoke
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(proposals::list).post(proposals::create))
        .route("/{id}", get(proposals::get_by_id))
        .route("/{id}/revoke", post(proposals::revoke))
}

/// Public routes mounted at `/p`. The share token is the only
/// credential; no auth extractor runs here.
///
/// ```text
/// GET  /{token}           -> get_by_token
/// POST /{token}/decision  -> post_decision
/// ```
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/{token}", get(public_proposals::get_by_token))
        .route("/{token}/decision", post(public_proposals::post_decision))
}
