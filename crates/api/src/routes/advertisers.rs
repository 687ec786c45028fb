//! Route definitions for the `/advertisers` resource.
//!
//! Also nests the monthly topic routes and the sync trigger under
//! `/advertisers/{advertiser_id}/...`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{advertisers, topics};
use crate::state::AppState;

/// Routes mounted at `/advertisers`.
///
/// ```text
/// GET    /                                -> list
/// POST   /                                -> create
/// GET    /{id}                            -> get_by_id
/// PUT    /{id}                            -> update
/// DELETE /{id}                            -> delete
/// POST   /{id}/sync                       -> trigger_sync (202)
///
/// GET    /{advertiser_id}/topics          -> list (?month=YYYY-MM)
/// POST   /{advertiser_id}/topics          -> create
/// GET    /{advertiser_id}/topics/{id}     -> get_by_id
/// PUT    /{advertiser_id}/topics/{id}     -> update
/// DELETE /{advertiser_id}/topics/{id}     -> delete
/// ```
pub fn router() -> Router<AppState> {
    let topic_routes = Router::new()
        .route("/", get(topics::list).post(topics::create))
        .route(
            "/{id}",
            get(topics::get_by_id)
                .put(topics::update)
                .delete(topics::delete),
        );

    Router::new()
        .route("/", get(advertisers::list).post(advertisers::create))
        .route(
            "/{id}",
            get(advertisers::get_by_id)
                .put(advertisers::update)
                .delete(advertisers::delete),
        )
        .route("/{id}/sync", post(advertisers::trigger_sync))
        .nest("/{advertiser_id}/topics", topic_routes)
}
