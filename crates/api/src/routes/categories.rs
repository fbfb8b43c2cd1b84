//! Route definitions for category reads.
//!
//! Category mutation is admin-only and mounted under `/admin/categories`
//! (see [`crate::routes::admin`]).

use axum::routing::get;
use axum::Router;

use crate::handlers::categories;
use crate::state::AppState;

/// Routes mounted at `/categories`.
///
/// ```text
/// GET /      -> list_tree (active categories as a tree)
/// GET /{id}  -> get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list_tree))
        .route("/{id}", get(categories::get_by_id))
}
