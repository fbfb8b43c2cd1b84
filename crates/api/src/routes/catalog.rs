//! Route definitions for the `/catalog` resource.
//!
//! Editing and deleting existing items is admin-only and mounted under
//! `/admin/catalog` (see [`crate::routes::admin`]).

use axum::routing::get;
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// Routes mounted at `/catalog`.
///
/// ```text
/// GET  /      -> search (?search=&category_id=&limit=&offset=)
/// POST /      -> create (any authenticated user)
/// GET  /{id}  -> get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::search).post(catalog::create))
        .route("/{id}", get(catalog::get_by_id))
}
