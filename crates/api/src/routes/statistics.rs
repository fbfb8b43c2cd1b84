//! Route definitions for the `/statistics` resource (admin only).

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::statistics;
use crate::state::AppState;

/// Routes mounted at `/statistics`.
///
/// ```text
/// GET  /               -> get_full (lazily creates the snapshot)
/// POST /update         -> recompute (single-flight)
/// GET  /user-growth    -> user_growth
/// GET  /list-activity  -> list_activity
/// GET  /products       -> product_stats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(statistics::get_full))
        .route("/update", post(statistics::recompute))
        .route("/user-growth", get(statistics::user_growth))
        .route("/list-activity", get(statistics::list_activity))
        .route("/products", get(statistics::product_stats))
}
