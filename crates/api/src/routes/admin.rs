//! Route definitions for the `/admin` resource.
//!
//! Every handler mounted here enforces the `admin` role via
//! [`crate::middleware::rbac::RequireAdmin`].

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{admin, audit, catalog, categories};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /users             -> list_users
/// GET    /users/{id}        -> get_user
/// PUT    /users/{id}        -> update_user (role/status/profile)
/// DELETE /users/{id}        -> delete_user (hard)
///
/// GET    /lists             -> list_lists (incl. soft-deleted)
/// DELETE /lists/{id}        -> delete_list (hard)
///
/// POST   /categories        -> create
/// PUT    /categories/{id}   -> update
/// DELETE /categories/{id}   -> delete (refused while in use)
///
/// PUT    /catalog/{id}      -> update
/// DELETE /catalog/{id}      -> delete
///
/// GET    /audit-logs        -> query_audit_logs
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        .route("/lists", get(admin::list_lists))
        .route("/lists/{id}", delete(admin::delete_list))
        .route("/categories", post(categories::create))
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::delete),
        )
        .route(
            "/catalog/{id}",
            put(catalog::update).delete(catalog::delete),
        )
        .route("/audit-logs", get(audit::query_audit_logs))
}
