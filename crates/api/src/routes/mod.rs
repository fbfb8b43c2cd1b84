pub mod admin;
pub mod auth;
pub mod catalog;
pub mod categories;
pub mod health;
pub mod lists;
pub mod statistics;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                          register (public)
/// /auth/login                             login (public)
/// /auth/refresh                           refresh (public)
/// /auth/logout                            logout (requires auth)
///
/// /users/me                               get, update own profile
/// /users/me/password                      change own password (PUT)
///
/// /lists                                  list, create
/// /lists/{id}                             get (view), update (edit), delete (owner)
/// /lists/{id}/share                       share (POST, owner)
/// /lists/{id}/share/{user_id}             unshare (DELETE, owner)
/// /lists/{id}/products                    add product (POST, edit)
/// /lists/{id}/products/{product_id}       update, remove product (edit)
///
/// /categories                             active category tree (GET)
/// /categories/{id}                        get (GET)
///
/// /catalog                                search (GET), create (POST)
/// /catalog/{id}                           get (GET)
///
/// /statistics                             full snapshot (GET, admin)
/// /statistics/update                      recompute (POST, admin)
/// /statistics/user-growth                 projection (GET, admin)
/// /statistics/list-activity               projection (GET, admin)
/// /statistics/products                    projection (GET, admin)
///
/// /admin/users                            list (GET)
/// /admin/users/{id}                       get, update, delete
/// /admin/lists                            list all incl. soft-deleted (GET)
/// /admin/lists/{id}                       hard delete (DELETE)
/// /admin/categories                       create (POST)
/// /admin/categories/{id}                  update, delete
/// /admin/catalog/{id}                     update, delete
/// /admin/audit-logs                       query (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (register, login, refresh, logout).
        .nest("/auth", auth::router())
        // Self-service profile.
        .nest("/users", users::router())
        // Lists, shares, and embedded products.
        .nest("/lists", lists::router())
        // Category reads.
        .nest("/categories", categories::router())
        // Catalog search and contribution.
        .nest("/catalog", catalog::router())
        // Rollup statistics (admin only).
        .nest("/statistics", statistics::router())
        // Admin management (users, lists, categories, catalog, audit).
        .nest("/admin", admin::router())
}
