//! Route definitions for the `/lists` resource, including share grants
//! and embedded products.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{lists, products};
use crate::state::AppState;

/// Routes mounted at `/lists`.
///
/// ```text
/// GET    /                                  -> list (owned or shared)
/// POST   /                                  -> create
/// GET    /{id}                              -> get_by_id (view)
/// PUT    /{id}                              -> update (edit)
/// DELETE /{id}                              -> delete (owner)
///
/// POST   /{id}/share                        -> share (owner)
/// DELETE /{id}/share/{user_id}              -> unshare (owner)
///
/// POST   /{id}/products                     -> add_product (edit)
/// PUT    /{id}/products/{product_id}        -> update_product (edit)
/// DELETE /{id}/products/{product_id}        -> remove_product (edit)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(lists::list).post(lists::create))
        .route(
            "/{id}",
            get(lists::get_by_id)
                .put(lists::update)
                .delete(lists::delete),
        )
        .route("/{id}/share", post(lists::share))
        .route("/{id}/share/{user_id}", delete(lists::unshare))
        .route("/{id}/products", post(products::add_product))
        .route(
            "/{id}/products/{product_id}",
            axum::routing::put(products::update_product).delete(products::remove_product),
        )
}
