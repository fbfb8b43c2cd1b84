//! Handlers for product entries within a list
//! (`/lists/{id}/products`).
//!
//! All three operations require edit access and bump the parent list's
//! version through the compare-and-swap guard.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use basket_core::error::CoreError;
use basket_core::types::DbId;
use basket_db::models::list::ListProductPayload;
use basket_db::models::product::{ListProduct, UpdateListProduct};
use basket_db::repositories::{CatalogRepo, ListRepo, ProductRepo};
use serde_json::json;

use crate::audit::{self, ClientInfo};
use crate::error::{AppError, AppResult};
use crate::handlers::lists::{normalize_product, version_conflict};
use crate::middleware::list_access::EditListAccess;
use crate::state::AppState;

/// POST /api/v1/lists/{id}/products
///
/// Append a product entry. Catalog-backed entries must reference an
/// existing catalog item (whose usage counter is bumped, independently of
/// the list save); free-text entries must carry a name. The adder is
/// always the caller.
pub async fn add_product(
    State(state): State<AppState>,
    EditListAccess(access): EditListAccess,
    client: ClientInfo,
    Json(input): Json<ListProductPayload>,
) -> AppResult<(StatusCode, Json<ListProduct>)> {
    // Validate and resolve before touching the list, so a bad payload
    // never mutates anything. The adder is always the caller, so any
    // added_by in the payload is dropped before normalization.
    let payload = ListProductPayload {
        added_by: None,
        ..input.clone()
    };
    let new_product = normalize_product(&state.pool, &payload, access.user.user_id).await?;

    // Bump the version first: a stale read fails here before any write.
    if ListRepo::touch_version(&state.pool, access.list.id, access.list.version)
        .await?
        .is_none()
    {
        return Err(version_conflict(&state.pool, access.list.id).await?);
    }

    let product = ProductRepo::insert(&state.pool, access.list.id, &new_product).await?;

    // Usage tracking is persisted independently of the list save.
    if let Some(catalog_id) = input.catalog_item_id {
        CatalogRepo::record_usage(&state.pool, catalog_id).await?;
    }

    audit::record(
        &state.pool,
        Some(access.user.user_id),
        "list.product_add",
        Some("list"),
        Some(access.list.id),
        Some(json!({ "product_id": product.id, "name": product.name })),
        &client,
    )
    .await;

    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/v1/lists/{id}/products/{product_id}
///
/// Merge the provided fields into one product entry. An absent sub-id is
/// 404 and nothing is modified.
pub async fn update_product(
    State(state): State<AppState>,
    EditListAccess(access): EditListAccess,
    Path((_, product_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateListProduct>,
) -> AppResult<Json<ListProduct>> {
    // Probe first so an absent sub-id cannot bump the version.
    if ProductRepo::find(&state.pool, access.list.id, product_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id: product_id,
        }));
    }

    if ListRepo::touch_version(&state.pool, access.list.id, access.list.version)
        .await?
        .is_none()
    {
        return Err(version_conflict(&state.pool, access.list.id).await?);
    }

    let product = ProductRepo::update(&state.pool, access.list.id, product_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id: product_id,
        }))?;

    Ok(Json(product))
}

/// DELETE /api/v1/lists/{id}/products/{product_id}
///
/// Remove one product entry. Removing an absent sub-id is a no-op, not an
/// error. Returns 204 No Content.
pub async fn remove_product(
    State(state): State<AppState>,
    EditListAccess(access): EditListAccess,
    Path((_, product_id)): Path<(DbId, DbId)>,
    client: ClientInfo,
) -> AppResult<StatusCode> {
    // No-op when absent: nothing to remove, no version bump.
    if ProductRepo::find(&state.pool, access.list.id, product_id)
        .await?
        .is_none()
    {
        return Ok(StatusCode::NO_CONTENT);
    }

    if ListRepo::touch_version(&state.pool, access.list.id, access.list.version)
        .await?
        .is_none()
    {
        return Err(version_conflict(&state.pool, access.list.id).await?);
    }

    ProductRepo::delete(&state.pool, access.list.id, product_id).await?;

    audit::record(
        &state.pool,
        Some(access.user.user_id),
        "list.product_remove",
        Some("list"),
        Some(access.list.id),
        Some(json!({ "product_id": product_id })),
        &client,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
