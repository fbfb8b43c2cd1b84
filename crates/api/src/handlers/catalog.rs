//! Handlers for the `/catalog` resource.
//!
//! Any authenticated user can search the catalog and contribute new
//! items; editing and deleting existing items is admin-only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use basket_core::error::CoreError;
use basket_core::types::DbId;
use basket_db::models::catalog::{CatalogItem, CatalogQuery, CreateCatalogItem, UpdateCatalogItem};
use basket_db::repositories::{CatalogRepo, CategoryRepo};

use crate::audit::{self, ClientInfo};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// GET /api/v1/catalog
///
/// Search catalog items by name substring and/or category.
pub async fn search(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<CatalogQuery>,
) -> AppResult<Json<Vec<CatalogItem>>> {
    let items = CatalogRepo::search(&state.pool, &params).await?;
    Ok(Json(items))
}

/// GET /api/v1/catalog/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<CatalogItem>> {
    let item = CatalogRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Catalog item",
            id,
        }))?;
    Ok(Json(item))
}

/// POST /api/v1/catalog
///
/// Create a catalog item attributed to the caller. A duplicate name or
/// barcode maps to 409 via the unique constraints.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Json(input): Json<CreateCatalogItem>,
) -> AppResult<(StatusCode, Json<CatalogItem>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Catalog item name is required".into(),
        )));
    }

    if let Some(category_id) = input.category_id {
        if CategoryRepo::find_by_id(&state.pool, category_id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Category {category_id} does not exist"
            ))));
        }
    }

    let normalized = CreateCatalogItem {
        barcode: normalize_barcode(input.barcode),
        ..input
    };
    let default_unit = normalized.default_unit.clone().unwrap_or_else(|| "db".into());

    let item = CatalogRepo::create(&state.pool, &normalized, auth.user_id, &default_unit).await?;

    audit::record(
        &state.pool,
        Some(auth.user_id),
        "catalog.create",
        Some("catalog_item"),
        Some(item.id),
        None,
        &client,
    )
    .await;

    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/v1/admin/catalog/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCatalogItem>,
) -> AppResult<Json<CatalogItem>> {
    let normalized = UpdateCatalogItem {
        barcode: normalize_barcode(input.barcode),
        ..input
    };

    let item = CatalogRepo::update(&state.pool, id, &normalized)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Catalog item",
            id,
        }))?;
    Ok(Json(item))
}

/// DELETE /api/v1/admin/catalog/{id}
///
/// List entries referencing the item keep their copied name and lose the
/// reference. Returns 204 No Content.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    client: ClientInfo,
) -> AppResult<StatusCode> {
    let deleted = CatalogRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Catalog item",
            id,
        }));
    }

    audit::record(
        &state.pool,
        Some(admin.user_id),
        "catalog.delete",
        Some("catalog_item"),
        Some(id),
        None,
        &client,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// Barcodes are unique-when-present: an empty string means "absent" and
/// must be stored as NULL so it never collides in the partial index.
fn normalize_barcode(barcode: Option<String>) -> Option<String> {
    barcode.filter(|b| !b.trim().is_empty())
}
