//! Product catalog entity model and DTOs.

use basket_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `catalog_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CatalogItem {
    pub id: DbId,
    pub name: String,
    pub category_id: Option<DbId>,
    pub default_unit: String,
    pub barcode: Option<String>,
    pub created_by: Option<DbId>,
    /// Incremented each time the item is added to a list.
    pub usage_count: i64,
    pub last_used_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a catalog item. `created_by` is set by the handler
/// from the authenticated identity, never from the request body.
#[derive(Debug, Deserialize)]
pub struct CreateCatalogItem {
    pub name: String,
    pub category_id: Option<DbId>,
    pub default_unit: Option<String>,
    pub barcode: Option<String>,
}

/// DTO for updating a catalog item. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCatalogItem {
    pub name: Option<String>,
    pub category_id: Option<DbId>,
    pub default_unit: Option<String>,
    pub barcode: Option<String>,
}

/// Filter parameters for catalog searches.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// Case-insensitive substring match on the item name.
    pub search: Option<String>,
    pub category_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
