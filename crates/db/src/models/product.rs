//! Product-in-list sub-entity model and DTOs.
//!
//! Product rows exist only as part of a list; they are created, mutated,
//! and removed through list operations and cascade with their parent.

use basket_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `list_products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ListProduct {
    pub id: DbId,
    pub list_id: DbId,
    pub catalog_item_id: Option<DbId>,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub is_purchased: bool,
    pub added_by: DbId,
    pub notes: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A product entry joined with the adder's username, for responses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductResponse {
    pub id: DbId,
    #[serde(skip)]
    pub list_id: DbId,
    pub catalog_item_id: Option<DbId>,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub is_purchased: bool,
    pub added_by: DbId,
    pub added_by_username: String,
    pub notes: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a product row (already normalized: name resolved,
/// added_by a valid user id).
#[derive(Debug, Clone)]
pub struct NewListProduct {
    pub catalog_item_id: Option<DbId>,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub is_purchased: bool,
    pub added_by: DbId,
    pub notes: String,
}

/// Sparse update for a product entry: only present fields are applied.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateListProduct {
    pub quantity: Option<f64>,
    pub is_purchased: Option<bool>,
    pub notes: Option<String>,
}
