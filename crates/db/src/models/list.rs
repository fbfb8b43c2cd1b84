//! Shopping list entity model and DTOs.

use basket_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::product::ProductResponse;
use crate::models::share::ShareResponse;
use crate::models::user::UserSummary;

/// A row from the `lists` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct List {
    pub id: DbId,
    pub title: String,
    pub owner_id: DbId,
    pub priority: i32,
    pub status: String,
    /// Optimistic-concurrency token; bumped by every mutation.
    pub version: i64,
    pub is_deleted: bool,
    pub last_modified_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new list row.
#[derive(Debug)]
pub struct CreateList {
    pub title: String,
    pub owner_id: DbId,
    pub priority: i32,
    pub status: String,
}

/// DTO for the versioned list update. All fields are optional; only
/// present fields are applied.
#[derive(Debug, Default)]
pub struct UpdateList {
    pub title: Option<String>,
    pub priority: Option<i32>,
    pub status: Option<String>,
    pub is_deleted: Option<bool>,
}

/// Fully populated list for API responses: the row plus resolved owner,
/// share grants, and product entries.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub id: DbId,
    pub title: String,
    pub owner: UserSummary,
    pub priority: i32,
    pub status: String,
    pub version: i64,
    pub shared_users: Vec<ShareResponse>,
    pub products: Vec<ProductResponse>,
    pub last_modified_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The caller's effective permission, attached to single-list responses.
#[derive(Debug, Serialize)]
pub struct ListEnvelope {
    #[serde(flatten)]
    pub list: ListResponse,
    pub effective_permission: &'static str,
}

fn default_quantity() -> f64 {
    1.0
}

/// One product entry in a create/update list payload.
///
/// `added_by` accepts either a user id or a username; anything that does
/// not resolve falls back to the acting owner.
#[derive(Debug, Clone, Deserialize)]
pub struct ListProductPayload {
    pub catalog_item_id: Option<DbId>,
    pub name: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    pub unit: Option<String>,
    #[serde(default)]
    pub is_purchased: bool,
    pub added_by: Option<UserRef>,
    #[serde(default)]
    pub notes: String,
}

/// A user reference in a payload: numeric id or username.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Id(DbId),
    Username(String),
}
