//! Share grant model and DTOs.

use basket_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `list_shares` table.
#[derive(Debug, Clone, FromRow)]
pub struct ListShare {
    pub id: DbId,
    pub list_id: DbId,
    pub user_id: DbId,
    pub permission: String,
    pub created_at: Timestamp,
}

/// A share grant joined with the grantee's username, for responses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShareResponse {
    #[serde(skip)]
    pub list_id: DbId,
    pub user_id: DbId,
    pub username: String,
    pub permission: String,
    pub created_at: Timestamp,
}
