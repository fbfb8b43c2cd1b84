//! Repository for the `list_shares` table.

use basket_core::types::DbId;
use sqlx::PgPool;

use crate::models::share::{ListShare, ShareResponse};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, list_id, user_id, permission, created_at";

/// Provides operations on share grants.
pub struct ShareRepo;

impl ShareRepo {
    /// Insert a share grant, returning the created row.
    ///
    /// The `uq_list_shares_list_user` constraint rejects a duplicate grant
    /// for the same (list, user) pair.
    pub async fn create(
        pool: &PgPool,
        list_id: DbId,
        user_id: DbId,
        permission: &str,
    ) -> Result<ListShare, sqlx::Error> {
        let query = format!(
            "INSERT INTO list_shares (list_id, user_id, permission)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ListShare>(&query)
            .bind(list_id)
            .bind(user_id)
            .bind(permission)
            .fetch_one(pool)
            .await
    }

    /// Find the grant for a specific user on a specific list.
    pub async fn find(
        pool: &PgPool,
        list_id: DbId,
        user_id: DbId,
    ) -> Result<Option<ListShare>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM list_shares WHERE list_id = $1 AND user_id = $2");
        sqlx::query_as::<_, ListShare>(&query)
            .bind(list_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// All grants on a list (for permission resolution).
    pub async fn list_for_list(pool: &PgPool, list_id: DbId) -> Result<Vec<ListShare>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM list_shares WHERE list_id = $1 ORDER BY created_at ASC");
        sqlx::query_as::<_, ListShare>(&query)
            .bind(list_id)
            .fetch_all(pool)
            .await
    }

    /// Grants on a set of lists joined with grantee usernames, for
    /// response assembly without per-list round-trips.
    pub async fn responses_for_lists(
        pool: &PgPool,
        list_ids: &[DbId],
    ) -> Result<Vec<ShareResponse>, sqlx::Error> {
        sqlx::query_as::<_, ShareResponse>(
            "SELECT s.list_id, s.user_id, u.username, s.permission, s.created_at
             FROM list_shares s
             JOIN users u ON u.id = s.user_id
             WHERE s.list_id = ANY($1)
             ORDER BY s.created_at ASC",
        )
        .bind(list_ids)
        .fetch_all(pool)
        .await
    }

    /// Remove the grant for a user on a list. Idempotent: returns the
    /// number of rows removed (0 when no grant existed).
    pub async fn delete(pool: &PgPool, list_id: DbId, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM list_shares WHERE list_id = $1 AND user_id = $2")
            .bind(list_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
