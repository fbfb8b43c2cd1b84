//! Repository for the `lists` table.
//!
//! Every mutation here is a guarded conditional update on `version`:
//! the caller supplies the version it read, the UPDATE matches only when
//! the stored version is unchanged, and the row comes back with
//! `version + 1`. A `None` return means the guard did not match -- either
//! the row is gone or another writer got there first; use [`ListRepo::exists`]
//! to tell the two apart.

use basket_core::types::DbId;
use sqlx::PgPool;

use crate::models::list::{CreateList, List, UpdateList};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, owner_id, priority, status, version, is_deleted, \
                        last_modified_at, created_at, updated_at";

/// Provides CRUD operations for lists.
pub struct ListRepo;

impl ListRepo {
    /// Insert a new list row (version starts at 1), returning it.
    pub async fn create(pool: &PgPool, input: &CreateList) -> Result<List, sqlx::Error> {
        let query = format!(
            "INSERT INTO lists (title, owner_id, priority, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, List>(&query)
            .bind(&input.title)
            .bind(input.owner_id)
            .bind(input.priority)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    /// Find a list by ID regardless of its soft-delete state (admin use).
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<List>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lists WHERE id = $1");
        sqlx::query_as::<_, List>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a list by ID, excluding soft-deleted rows.
    ///
    /// This is the lookup used by all standard read paths.
    pub async fn find_visible_by_id(pool: &PgPool, id: DbId) -> Result<Option<List>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lists WHERE id = $1 AND is_deleted = false");
        sqlx::query_as::<_, List>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists owned by or shared with the given user, excluding
    /// soft-deleted rows, most recently modified first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<List>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lists l
             WHERE l.is_deleted = false
               AND (l.owner_id = $1
                    OR EXISTS (SELECT 1 FROM list_shares s
                               WHERE s.list_id = l.id AND s.user_id = $1))
             ORDER BY l.last_modified_at DESC"
        );
        sqlx::query_as::<_, List>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// All lists including soft-deleted ones (admin use).
    pub async fn list_all(pool: &PgPool) -> Result<Vec<List>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lists ORDER BY created_at DESC");
        sqlx::query_as::<_, List>(&query).fetch_all(pool).await
    }

    /// All visible lists (the statistics scan).
    pub async fn list_visible(pool: &PgPool) -> Result<Vec<List>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM lists WHERE is_deleted = false ORDER BY id ASC");
        sqlx::query_as::<_, List>(&query).fetch_all(pool).await
    }

    /// Versioned field update. Only non-`None` fields in `input` are
    /// applied. Returns `None` when the id/version guard did not match.
    pub async fn update_versioned(
        pool: &PgPool,
        id: DbId,
        expected_version: i64,
        input: &UpdateList,
    ) -> Result<Option<List>, sqlx::Error> {
        let query = format!(
            "UPDATE lists SET
                title = COALESCE($3, title),
                priority = COALESCE($4, priority),
                status = COALESCE($5, status),
                is_deleted = COALESCE($6, is_deleted),
                version = version + 1,
                last_modified_at = NOW(),
                updated_at = NOW()
             WHERE id = $1 AND version = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, List>(&query)
            .bind(id)
            .bind(expected_version)
            .bind(&input.title)
            .bind(input.priority)
            .bind(&input.status)
            .bind(input.is_deleted)
            .fetch_optional(pool)
            .await
    }

    /// Versioned bump with no field changes, used after product or share
    /// mutations. Returns `None` when the guard did not match.
    pub async fn touch_version(
        pool: &PgPool,
        id: DbId,
        expected_version: i64,
    ) -> Result<Option<List>, sqlx::Error> {
        let query = format!(
            "UPDATE lists SET
                version = version + 1,
                last_modified_at = NOW(),
                updated_at = NOW()
             WHERE id = $1 AND version = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, List>(&query)
            .bind(id)
            .bind(expected_version)
            .fetch_optional(pool)
            .await
    }

    /// Whether a row with the given id exists at all (any delete state).
    ///
    /// Used to distinguish a version conflict from a vanished row after a
    /// failed guard.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM lists WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(found.is_some())
    }

    /// Hard-delete a list. Shares and products cascade.
    ///
    /// Returns `true` if the row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
