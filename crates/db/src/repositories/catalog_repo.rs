//! Repository for the `catalog_items` table.

use basket_core::types::DbId;
use sqlx::PgPool;

use crate::models::catalog::{CatalogItem, CatalogQuery, CreateCatalogItem, UpdateCatalogItem};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, category_id, default_unit, barcode, created_by, \
                        usage_count, last_used_at, created_at, updated_at";

/// Default page size for catalog searches.
const DEFAULT_LIMIT: i64 = 50;
/// Maximum page size for catalog searches.
const MAX_LIMIT: i64 = 200;

/// Provides CRUD and usage-tracking operations for catalog items.
pub struct CatalogRepo;

impl CatalogRepo {
    /// Insert a new catalog item, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCatalogItem,
        created_by: DbId,
        default_unit: &str,
    ) -> Result<CatalogItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO catalog_items (name, category_id, default_unit, barcode, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CatalogItem>(&query)
            .bind(&input.name)
            .bind(input.category_id)
            .bind(default_unit)
            .bind(&input.barcode)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a catalog item by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CatalogItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM catalog_items WHERE id = $1");
        sqlx::query_as::<_, CatalogItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Search catalog items by optional name substring and category.
    ///
    /// Most-used items first, then alphabetical.
    pub async fn search(
        pool: &PgPool,
        params: &CatalogQuery,
    ) -> Result<Vec<CatalogItem>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx = 1u32;

        if params.search.is_some() {
            conditions.push(format!("name ILIKE ${bind_idx}"));
            bind_idx += 1;
        }
        if params.category_id.is_some() {
            conditions.push(format!("category_id = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM catalog_items {where_clause}
             ORDER BY usage_count DESC, name ASC
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let mut q = sqlx::query_as::<_, CatalogItem>(&query);
        if let Some(ref search) = params.search {
            q = q.bind(format!("%{search}%"));
        }
        if let Some(category_id) = params.category_id {
            q = q.bind(category_id);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Update a catalog item. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCatalogItem,
    ) -> Result<Option<CatalogItem>, sqlx::Error> {
        let query = format!(
            "UPDATE catalog_items SET
                name = COALESCE($2, name),
                category_id = COALESCE($3, category_id),
                default_unit = COALESCE($4, default_unit),
                barcode = COALESCE($5, barcode),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CatalogItem>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.category_id)
            .bind(&input.default_unit)
            .bind(&input.barcode)
            .fetch_optional(pool)
            .await
    }

    /// Record one use of a catalog item: bump `usage_count` and stamp
    /// `last_used_at`. Persisted independently of any list save.
    pub async fn record_usage(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE catalog_items SET
                usage_count = usage_count + 1,
                last_used_at = NOW(),
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Number of catalog items referencing a category.
    pub async fn count_by_category(pool: &PgPool, category_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM catalog_items WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(pool)
            .await
    }

    /// Hard-delete a catalog item. List entries keep their copied name and
    /// lose the reference (FK is ON DELETE SET NULL).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM catalog_items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
