//! Repository for the `list_products` table.
//!
//! Product rows are addressed by (list_id, product_id) everywhere so a
//! sub-id can never reach across lists.

use basket_core::types::DbId;
use sqlx::PgPool;

use crate::models::product::{ListProduct, NewListProduct, ProductResponse, UpdateListProduct};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, list_id, catalog_item_id, name, quantity, unit, \
                        is_purchased, added_by, notes, created_at, updated_at";

/// Provides operations on product entries within lists.
pub struct ProductRepo;

impl ProductRepo {
    /// Append a product entry to a list, returning the created row.
    pub async fn insert(
        pool: &PgPool,
        list_id: DbId,
        input: &NewListProduct,
    ) -> Result<ListProduct, sqlx::Error> {
        let query = format!(
            "INSERT INTO list_products
                (list_id, catalog_item_id, name, quantity, unit, is_purchased, added_by, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ListProduct>(&query)
            .bind(list_id)
            .bind(input.catalog_item_id)
            .bind(&input.name)
            .bind(input.quantity)
            .bind(&input.unit)
            .bind(input.is_purchased)
            .bind(input.added_by)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Find one product entry within a list.
    pub async fn find(
        pool: &PgPool,
        list_id: DbId,
        product_id: DbId,
    ) -> Result<Option<ListProduct>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM list_products WHERE list_id = $1 AND id = $2");
        sqlx::query_as::<_, ListProduct>(&query)
            .bind(list_id)
            .bind(product_id)
            .fetch_optional(pool)
            .await
    }

    /// All product entries of a list in insertion order.
    pub async fn list_for_list(
        pool: &PgPool,
        list_id: DbId,
    ) -> Result<Vec<ListProduct>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM list_products WHERE list_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, ListProduct>(&query)
            .bind(list_id)
            .fetch_all(pool)
            .await
    }

    /// Product entries of a set of lists joined with adder usernames, for
    /// response assembly without per-list round-trips.
    pub async fn responses_for_lists(
        pool: &PgPool,
        list_ids: &[DbId],
    ) -> Result<Vec<ProductResponse>, sqlx::Error> {
        sqlx::query_as::<_, ProductResponse>(
            "SELECT p.id, p.list_id, p.catalog_item_id, p.name, p.quantity, p.unit,
                    p.is_purchased, p.added_by, u.username AS added_by_username,
                    p.notes, p.created_at, p.updated_at
             FROM list_products p
             JOIN users u ON u.id = p.added_by
             WHERE p.list_id = ANY($1)
             ORDER BY p.id ASC",
        )
        .bind(list_ids)
        .fetch_all(pool)
        .await
    }

    /// Sparse update of one product entry. Only non-`None` fields in
    /// `input` are applied. Returns `None` if the entry does not exist in
    /// the given list.
    pub async fn update(
        pool: &PgPool,
        list_id: DbId,
        product_id: DbId,
        input: &UpdateListProduct,
    ) -> Result<Option<ListProduct>, sqlx::Error> {
        let query = format!(
            "UPDATE list_products SET
                quantity = COALESCE($3, quantity),
                is_purchased = COALESCE($4, is_purchased),
                notes = COALESCE($5, notes),
                updated_at = NOW()
             WHERE list_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ListProduct>(&query)
            .bind(list_id)
            .bind(product_id)
            .bind(input.quantity)
            .bind(input.is_purchased)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Remove one product entry. Returns `true` if a row was removed.
    pub async fn delete(
        pool: &PgPool,
        list_id: DbId,
        product_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM list_products WHERE list_id = $1 AND id = $2")
            .bind(list_id)
            .bind(product_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove every product entry of a list (full-document replacement).
    pub async fn delete_all_for_list(pool: &PgPool, list_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM list_products WHERE list_id = $1")
            .bind(list_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
