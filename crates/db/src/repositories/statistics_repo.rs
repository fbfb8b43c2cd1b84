//! Repository for the `statistics_snapshots` singleton and the corpus
//! scans that feed the aggregation engine.

use std::collections::HashMap;

use basket_core::stats::{ListFacts, ProductFacts, SeriesPoint, StatsRollup, UserFacts};
use basket_core::status::ListStatus;
use basket_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use crate::models::statistics::StatisticsSnapshot;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, snapshot_version, \
    total_users, active_users, new_users_this_month, \
    total_lists, active_lists, completed_lists, archived_lists, avg_lists_per_user, \
    total_products, avg_products_per_list, top_added_products, top_purchased_products, \
    avg_contributors_per_list, collaborative_lists_pct, \
    daily_active_users, weekly_active_users, monthly_active_users, last_updated_at";

/// Provides read/write access to the statistics singleton.
pub struct StatisticsRepo;

impl StatisticsRepo {
    /// Read the singleton snapshot, if one has been written yet.
    pub async fn find(pool: &PgPool) -> Result<Option<StatisticsSnapshot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM statistics_snapshots WHERE id = 1");
        sqlx::query_as::<_, StatisticsSnapshot>(&query)
            .fetch_optional(pool)
            .await
    }

    /// Read the singleton, lazily creating a zeroed row when absent.
    pub async fn find_or_create(pool: &PgPool) -> Result<StatisticsSnapshot, sqlx::Error> {
        sqlx::query("INSERT INTO statistics_snapshots (id) VALUES (1) ON CONFLICT (id) DO NOTHING")
            .execute(pool)
            .await?;
        let query = format!("SELECT {COLUMNS} FROM statistics_snapshots WHERE id = 1");
        sqlx::query_as::<_, StatisticsSnapshot>(&query)
            .fetch_one(pool)
            .await
    }

    /// Upsert the singleton with a freshly computed rollup and the merged
    /// time series. One statement, so the write is atomic;
    /// `snapshot_version` increments on every recompute.
    pub async fn upsert(
        pool: &PgPool,
        rollup: &StatsRollup,
        daily: &[SeriesPoint],
        weekly: &[SeriesPoint],
        monthly: &[SeriesPoint],
    ) -> Result<StatisticsSnapshot, sqlx::Error> {
        let query = format!(
            "INSERT INTO statistics_snapshots (id,
                total_users, active_users, new_users_this_month,
                total_lists, active_lists, completed_lists, archived_lists, avg_lists_per_user,
                total_products, avg_products_per_list, top_added_products, top_purchased_products,
                avg_contributors_per_list, collaborative_lists_pct,
                daily_active_users, weekly_active_users, monthly_active_users,
                last_updated_at)
             VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, NOW())
             ON CONFLICT (id) DO UPDATE SET
                snapshot_version = statistics_snapshots.snapshot_version + 1,
                total_users = EXCLUDED.total_users,
                active_users = EXCLUDED.active_users,
                new_users_this_month = EXCLUDED.new_users_this_month,
                total_lists = EXCLUDED.total_lists,
                active_lists = EXCLUDED.active_lists,
                completed_lists = EXCLUDED.completed_lists,
                archived_lists = EXCLUDED.archived_lists,
                avg_lists_per_user = EXCLUDED.avg_lists_per_user,
                total_products = EXCLUDED.total_products,
                avg_products_per_list = EXCLUDED.avg_products_per_list,
                top_added_products = EXCLUDED.top_added_products,
                top_purchased_products = EXCLUDED.top_purchased_products,
                avg_contributors_per_list = EXCLUDED.avg_contributors_per_list,
                collaborative_lists_pct = EXCLUDED.collaborative_lists_pct,
                daily_active_users = EXCLUDED.daily_active_users,
                weekly_active_users = EXCLUDED.weekly_active_users,
                monthly_active_users = EXCLUDED.monthly_active_users,
                last_updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StatisticsSnapshot>(&query)
            .bind(rollup.total_users)
            .bind(rollup.active_users)
            .bind(rollup.new_users_this_month)
            .bind(rollup.total_lists)
            .bind(rollup.active_lists)
            .bind(rollup.completed_lists)
            .bind(rollup.archived_lists)
            .bind(rollup.avg_lists_per_user)
            .bind(rollup.total_products)
            .bind(rollup.avg_products_per_list)
            .bind(Json(&rollup.top_added_products))
            .bind(Json(&rollup.top_purchased_products))
            .bind(rollup.avg_contributors_per_list)
            .bind(rollup.collaborative_lists_pct)
            .bind(Json(daily))
            .bind(Json(weekly))
            .bind(Json(monthly))
            .fetch_one(pool)
            .await
    }

    /// Scan all users into aggregation facts.
    pub async fn collect_user_facts(pool: &PgPool) -> Result<Vec<UserFacts>, sqlx::Error> {
        #[derive(FromRow)]
        struct Row {
            created_at: Timestamp,
            last_login_at: Option<Timestamp>,
        }

        let rows = sqlx::query_as::<_, Row>("SELECT created_at, last_login_at FROM users")
            .fetch_all(pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| UserFacts {
                created_at: r.created_at,
                last_login_at: r.last_login_at,
            })
            .collect())
    }

    /// Scan all visible lists and their product entries into aggregation
    /// facts. Soft-deleted lists are excluded.
    ///
    /// A list status the enum cannot parse counts as `active`; the CHECK
    /// constraint makes that unreachable in practice.
    pub async fn collect_list_facts(pool: &PgPool) -> Result<Vec<ListFacts>, sqlx::Error> {
        #[derive(FromRow)]
        struct ListRow {
            id: DbId,
            status: String,
        }

        #[derive(FromRow)]
        struct ProductRow {
            list_id: DbId,
            name: String,
            is_purchased: bool,
            added_by: DbId,
        }

        let list_rows = sqlx::query_as::<_, ListRow>(
            "SELECT id, status FROM lists WHERE is_deleted = false ORDER BY id ASC",
        )
        .fetch_all(pool)
        .await?;

        let product_rows = sqlx::query_as::<_, ProductRow>(
            "SELECT p.list_id, p.name, p.is_purchased, p.added_by
             FROM list_products p
             JOIN lists l ON l.id = p.list_id
             WHERE l.is_deleted = false
             ORDER BY p.id ASC",
        )
        .fetch_all(pool)
        .await?;

        let mut products_by_list: HashMap<DbId, Vec<ProductFacts>> = HashMap::new();
        for row in product_rows {
            products_by_list
                .entry(row.list_id)
                .or_default()
                .push(ProductFacts {
                    name: row.name,
                    is_purchased: row.is_purchased,
                    added_by: row.added_by,
                });
        }

        Ok(list_rows
            .into_iter()
            .map(|row| ListFacts {
                status: ListStatus::parse(&row.status).unwrap_or(ListStatus::Active),
                products: products_by_list.remove(&row.id).unwrap_or_default(),
            })
            .collect())
    }
}
