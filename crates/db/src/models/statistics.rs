//! Statistics snapshot model and read-side projections.

use basket_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// The singleton row from `statistics_snapshots` (id always 1).
///
/// Ranking and time-series columns are JSONB holding
/// `basket_core::stats::ProductCount` / `SeriesPoint` arrays.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatisticsSnapshot {
    #[serde(skip)]
    pub id: i32,
    pub snapshot_version: i64,

    pub total_users: i64,
    pub active_users: i64,
    pub new_users_this_month: i64,

    pub total_lists: i64,
    pub active_lists: i64,
    pub completed_lists: i64,
    pub archived_lists: i64,
    pub avg_lists_per_user: f64,

    pub total_products: i64,
    pub avg_products_per_list: f64,
    pub top_added_products: serde_json::Value,
    pub top_purchased_products: serde_json::Value,

    pub avg_contributors_per_list: f64,
    pub collaborative_lists_pct: f64,

    pub daily_active_users: serde_json::Value,
    pub weekly_active_users: serde_json::Value,
    pub monthly_active_users: serde_json::Value,

    pub last_updated_at: Timestamp,
}

/// Projection served by the user-growth accessor.
#[derive(Debug, Serialize)]
pub struct UserGrowthStats {
    pub total_users: i64,
    pub active_users: i64,
    pub new_users_this_month: i64,
    pub daily_active_users: serde_json::Value,
    pub weekly_active_users: serde_json::Value,
    pub monthly_active_users: serde_json::Value,
    pub last_updated_at: Timestamp,
}

/// Projection served by the list-activity accessor.
#[derive(Debug, Serialize)]
pub struct ListActivityStats {
    pub total_lists: i64,
    pub active_lists: i64,
    pub completed_lists: i64,
    pub archived_lists: i64,
    pub avg_lists_per_user: f64,
    pub avg_contributors_per_list: f64,
    pub collaborative_lists_pct: f64,
    pub last_updated_at: Timestamp,
}

/// Projection served by the product-stats accessor.
#[derive(Debug, Serialize)]
pub struct ProductStats {
    pub total_products: i64,
    pub avg_products_per_list: f64,
    pub top_added_products: serde_json::Value,
    pub top_purchased_products: serde_json::Value,
    pub last_updated_at: Timestamp,
}

impl StatisticsSnapshot {
    pub fn user_growth(&self) -> UserGrowthStats {
        UserGrowthStats {
            total_users: self.total_users,
            active_users: self.active_users,
            new_users_this_month: self.new_users_this_month,
            daily_active_users: self.daily_active_users.clone(),
            weekly_active_users: self.weekly_active_users.clone(),
            monthly_active_users: self.monthly_active_users.clone(),
            last_updated_at: self.last_updated_at,
        }
    }

    pub fn list_activity(&self) -> ListActivityStats {
        ListActivityStats {
            total_lists: self.total_lists,
            active_lists: self.active_lists,
            completed_lists: self.completed_lists,
            archived_lists: self.archived_lists,
            avg_lists_per_user: self.avg_lists_per_user,
            avg_contributors_per_list: self.avg_contributors_per_list,
            collaborative_lists_pct: self.collaborative_lists_pct,
            last_updated_at: self.last_updated_at,
        }
    }

    pub fn product_stats(&self) -> ProductStats {
        ProductStats {
            total_products: self.total_products,
            avg_products_per_list: self.avg_products_per_list,
            top_added_products: self.top_added_products.clone(),
            top_purchased_products: self.top_purchased_products.clone(),
            last_updated_at: self.last_updated_at,
        }
    }
}
