//! Handlers for the `/statistics` resource (admin only).
//!
//! `recompute` is the Statistics Aggregator's entry point: a full-corpus
//! scan, the pure aggregation pass, and one atomic upsert of the
//! singleton snapshot. Recomputation is serialized by the single-flight
//! guard in [`AppState`]; a concurrent trigger fails with 409 instead of
//! starting a second scan.

use axum::extract::State;
use axum::Json;
use basket_core::error::CoreError;
use basket_core::stats::{self, SeriesPoint};
use basket_db::models::statistics::{
    ListActivityStats, ProductStats, StatisticsSnapshot, UserGrowthStats,
};
use basket_db::repositories::StatisticsRepo;

use crate::audit::{self, ClientInfo};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/statistics/update
///
/// Recompute the rollup from a full scan of users and lists and upsert
/// the singleton snapshot. Idempotent for unchanged underlying data
/// (aside from `snapshot_version` and `last_updated_at`).
pub async fn recompute(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
) -> AppResult<Json<DataResponse<StatisticsSnapshot>>> {
    // Single-flight: hold the guard for the whole scan + write.
    let _guard = state.stats_refresh.try_lock().map_err(|_| {
        AppError::Core(CoreError::Conflict(
            "Statistics recompute already in progress".into(),
        ))
    })?;

    let users = StatisticsRepo::collect_user_facts(&state.pool).await?;
    let lists = StatisticsRepo::collect_list_facts(&state.pool).await?;

    let bounds = stats::bounds_now();
    let rollup = stats::aggregate(&users, &lists, &bounds);

    // Merge the period counters into the persisted series under the
    // retention policy (same-period replace + max-points prune).
    let existing = StatisticsRepo::find(&state.pool).await?;
    let max_points = state.config.stats_series_max_points;

    let (mut daily, mut weekly, mut monthly) = match &existing {
        Some(snapshot) => (
            parse_series(&snapshot.daily_active_users),
            parse_series(&snapshot.weekly_active_users),
            parse_series(&snapshot.monthly_active_users),
        ),
        None => (Vec::new(), Vec::new(), Vec::new()),
    };

    stats::merge_series(&mut daily, bounds.daily_key(), rollup.daily_active_users, max_points);
    stats::merge_series(&mut weekly, bounds.weekly_key(), rollup.weekly_active_users, max_points);
    stats::merge_series(
        &mut monthly,
        bounds.monthly_key(),
        rollup.monthly_active_users,
        max_points,
    );

    let snapshot = StatisticsRepo::upsert(&state.pool, &rollup, &daily, &weekly, &monthly).await?;

    tracing::info!(
        snapshot_version = snapshot.snapshot_version,
        total_users = snapshot.total_users,
        total_lists = snapshot.total_lists,
        "Statistics snapshot recomputed"
    );

    audit::record(
        &state.pool,
        Some(admin.user_id),
        "statistics.recompute",
        Some("statistics"),
        Some(1),
        None,
        &client,
    )
    .await;

    Ok(Json(DataResponse { data: snapshot }))
}

/// GET /api/v1/statistics
///
/// The full snapshot, lazily created (zeroed) when none exists yet.
pub async fn get_full(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<StatisticsSnapshot>>> {
    let snapshot = StatisticsRepo::find_or_create(&state.pool).await?;
    Ok(Json(DataResponse { data: snapshot }))
}

/// GET /api/v1/statistics/user-growth
pub async fn user_growth(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<UserGrowthStats>>> {
    let snapshot = require_snapshot(&state).await?;
    Ok(Json(DataResponse {
        data: snapshot.user_growth(),
    }))
}

/// GET /api/v1/statistics/list-activity
pub async fn list_activity(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<ListActivityStats>>> {
    let snapshot = require_snapshot(&state).await?;
    Ok(Json(DataResponse {
        data: snapshot.list_activity(),
    }))
}

/// GET /api/v1/statistics/products
pub async fn product_stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<ProductStats>>> {
    let snapshot = require_snapshot(&state).await?;
    Ok(Json(DataResponse {
        data: snapshot.product_stats(),
    }))
}

/// The projections require an existing snapshot; 404 before the first
/// recompute.
async fn require_snapshot(state: &AppState) -> AppResult<StatisticsSnapshot> {
    StatisticsRepo::find(&state.pool)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Statistics snapshot",
            id: 1,
        }))
}

/// Parse a persisted JSONB series; malformed content degrades to empty
/// rather than failing the recompute.
fn parse_series(value: &serde_json::Value) -> Vec<SeriesPoint> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}
