//! Handlers for audit log queries. Admin only.

use axum::extract::{Query, State};
use axum::Json;
use basket_db::models::audit::{AuditLogPage, AuditQuery};
use basket_db::repositories::AuditLogRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// GET /api/v1/admin/audit-logs
///
/// Query audit logs with filters and pagination, newest first.
pub async fn query_audit_logs(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<AuditQuery>,
) -> AppResult<Json<AuditLogPage>> {
    let items = AuditLogRepo::query(&state.pool, &params).await?;
    let total = AuditLogRepo::count(&state.pool, &params).await?;

    Ok(Json(AuditLogPage { items, total }))
}
