//! Audit trail recording.
//!
//! Recording is fire-and-forget: a failed insert is logged and never
//! surfaced to the caller, so audit problems cannot fail user requests.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use basket_core::types::DbId;
use basket_db::models::audit::CreateAuditLog;
use basket_db::repositories::AuditLogRepo;
use basket_db::DbPool;

use crate::state::AppState;

/// Client network details captured into audit entries.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl FromRequestParts<AppState> for ClientInfo {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        };

        // Behind a proxy the client address is the first entry of
        // X-Forwarded-For.
        let ip_address = header("x-forwarded-for")
            .map(|v| v.split(',').next().unwrap_or("").trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(ClientInfo {
            ip_address,
            user_agent: header("user-agent"),
        })
    }
}

/// Record one audit entry. Errors are logged, not propagated.
pub async fn record(
    pool: &DbPool,
    user_id: Option<DbId>,
    action_type: &str,
    entity_type: Option<&str>,
    entity_id: Option<DbId>,
    details: Option<serde_json::Value>,
    client: &ClientInfo,
) {
    let entry = CreateAuditLog {
        user_id,
        action_type: action_type.to_string(),
        entity_type: entity_type.map(|s| s.to_string()),
        entity_id,
        details_json: details,
        ip_address: client.ip_address.clone(),
        user_agent: client.user_agent.clone(),
    };

    if let Err(e) = AuditLogRepo::insert(pool, &entry).await {
        tracing::warn!(error = %e, action = %entry.action_type, "Audit record failed");
    }
}
