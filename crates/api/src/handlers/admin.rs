//! Handlers for the `/admin` resource (user and list management).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use basket_core::error::CoreError;
use basket_core::roles::{ROLE_ADMIN, ROLE_USER};
use basket_core::status::UserStatus;
use basket_core::types::DbId;
use basket_db::models::list::List;
use basket_db::models::user::{UpdateUser, UserResponse};
use basket_db::repositories::{ListRepo, UserRepo};
use serde::Deserialize;
use serde_json::json;

use crate::audit::{self, ClientInfo};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// Request body for `PUT /admin/users/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// User management
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(UserResponse::from(&user)))
}

/// PUT /api/v1/admin/users/{id}
///
/// Update profile fields, role (`user`/`admin`), or status
/// (`active`/`banned`).
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    client: ClientInfo,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    if let Some(ref role) = input.role {
        if role != ROLE_USER && role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Invalid role: {role}"
            ))));
        }
    }
    if let Some(ref status) = input.status {
        UserStatus::parse(status).map_err(AppError::Core)?;
    }

    let update_dto = UpdateUser {
        username: input.username,
        email: input.email,
        role: input.role,
        status: input.status,
    };

    let user = UserRepo::update(&state.pool, id, &update_dto)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    audit::record(
        &state.pool,
        Some(admin.user_id),
        "admin.user_update",
        Some("user"),
        Some(id),
        Some(json!({ "role": user.role, "status": user.status })),
        &client,
    )
    .await;

    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Hard-delete a user; owned lists, shares, and sessions cascade.
/// Returns 204 No Content.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    client: ClientInfo,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "Admins cannot delete their own account".into(),
        )));
    }

    let deleted = UserRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }

    audit::record(
        &state.pool,
        Some(admin.user_id),
        "admin.user_delete",
        Some("user"),
        Some(id),
        None,
        &client,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// List management
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/lists
///
/// All lists, including soft-deleted ones.
pub async fn list_lists(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<List>>> {
    let lists = ListRepo::list_all(&state.pool).await?;
    Ok(Json(lists))
}

/// DELETE /api/v1/admin/lists/{id}
///
/// Hard-delete any list regardless of ownership or soft-delete state.
/// Returns 204 No Content.
pub async fn delete_list(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    client: ClientInfo,
) -> AppResult<StatusCode> {
    let deleted = ListRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "List", id }));
    }

    audit::record(
        &state.pool,
        Some(admin.user_id),
        "admin.list_delete",
        Some("list"),
        Some(id),
        None,
        &client,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
