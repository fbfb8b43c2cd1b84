//! List permission extractors.
//!
//! Each extractor authenticates the caller, reads the list id from the
//! request path, fetches the list once, and resolves the caller's
//! effective permission via [`basket_core::permissions`]. The fetched list
//! rides along into the handler so no second lookup is needed.
//!
//! Soft-deleted lists are invisible here: they resolve to 404 like a
//! missing row.

use std::collections::HashMap;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use basket_core::error::CoreError;
use basket_core::permissions::{resolve, PermissionLevel, RequiredAccess, SharePermission};
use basket_core::types::DbId;
use basket_db::models::list::List;
use basket_db::repositories::{ListRepo, ShareRepo};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// A resolved list access grant: the caller, the list, and the effective
/// permission the caller holds on it.
#[derive(Debug)]
pub struct ListAccess {
    pub user: AuthUser,
    pub list: List,
    pub permission: PermissionLevel,
}

/// Grants view, edit, or owner access. Rejects with 403 otherwise.
pub struct ViewListAccess(pub ListAccess);

/// Grants edit or owner access. Rejects with 403 otherwise.
pub struct EditListAccess(pub ListAccess);

/// Grants owner access only. Rejects with 403 otherwise.
pub struct OwnerListAccess(pub ListAccess);

impl FromRequestParts<AppState> for ViewListAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_access(parts, state, RequiredAccess::ViewOrAbove)
            .await
            .map(ViewListAccess)
    }
}

impl FromRequestParts<AppState> for EditListAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_access(parts, state, RequiredAccess::EditOrAbove)
            .await
            .map(EditListAccess)
    }
}

impl FromRequestParts<AppState> for OwnerListAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_access(parts, state, RequiredAccess::OwnerOnly)
            .await
            .map(OwnerListAccess)
    }
}

/// Shared resolution: authenticate, extract the list id, fetch, resolve.
async fn resolve_access(
    parts: &mut Parts,
    state: &AppState,
    required: RequiredAccess,
) -> Result<ListAccess, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;

    let list_id = extract_list_id(parts, state).await?;

    let list = ListRepo::find_visible_by_id(&state.pool, list_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "List",
            id: list_id,
        }))?;

    let shares = ShareRepo::list_for_list(&state.pool, list_id).await?;
    let grants: HashMap<DbId, SharePermission> = shares
        .iter()
        .filter_map(|s| SharePermission::parse(&s.permission).map(|p| (s.user_id, p)))
        .collect();

    let permission = resolve(list.owner_id, &grants, user.user_id, required).ok_or_else(|| {
        let msg = match required {
            RequiredAccess::ViewOrAbove => "You do not have access to this list",
            RequiredAccess::EditOrAbove => "Edit permission required for this list",
            RequiredAccess::OwnerOnly => "Only the list owner may perform this action",
        };
        AppError::Core(CoreError::Forbidden(msg.into()))
    })?;

    Ok(ListAccess {
        user,
        list,
        permission,
    })
}

/// Read the list id from the `id` path parameter, which every list route
/// uses for the list's position.
async fn extract_list_id(parts: &mut Parts, state: &AppState) -> Result<DbId, AppError> {
    let Path(params): Path<HashMap<String, String>> =
        Path::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::BadRequest("List id missing from request".into()))?;

    let raw = params
        .get("id")
        .ok_or_else(|| AppError::BadRequest("List id missing from request".into()))?;

    raw.parse::<DbId>()
        .map_err(|_| AppError::BadRequest(format!("Invalid list id: {raw}")))
}
