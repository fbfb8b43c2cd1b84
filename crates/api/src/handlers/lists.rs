//! Handlers for the `/lists` resource: creation, listing, retrieval,
//! versioned update, deletion, and share management.
//!
//! Permission gating happens in the extractors
//! ([`crate::middleware::list_access`]); by the time a handler runs, the
//! list has been fetched once and the caller's effective permission is
//! known.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use basket_core::error::CoreError;
use basket_core::permissions::SharePermission;
use basket_core::status::ListStatus;
use basket_core::types::DbId;
use basket_db::models::list::{
    CreateList, List, ListEnvelope, ListProductPayload, ListResponse, UpdateList, UserRef,
};
use basket_db::models::product::NewListProduct;
use basket_db::models::share::ShareResponse;
use basket_db::repositories::{CatalogRepo, ListRepo, ProductRepo, ShareRepo, UserRepo};
use basket_db::DbPool;
use serde::Deserialize;
use serde_json::json;

use crate::audit::{self, ClientInfo};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::list_access::{EditListAccess, OwnerListAccess, ViewListAccess};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /lists`.
#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    pub title: String,
    #[serde(default)]
    pub priority: i32,
    pub status: Option<String>,
    #[serde(default)]
    pub products: Vec<ListProductPayload>,
}

/// Request body for `PUT /lists/{id}`.
///
/// `version` is the optimistic-concurrency token the client read; when
/// omitted, the version fetched by the permission extractor is used.
/// When `products` is present the embedded product set is replaced
/// wholesale.
#[derive(Debug, Deserialize)]
pub struct UpdateListRequest {
    pub title: Option<String>,
    pub priority: Option<i32>,
    pub status: Option<String>,
    pub is_deleted: Option<bool>,
    pub version: Option<i64>,
    pub products: Option<Vec<ListProductPayload>>,
}

/// Request body for `POST /lists/{id}/share`.
#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub username: String,
    pub permission: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/lists
///
/// Create a list owned by the caller. Product entries may name their adder
/// by id or username; anything unresolvable falls back to the caller.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Json(input): Json<CreateListRequest>,
) -> AppResult<(StatusCode, Json<ListResponse>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "List title is required".into(),
        )));
    }

    let status = parse_status(input.status.as_deref())?;

    let create_dto = CreateList {
        title: input.title,
        owner_id: auth.user_id,
        priority: input.priority,
        status: status.as_str().to_string(),
    };
    let list = ListRepo::create(&state.pool, &create_dto).await?;

    for payload in &input.products {
        let product = normalize_product(&state.pool, payload, auth.user_id).await?;
        ProductRepo::insert(&state.pool, list.id, &product).await?;
    }

    audit::record(
        &state.pool,
        Some(auth.user_id),
        "list.create",
        Some("list"),
        Some(list.id),
        None,
        &client,
    )
    .await;

    let response = assemble_one(&state.pool, &list).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/lists
///
/// Lists owned by or shared with the caller, fully populated.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<ListResponse>>> {
    let lists = ListRepo::list_for_user(&state.pool, auth.user_id).await?;
    let responses = assemble_many(&state.pool, lists).await?;
    Ok(Json(responses))
}

/// GET /api/v1/lists/{id}
///
/// Requires view access. The response carries the caller's effective
/// permission alongside the populated list.
pub async fn get_by_id(
    State(state): State<AppState>,
    ViewListAccess(access): ViewListAccess,
) -> AppResult<Json<ListEnvelope>> {
    let response = assemble_one(&state.pool, &access.list).await?;
    Ok(Json(ListEnvelope {
        list: response,
        effective_permission: access.permission.as_str(),
    }))
}

/// PUT /api/v1/lists/{id}
///
/// Requires edit access. Guarded by the version compare-and-swap: a stale
/// version produces 409.
pub async fn update(
    State(state): State<AppState>,
    EditListAccess(access): EditListAccess,
    client: ClientInfo,
    Json(input): Json<UpdateListRequest>,
) -> AppResult<Json<ListResponse>> {
    let status = match input.status.as_deref() {
        Some(s) => Some(parse_status(Some(s))?.as_str().to_string()),
        None => None,
    };

    let expected_version = input.version.unwrap_or(access.list.version);

    let update_dto = UpdateList {
        title: input.title,
        priority: input.priority,
        status,
        is_deleted: input.is_deleted,
    };

    let list = match ListRepo::update_versioned(&state.pool, access.list.id, expected_version, &update_dto)
        .await?
    {
        Some(list) => list,
        None => return Err(version_conflict(&state.pool, access.list.id).await?),
    };

    // Full-document semantics: a present product array replaces the
    // embedded set, with the same adder normalization as create.
    if let Some(ref payloads) = input.products {
        let mut products = Vec::with_capacity(payloads.len());
        for payload in payloads {
            products.push(normalize_product(&state.pool, payload, list.owner_id).await?);
        }
        ProductRepo::delete_all_for_list(&state.pool, list.id).await?;
        for product in &products {
            ProductRepo::insert(&state.pool, list.id, product).await?;
        }
    }

    audit::record(
        &state.pool,
        Some(access.user.user_id),
        "list.update",
        Some("list"),
        Some(list.id),
        None,
        &client,
    )
    .await;

    let response = assemble_one(&state.pool, &list).await?;
    Ok(Json(response))
}

/// DELETE /api/v1/lists/{id}
///
/// Owner only. Hard-deletes the list; shares and products cascade.
pub async fn delete(
    State(state): State<AppState>,
    OwnerListAccess(access): OwnerListAccess,
    client: ClientInfo,
) -> AppResult<StatusCode> {
    let deleted = ListRepo::delete(&state.pool, access.list.id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "List",
            id: access.list.id,
        }));
    }

    audit::record(
        &state.pool,
        Some(access.user.user_id),
        "list.delete",
        Some("list"),
        Some(access.list.id),
        None,
        &client,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/lists/{id}/share
///
/// Owner only. Grants view (default) or edit permission to another user.
/// Sharing twice with the same user is a 409; sharing with the owner is
/// rejected outright.
pub async fn share(
    State(state): State<AppState>,
    OwnerListAccess(access): OwnerListAccess,
    client: ClientInfo,
    Json(input): Json<ShareRequest>,
) -> AppResult<(StatusCode, Json<ShareResponse>)> {
    let permission = match input.permission.as_deref() {
        None => SharePermission::View,
        Some(raw) => SharePermission::parse(raw).ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Invalid permission level: {raw}"
            )))
        })?,
    };

    let target = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundNamed {
                entity: "User",
                name: input.username.clone(),
            })
        })?;

    if target.id == access.list.owner_id {
        return Err(AppError::Core(CoreError::Validation(
            "Cannot share a list with its owner".into(),
        )));
    }

    if ShareRepo::find(&state.pool, access.list.id, target.id)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "List is already shared with '{}'",
            target.username
        ))));
    }

    let share = ShareRepo::create(&state.pool, access.list.id, target.id, permission.as_str())
        .await?;

    audit::record(
        &state.pool,
        Some(access.user.user_id),
        "list.share",
        Some("list"),
        Some(access.list.id),
        Some(json!({ "target_user_id": target.id, "permission": permission.as_str() })),
        &client,
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(ShareResponse {
            list_id: share.list_id,
            user_id: target.id,
            username: target.username,
            permission: share.permission,
            created_at: share.created_at,
        }),
    ))
}

/// DELETE /api/v1/lists/{id}/share/{user_id}
///
/// Owner only. Removing a grant that does not exist is a no-op, so the
/// operation is idempotent. Returns 204 No Content.
pub async fn unshare(
    State(state): State<AppState>,
    OwnerListAccess(access): OwnerListAccess,
    Path((_, target_user_id)): Path<(DbId, DbId)>,
    client: ClientInfo,
) -> AppResult<StatusCode> {
    let removed = ShareRepo::delete(&state.pool, access.list.id, target_user_id).await?;

    if removed > 0 {
        audit::record(
            &state.pool,
            Some(access.user.user_id),
            "list.unshare",
            Some("list"),
            Some(access.list.id),
            Some(json!({ "target_user_id": target_user_id })),
            &client,
        )
        .await;
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Shared helpers (also used by the product handlers)
// ---------------------------------------------------------------------------

/// Parse an optional status string, defaulting to `active`.
fn parse_status(raw: Option<&str>) -> AppResult<ListStatus> {
    match raw {
        None => Ok(ListStatus::Active),
        Some(s) => ListStatus::parse(s).map_err(AppError::Core),
    }
}

/// Map a failed version guard to the right error: 409 when the row still
/// exists (someone else won the race), 404 when it is gone.
pub(crate) async fn version_conflict(pool: &DbPool, list_id: DbId) -> AppResult<AppError> {
    if ListRepo::exists(pool, list_id).await? {
        Ok(AppError::Core(CoreError::Conflict(
            "List was modified concurrently; reload and retry".into(),
        )))
    } else {
        Ok(AppError::Core(CoreError::NotFound {
            entity: "List",
            id: list_id,
        }))
    }
}

/// Resolve a payload's `added_by` reference to a real user id.
///
/// Absent, unknown-id, and unknown-username references all fall back to
/// the acting owner.
async fn resolve_added_by(
    pool: &DbPool,
    added_by: &Option<UserRef>,
    owner_id: DbId,
) -> AppResult<DbId> {
    match added_by {
        None => Ok(owner_id),
        Some(UserRef::Id(id)) => match UserRepo::find_by_id(pool, *id).await? {
            Some(user) => Ok(user.id),
            None => Ok(owner_id),
        },
        Some(UserRef::Username(username)) => {
            match UserRepo::find_by_username(pool, username).await? {
                Some(user) => Ok(user.id),
                None => Ok(owner_id),
            }
        }
    }
}

/// Turn a product payload into an insertable row: validate the catalog
/// reference or free-text name, resolve defaults, normalize the adder.
pub(crate) async fn normalize_product(
    pool: &DbPool,
    payload: &ListProductPayload,
    fallback_owner: DbId,
) -> AppResult<NewListProduct> {
    let (name, unit) = match payload.catalog_item_id {
        Some(catalog_id) => {
            let item = CatalogRepo::find_by_id(pool, catalog_id)
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::Validation(format!(
                        "Catalog item {catalog_id} does not exist"
                    )))
                })?;
            let name = payload.name.clone().unwrap_or(item.name);
            let unit = payload.unit.clone().unwrap_or(item.default_unit);
            (name, unit)
        }
        None => {
            let name = payload
                .name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| {
                    AppError::Core(CoreError::Validation(
                        "Product name is required for free-text entries".into(),
                    ))
                })?;
            let unit = payload.unit.clone().unwrap_or_else(|| "db".to_string());
            (name, unit)
        }
    };

    let added_by = resolve_added_by(pool, &payload.added_by, fallback_owner).await?;

    Ok(NewListProduct {
        catalog_item_id: payload.catalog_item_id,
        name,
        quantity: payload.quantity,
        unit,
        is_purchased: payload.is_purchased,
        added_by,
        notes: payload.notes.clone(),
    })
}

/// Populate one list row with owner, shares, and products.
pub(crate) async fn assemble_one(pool: &DbPool, list: &List) -> AppResult<ListResponse> {
    let mut responses = assemble_many(pool, vec![list.clone()]).await?;
    responses.pop().ok_or_else(|| {
        AppError::InternalError("List response assembly produced no output".into())
    })
}

/// Populate a batch of list rows with owners, shares, and products using
/// three set-valued queries instead of per-list round-trips.
pub(crate) async fn assemble_many(
    pool: &DbPool,
    lists: Vec<List>,
) -> AppResult<Vec<ListResponse>> {
    if lists.is_empty() {
        return Ok(Vec::new());
    }

    let list_ids: Vec<DbId> = lists.iter().map(|l| l.id).collect();
    let owner_ids: Vec<DbId> = lists.iter().map(|l| l.owner_id).collect();

    let owners = UserRepo::summaries(pool, &owner_ids).await?;
    let mut shares = ShareRepo::responses_for_lists(pool, &list_ids).await?;
    let mut products = ProductRepo::responses_for_lists(pool, &list_ids).await?;

    let mut responses = Vec::with_capacity(lists.len());
    for list in lists {
        let owner = owners
            .iter()
            .find(|o| o.id == list.owner_id)
            .cloned()
            .ok_or_else(|| {
                AppError::InternalError(format!("Owner {} missing for list {}", list.owner_id, list.id))
            })?;

        let (list_shares, rest_shares) = shares.into_iter().partition(|s| s.list_id == list.id);
        shares = rest_shares;
        let (list_products, rest_products) =
            products.into_iter().partition(|p| p.list_id == list.id);
        products = rest_products;

        responses.push(ListResponse {
            id: list.id,
            title: list.title,
            owner,
            priority: list.priority,
            status: list.status,
            version: list.version,
            shared_users: list_shares,
            products: list_products,
            last_modified_at: list.last_modified_at,
            created_at: list.created_at,
            updated_at: list.updated_at,
        });
    }

    Ok(responses)
}
