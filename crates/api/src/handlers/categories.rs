//! Handlers for the `/categories` resource.
//!
//! Reads are open to any authenticated user; mutation is admin-only and
//! routed under `/admin/categories`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use basket_core::error::CoreError;
use basket_core::types::DbId;
use basket_db::models::category::{Category, CategoryNode, CreateCategory, UpdateCategory};
use basket_db::repositories::{CatalogRepo, CategoryRepo};

use crate::audit::{self, ClientInfo};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::state::AppState;

/// GET /api/v1/categories
///
/// Active categories arranged as a tree (roots first, children nested).
pub async fn list_tree(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> AppResult<Json<Vec<CategoryNode>>> {
    let categories = CategoryRepo::list_active(&state.pool).await?;
    Ok(Json(build_tree(categories)))
}

/// GET /api/v1/categories/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<Category>> {
    let category = CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;
    Ok(Json(category))
}

/// POST /api/v1/admin/categories
///
/// Create a category. The depth hint is derived from the parent.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Json(input): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Category name is required".into(),
        )));
    }

    let level = match input.parent_id {
        None => 0,
        Some(parent_id) => {
            let parent = CategoryRepo::find_by_id(&state.pool, parent_id)
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::Validation(format!(
                        "Parent category {parent_id} does not exist"
                    )))
                })?;
            parent.level + 1
        }
    };

    let category = CategoryRepo::create(&state.pool, &input, level).await?;

    audit::record(
        &state.pool,
        Some(admin.user_id),
        "category.create",
        Some("category"),
        Some(category.id),
        None,
        &client,
    )
    .await;

    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/v1/admin/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<Json<Category>> {
    if let Some(parent_id) = input.parent_id {
        if parent_id == id {
            return Err(AppError::Core(CoreError::Validation(
                "A category cannot be its own parent".into(),
            )));
        }
    }

    let category = CategoryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;
    Ok(Json(category))
}

/// DELETE /api/v1/admin/categories/{id}
///
/// Refused while catalog items or child categories still reference it.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    client: ClientInfo,
) -> AppResult<StatusCode> {
    let in_use = CatalogRepo::count_by_category(&state.pool, id).await?;
    if in_use > 0 {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Category is referenced by {in_use} catalog items"
        ))));
    }

    let children = CategoryRepo::count_children(&state.pool, id).await?;
    if children > 0 {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Category has {children} child categories"
        ))));
    }

    let deleted = CategoryRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }));
    }

    audit::record(
        &state.pool,
        Some(admin.user_id),
        "category.delete",
        Some("category"),
        Some(id),
        None,
        &client,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// Arrange a flat category list into a tree. Orphans (inactive or missing
/// parents) surface as roots rather than disappearing.
fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let known: std::collections::HashSet<DbId> = categories.iter().map(|c| c.id).collect();

    let mut children_of: std::collections::HashMap<DbId, Vec<Category>> =
        std::collections::HashMap::new();
    let mut roots: Vec<Category> = Vec::new();

    for category in categories {
        match category.parent_id {
            Some(parent_id) if known.contains(&parent_id) => {
                children_of.entry(parent_id).or_default().push(category);
            }
            _ => roots.push(category),
        }
    }

    fn attach(
        category: Category,
        children_of: &mut std::collections::HashMap<DbId, Vec<Category>>,
    ) -> CategoryNode {
        let children = children_of
            .remove(&category.id)
            .unwrap_or_default()
            .into_iter()
            .map(|child| attach(child, children_of))
            .collect();
        CategoryNode { category, children }
    }

    roots
        .into_iter()
        .map(|root| attach(root, &mut children_of))
        .collect()
}
