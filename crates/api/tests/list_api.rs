//! HTTP-level integration tests for list CRUD, the version guard, and
//! soft-delete visibility.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_list, delete_auth, get_auth, login_token, post_json_auth, put_json_auth,
};
use sqlx::PgPool;

/// Creating a list returns the populated response with the caller as
/// owner, version 1, and default status.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_list(pool: PgPool) {
    let user = common::create_test_user(&pool, "maker", "user").await;
    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "maker").await;

    let body = serde_json::json!({
        "title": "Groceries",
        "priority": 2,
        "products": [
            { "name": "Milk", "quantity": 2.0 },
            { "name": "Bread" },
        ],
    });
    let response = post_json_auth(app, "/api/v1/lists", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["title"], "Groceries");
    assert_eq!(json["owner"]["id"], user.id);
    assert_eq!(json["owner"]["username"], "maker");
    assert_eq!(json["status"], "active");
    assert_eq!(json["version"], 1);
    assert_eq!(json["priority"], 2);

    let products = json["products"].as_array().unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0]["name"], "Milk");
    assert_eq!(products[0]["quantity"], 2.0);
    assert_eq!(products[0]["unit"], "db");
    assert_eq!(products[0]["is_purchased"], false);
    assert_eq!(products[0]["added_by"], user.id);
    assert_eq!(products[1]["quantity"], 1.0);
}

/// A product entry may name its adder by username; unknown names fall
/// back to the owner.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_list_added_by_resolution(pool: PgPool) {
    let owner = common::create_test_user(&pool, "owner", "user").await;
    let helper = common::create_test_user(&pool, "helper", "user").await;
    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "owner").await;

    let body = serde_json::json!({
        "title": "Shared effort",
        "products": [
            { "name": "Apples", "added_by": "helper" },
            { "name": "Pears", "added_by": "nobody-by-this-name" },
            { "name": "Plums", "added_by": helper.id },
        ],
    });
    let response = post_json_auth(app, "/api/v1/lists", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let products = json["products"].as_array().unwrap();
    assert_eq!(products[0]["added_by"], helper.id);
    assert_eq!(products[0]["added_by_username"], "helper");
    assert_eq!(products[1]["added_by"], owner.id);
    assert_eq!(products[2]["added_by"], helper.id);
}

/// GET /lists returns owned lists; a stranger sees nothing.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_visibility(pool: PgPool) {
    common::create_test_user(&pool, "owner", "user").await;
    common::create_test_user(&pool, "stranger", "user").await;
    let app = common::build_test_app(pool);
    let owner_token = login_token(app.clone(), "owner").await;
    let stranger_token = login_token(app.clone(), "stranger").await;

    create_list(app.clone(), &owner_token, "Mine").await;

    let response = get_auth(app.clone(), "/api/v1/lists", &owner_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    let response = get_auth(app, "/api/v1/lists", &stranger_token).await;
    let json = body_json(response).await;
    assert!(json.as_array().unwrap().is_empty());
}

/// Updating with the current version succeeds and bumps it; re-using the
/// stale version then fails with 409.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_version_guard(pool: PgPool) {
    common::create_test_user(&pool, "editor", "user").await;
    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "editor").await;
    let list_id = create_list(app.clone(), &token, "Versioned").await;

    let body = serde_json::json!({ "title": "Renamed", "version": 1 });
    let response = put_json_auth(app.clone(), &format!("/api/v1/lists/{list_id}"), body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["title"], "Renamed");
    assert_eq!(json["version"], 2);

    // Same version again: someone else already won this round.
    let body = serde_json::json!({ "title": "Too late", "version": 1 });
    let response = put_json_auth(app, &format!("/api/v1/lists/{list_id}"), body, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Status is a plain data field: any enum value can be set directly, and
/// unknown values are rejected.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_status(pool: PgPool) {
    common::create_test_user(&pool, "mover", "user").await;
    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "mover").await;
    let list_id = create_list(app.clone(), &token, "Statusful").await;

    let body = serde_json::json!({ "status": "archived" });
    let response = put_json_auth(app.clone(), &format!("/api/v1/lists/{list_id}"), body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "archived");

    let body = serde_json::json!({ "status": "done" });
    let response = put_json_auth(app, &format!("/api/v1/lists/{list_id}"), body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// A full update with `products` replaces the embedded set wholesale.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_replaces_products(pool: PgPool) {
    common::create_test_user(&pool, "replacer", "user").await;
    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "replacer").await;

    let body = serde_json::json!({
        "title": "Replace me",
        "products": [{ "name": "Old entry" }],
    });
    let response = post_json_auth(app.clone(), "/api/v1/lists", body, &token).await;
    let list_id = body_json(response).await["id"].as_i64().unwrap();

    let body = serde_json::json!({
        "products": [{ "name": "New one" }, { "name": "New two" }],
    });
    let response = put_json_auth(app, &format!("/api/v1/lists/{list_id}"), body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let names: Vec<&str> = json["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["New one", "New two"]);
}

/// Soft-deleted lists vanish from every standard read path but stay
/// visible to admins.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_soft_delete_hides_list(pool: PgPool) {
    common::create_test_user(&pool, "softie", "user").await;
    common::create_test_user(&pool, "boss", "admin").await;
    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "softie").await;
    let admin_token = login_token(app.clone(), "boss").await;
    let list_id = create_list(app.clone(), &token, "Fading").await;

    let body = serde_json::json!({ "is_deleted": true });
    let response = put_json_auth(app.clone(), &format!("/api/v1/lists/{list_id}"), body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Gone from the listing and direct fetch, even for the owner.
    let response = get_auth(app.clone(), "/api/v1/lists", &token).await;
    let json = body_json(response).await;
    assert!(json.as_array().unwrap().is_empty());

    let response = get_auth(app.clone(), &format!("/api/v1/lists/{list_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Admin still sees it.
    let response = get_auth(app, "/api/v1/admin/lists", &admin_token).await;
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["is_deleted"], true);
}

/// Deleting a list removes it and its products for good.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_hard_delete(pool: PgPool) {
    common::create_test_user(&pool, "deleter", "user").await;
    let app = common::build_test_app(pool.clone());
    let token = login_token(app.clone(), "deleter").await;

    let body = serde_json::json!({
        "title": "Doomed",
        "products": [{ "name": "Orphan" }],
    });
    let response = post_json_auth(app.clone(), "/api/v1/lists", body, &token).await;
    let list_id = body_json(response).await["id"].as_i64().unwrap();

    let response = delete_auth(app.clone(), &format!("/api/v1/lists/{list_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, &format!("/api/v1/lists/{list_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM list_products")
        .fetch_one(&pool)
        .await
        .expect("count should succeed");
    assert_eq!(remaining, 0, "products must cascade with the list");
}
