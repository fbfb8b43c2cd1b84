//! Integration tests for the list/share/product repositories against a
//! real database: version compare-and-swap, soft-delete filtering,
//! share uniqueness, and sub-entity addressing.

use assert_matches::assert_matches;
use basket_db::models::list::{CreateList, UpdateList};
use basket_db::models::product::{NewListProduct, UpdateListProduct};
use basket_db::models::user::CreateUser;
use basket_db::repositories::{ListRepo, ProductRepo, ShareRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, username: &str) -> i64 {
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.com"),
        password_hash: "x".to_string(),
        role: "user".to_string(),
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
        .id
}

async fn seed_list(pool: &PgPool, owner_id: i64, title: &str) -> basket_db::models::list::List {
    let input = CreateList {
        title: title.to_string(),
        owner_id,
        priority: 0,
        status: "active".to_string(),
    };
    ListRepo::create(pool, &input)
        .await
        .expect("list creation should succeed")
}

fn new_product(added_by: i64, name: &str) -> NewListProduct {
    NewListProduct {
        catalog_item_id: None,
        name: name.to_string(),
        quantity: 1.0,
        unit: "db".to_string(),
        is_purchased: false,
        added_by,
        notes: String::new(),
    }
}

// ---------------------------------------------------------------------------
// Version guard
// ---------------------------------------------------------------------------

/// The CAS update succeeds exactly once per read version.
#[sqlx::test(migrations = "./migrations")]
async fn test_versioned_update_cas(pool: PgPool) {
    let owner = seed_user(&pool, "owner").await;
    let list = seed_list(&pool, owner, "Guarded").await;
    assert_eq!(list.version, 1);

    let update = UpdateList {
        title: Some("First writer".to_string()),
        ..Default::default()
    };
    let updated = ListRepo::update_versioned(&pool, list.id, 1, &update)
        .await
        .expect("update should succeed");
    assert_matches!(updated, Some(ref l) if l.version == 2 && l.title == "First writer");

    // A second writer holding the stale version loses.
    let update = UpdateList {
        title: Some("Second writer".to_string()),
        ..Default::default()
    };
    let stale = ListRepo::update_versioned(&pool, list.id, 1, &update)
        .await
        .expect("query should succeed");
    assert!(stale.is_none(), "stale version must not match");

    // The row still exists, so the caller can classify this as a conflict.
    assert!(ListRepo::exists(&pool, list.id).await.unwrap());

    let current = ListRepo::find_by_id(&pool, list.id).await.unwrap().unwrap();
    assert_eq!(current.title, "First writer");
    assert_eq!(current.version, 2);
}

/// `touch_version` bumps without changing fields, under the same guard.
#[sqlx::test(migrations = "./migrations")]
async fn test_touch_version(pool: PgPool) {
    let owner = seed_user(&pool, "owner").await;
    let list = seed_list(&pool, owner, "Touched").await;

    let touched = ListRepo::touch_version(&pool, list.id, 1)
        .await
        .expect("touch should succeed");
    assert_matches!(touched, Some(ref l) if l.version == 2 && l.title == "Touched");

    let stale = ListRepo::touch_version(&pool, list.id, 1)
        .await
        .expect("query should succeed");
    assert!(stale.is_none());
}

// ---------------------------------------------------------------------------
// Soft delete
// ---------------------------------------------------------------------------

/// Soft-deleted lists disappear from visible lookups and per-user
/// listings but remain via the unfiltered admin lookup.
#[sqlx::test(migrations = "./migrations")]
async fn test_soft_delete_filtering(pool: PgPool) {
    let owner = seed_user(&pool, "owner").await;
    let list = seed_list(&pool, owner, "Fading").await;

    let update = UpdateList {
        is_deleted: Some(true),
        ..Default::default()
    };
    ListRepo::update_versioned(&pool, list.id, 1, &update)
        .await
        .expect("update should succeed")
        .expect("guard should match");

    assert!(ListRepo::find_visible_by_id(&pool, list.id)
        .await
        .unwrap()
        .is_none());
    assert!(ListRepo::list_for_user(&pool, owner).await.unwrap().is_empty());
    assert!(ListRepo::list_visible(&pool).await.unwrap().is_empty());

    assert!(ListRepo::find_by_id(&pool, list.id).await.unwrap().is_some());
    assert_eq!(ListRepo::list_all(&pool).await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Shares
// ---------------------------------------------------------------------------

/// One grant per (list, user): the unique constraint rejects duplicates
/// with the `uq_` prefix the error classifier keys on.
#[sqlx::test(migrations = "./migrations")]
async fn test_share_unique_constraint(pool: PgPool) {
    let owner = seed_user(&pool, "owner").await;
    let friend = seed_user(&pool, "friend").await;
    let list = seed_list(&pool, owner, "Shared").await;

    ShareRepo::create(&pool, list.id, friend, "view")
        .await
        .expect("first grant should succeed");

    let duplicate = ShareRepo::create(&pool, list.id, friend, "edit").await;
    let err = duplicate.expect_err("duplicate grant must fail");
    assert_matches!(
        err,
        sqlx::Error::Database(ref db)
            if db.constraint() == Some("uq_list_shares_list_user")
    );

    // Idempotent removal.
    assert_eq!(ShareRepo::delete(&pool, list.id, friend).await.unwrap(), 1);
    assert_eq!(ShareRepo::delete(&pool, list.id, friend).await.unwrap(), 0);
}

/// Shared lists appear in the grantee's listing.
#[sqlx::test(migrations = "./migrations")]
async fn test_list_for_user_includes_shared(pool: PgPool) {
    let owner = seed_user(&pool, "owner").await;
    let friend = seed_user(&pool, "friend").await;
    let list = seed_list(&pool, owner, "Ours").await;
    seed_list(&pool, friend, "Theirs").await;

    ShareRepo::create(&pool, list.id, friend, "view")
        .await
        .expect("grant should succeed");

    let lists = ListRepo::list_for_user(&pool, friend).await.unwrap();
    let titles: Vec<&str> = lists.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(lists.len(), 2);
    assert!(titles.contains(&"Ours"));
    assert!(titles.contains(&"Theirs"));

    let owner_lists = ListRepo::list_for_user(&pool, owner).await.unwrap();
    assert_eq!(owner_lists.len(), 1);
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// Sub-ids only address entries within their own list.
#[sqlx::test(migrations = "./migrations")]
async fn test_product_scoped_to_list(pool: PgPool) {
    let owner = seed_user(&pool, "owner").await;
    let list_a = seed_list(&pool, owner, "A").await;
    let list_b = seed_list(&pool, owner, "B").await;

    let product = ProductRepo::insert(&pool, list_a.id, &new_product(owner, "Milk"))
        .await
        .expect("insert should succeed");

    // Addressing through the wrong parent finds nothing.
    assert!(ProductRepo::find(&pool, list_b.id, product.id)
        .await
        .unwrap()
        .is_none());
    assert!(!ProductRepo::delete(&pool, list_b.id, product.id).await.unwrap());

    let update = UpdateListProduct {
        quantity: Some(5.0),
        ..Default::default()
    };
    assert!(ProductRepo::update(&pool, list_b.id, product.id, &update)
        .await
        .unwrap()
        .is_none());

    // The entry is untouched through its real parent.
    let found = ProductRepo::find(&pool, list_a.id, product.id)
        .await
        .unwrap()
        .expect("product should exist");
    assert_eq!(found.quantity, 1.0);
}

/// The sparse update applies only the provided fields.
#[sqlx::test(migrations = "./migrations")]
async fn test_product_sparse_update(pool: PgPool) {
    let owner = seed_user(&pool, "owner").await;
    let list = seed_list(&pool, owner, "Sparse").await;

    let mut product = new_product(owner, "Rice");
    product.notes = "brown".to_string();
    let inserted = ProductRepo::insert(&pool, list.id, &product)
        .await
        .expect("insert should succeed");

    let update = UpdateListProduct {
        is_purchased: Some(true),
        ..Default::default()
    };
    let updated = ProductRepo::update(&pool, list.id, inserted.id, &update)
        .await
        .unwrap()
        .expect("entry should exist");

    assert!(updated.is_purchased);
    assert_eq!(updated.quantity, 1.0);
    assert_eq!(updated.notes, "brown");
}
