//! Integration tests for the statistics singleton repository.

use basket_core::stats::{aggregate, SeriesPoint, TimeBounds};
use basket_db::models::list::CreateList;
use basket_db::models::product::NewListProduct;
use basket_db::models::user::CreateUser;
use basket_db::repositories::{ListRepo, ProductRepo, StatisticsRepo, UserRepo};
use chrono::Utc;
use sqlx::PgPool;

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

/// The lazily-created singleton starts zeroed at version 1 and is
/// returned unchanged on repeated reads.
#[sqlx::test(migrations = "./migrations")]
async fn test_find_or_create_singleton(pool: PgPool) {
    assert!(StatisticsRepo::find(&pool).await.unwrap().is_none());

    let created = StatisticsRepo::find_or_create(&pool).await.unwrap();
    assert_eq!(created.id, 1);
    assert_eq!(created.snapshot_version, 1);
    assert_eq!(created.total_users, 0);

    let again = StatisticsRepo::find_or_create(&pool).await.unwrap();
    assert_eq!(again.snapshot_version, 1);
}

/// Upserting writes every field and bumps the version on conflict.
#[sqlx::test(migrations = "./migrations")]
async fn test_upsert_replaces_and_versions(pool: PgPool) {
    let user = seed_user(&pool, "stats").await;
    let list = ListRepo::create(
        &pool,
        &CreateList {
            title: "Counted".to_string(),
            owner_id: user,
            priority: 0,
            status: "completed".to_string(),
        },
    )
    .await
    .unwrap();
    ProductRepo::insert(
        &pool,
        list.id,
        &NewListProduct {
            catalog_item_id: None,
            name: "Milk".to_string(),
            quantity: 1.0,
            unit: "db".to_string(),
            is_purchased: true,
            added_by: user,
            notes: String::new(),
        },
    )
    .await
    .unwrap();

    let users = StatisticsRepo::collect_user_facts(&pool).await.unwrap();
    let lists = StatisticsRepo::collect_list_facts(&pool).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].products.len(), 1);

    let bounds = TimeBounds::compute(Utc::now());
    let rollup = aggregate(&users, &lists, &bounds);

    let daily = vec![SeriesPoint {
        key: bounds.daily_key(),
        count: rollup.daily_active_users,
    }];

    let first = StatisticsRepo::upsert(&pool, &rollup, &daily, &[], &[])
        .await
        .unwrap();
    assert_eq!(first.total_users, 1);
    assert_eq!(first.completed_lists, 1);
    assert_eq!(first.total_products, 1);
    assert_eq!(first.top_purchased_products[0]["name"], "Milk");
    assert_eq!(first.daily_active_users.as_array().unwrap().len(), 1);

    let second = StatisticsRepo::upsert(&pool, &rollup, &daily, &[], &[])
        .await
        .unwrap();
    assert_eq!(second.snapshot_version, first.snapshot_version + 1);
    assert_eq!(second.total_users, first.total_users);
}

/// The list scan excludes soft-deleted rows.
#[sqlx::test(migrations = "./migrations")]
async fn test_collect_skips_soft_deleted(pool: PgPool) {
    let user = seed_user(&pool, "softy").await;
    let list = ListRepo::create(
        &pool,
        &CreateList {
            title: "Hidden".to_string(),
            owner_id: user,
            priority: 0,
            status: "active".to_string(),
        },
    )
    .await
    .unwrap();

    sqlx::query("UPDATE lists SET is_deleted = true WHERE id = $1")
        .bind(list.id)
        .execute(&pool)
        .await
        .unwrap();

    let lists = StatisticsRepo::collect_list_facts(&pool).await.unwrap();
    assert!(lists.is_empty());
}
