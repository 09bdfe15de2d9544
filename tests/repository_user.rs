mod common;

use lab_platform::domain::entities::{NewUser, Role, UserPatch};
use lab_platform::domain::repositories::UserRepository;
use lab_platform::error::AppError;
use lab_platform::infrastructure::persistence::PgUserRepository;
use sqlx::PgPool;
use std::sync::Arc;

fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        display_name: "Test User".to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        role: Role::Member,
    }
}

#[sqlx::test]
async fn test_create_and_find_user(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));

    let created = repo.create(new_user("alice")).await.unwrap();
    assert_eq!(created.username, "alice");
    assert_eq!(created.role, Role::Member);
    assert!(created.is_active);

    let by_id = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(by_id.username, "alice");

    let by_name = repo.find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(by_name.id, created.id);

    assert!(repo.find_by_username("bob").await.unwrap().is_none());
}

#[sqlx::test]
async fn test_duplicate_username_is_conflict(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));

    repo.create(new_user("alice")).await.unwrap();
    let result = repo.create(new_user("alice")).await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
async fn test_list_and_count(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));

    for name in ["alice", "bob", "carol"] {
        repo.create(new_user(name)).await.unwrap();
    }

    let page = repo.list(1, 1).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(repo.count().await.unwrap(), 3);
}

#[sqlx::test]
async fn test_update_only_given_fields(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));
    let user = repo.create(new_user("alice")).await.unwrap();

    let updated = repo
        .update(
            user.id,
            UserPatch {
                role: Some(Role::Admin),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.role, Role::Admin);
    assert_eq!(updated.display_name, "Test User");
    assert!(updated.is_active);
}

#[sqlx::test]
async fn test_update_missing_user(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));

    let result = repo
        .update(
            9999,
            UserPatch {
                is_active: Some(false),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();

    assert!(result.is_none());
}
