//! PostgreSQL user store tests
//!
//! These tests need a reachable PostgreSQL instance (`DATABASE_URL`) and are
//! ignored by default. Run them with `cargo test -- --ignored`.

use api::{
    models::NewUser,
    password::verify_password,
    repositories::{UserRepository, UserStore},
};
use common::{
    database::{DatabaseConfig, init_pool, run_migrations},
    error::StoreError,
};
use uuid::Uuid;

async fn repository() -> UserRepository {
    let config = DatabaseConfig::from_env().unwrap();
    let pool = init_pool(&config).await.unwrap();
    run_migrations(&pool).await.unwrap();

    UserRepository::new(pool)
}

#[tokio::test]
#[ignore]
async fn duplicate_username_is_rejected_without_a_partial_write() {
    let repo = repository().await;
    let username = format!("user_{}", &Uuid::new_v4().simple().to_string()[..12]);
    let new_user = NewUser {
        username: username.clone(),
        password: "hunter22".to_string(),
    };

    let created = repo.create(&new_user).await.unwrap();
    assert!(created.is_active);
    let count = repo.count().await.unwrap();

    let err = repo
        .create(&NewUser {
            username: username.clone(),
            password: "different".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateUsername(ref name) if name == &username));
    assert_eq!(repo.count().await.unwrap(), count);

    let stored = repo.find_by_username(&username).await.unwrap().unwrap();
    assert_eq!(stored.id, created.id);
    assert_ne!(stored.password_hash, "hunter22");
    assert!(verify_password("hunter22", &stored.password_hash));
    assert!(!verify_password("different", &stored.password_hash));
}

#[tokio::test]
#[ignore]
async fn find_by_id_and_list_see_created_users() {
    let repo = repository().await;
    let username = format!("user_{}", &Uuid::new_v4().simple().to_string()[..12]);

    let created = repo
        .create(&NewUser {
            username: username.clone(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap();

    let found = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(found.username, username);
    assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());

    let total = repo.count().await.unwrap();
    let all = repo.list(0, total.max(1)).await.unwrap();
    assert_eq!(all.len() as i64, total);
    assert!(all.iter().any(|u| u.id == created.id));
}
