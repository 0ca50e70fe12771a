//! Integration tests for the User repository using in-memory
//! SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;
use worksmith_core::error::WorksmithError;
use worksmith_core::models::tenant::CreateTenant;
use worksmith_core::models::user::{CreateUser, Role, UpdateUser};
use worksmith_core::repository::{TenantRepository, UserRepository};
use worksmith_db::repository::{SurrealTenantRepository, SurrealUserRepository};

/// Helper: spin up in-memory DB, run migrations, create a tenant.
async fn setup() -> (Surreal<surrealdb::engine::local::Db>, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    worksmith_db::run_migrations(&db).await.unwrap();

    let tenant_repo = SurrealTenantRepository::new(db.clone());
    let tenant = tenant_repo
        .create(CreateTenant {
            code: "ACME".into(),
            name: "Acme Property Services".into(),
        })
        .await
        .unwrap();

    (db, tenant.id)
}

fn alice(tenant_id: Uuid) -> CreateUser {
    CreateUser {
        tenant_id,
        email: "Alice@Example.com".into(),
        full_name: "Alice Archer".into(),
        role: Role::ClientAdmin,
        password: "SuperSecret123!".into(),
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let (db, tenant_id) = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(alice(tenant_id)).await.unwrap();

    assert_eq!(user.tenant_id, tenant_id);
    // Email is stored lowercased.
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.role, Role::ClientAdmin);
    assert!(user.active);

    // Password should be hashed, not stored in plaintext.
    assert_ne!(user.password_hash, "SuperSecret123!");
    assert!(user.password_hash.starts_with("$argon2id$"));

    let fetched = repo.get_by_id(tenant_id, user.id).await.unwrap();
    assert_eq!(fetched.id, user.id);
}

#[tokio::test]
async fn email_lookup_is_case_insensitive() {
    let (db, tenant_id) = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(alice(tenant_id)).await.unwrap();
    let fetched = repo
        .get_by_email(tenant_id, "ALICE@example.COM")
        .await
        .unwrap();
    assert_eq!(fetched.id, user.id);
}

#[tokio::test]
async fn email_unique_within_tenant_only() {
    let (db, tenant_id) = setup().await;
    let tenant_repo = SurrealTenantRepository::new(db.clone());
    let repo = SurrealUserRepository::new(db);

    repo.create(alice(tenant_id)).await.unwrap();

    // Same email in the same tenant: rejected (case-insensitively).
    let err = repo.create(alice(tenant_id)).await.unwrap_err();
    assert!(matches!(err, WorksmithError::AlreadyExists { .. }));

    // Same email under a different tenant: fine.
    let other = tenant_repo
        .create(CreateTenant {
            code: "OTHER".into(),
            name: "Other Co".into(),
        })
        .await
        .unwrap();
    repo.create(alice(other.id)).await.unwrap();
}

#[tokio::test]
async fn users_are_scoped_to_their_tenant() {
    let (db, tenant_id) = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(alice(tenant_id)).await.unwrap();

    // Lookup under a different tenant id must not reveal the user.
    let err = repo
        .get_by_id(Uuid::new_v4(), user.id)
        .await
        .unwrap_err();
    assert!(matches!(err, WorksmithError::NotFound { .. }));
}

#[tokio::test]
async fn deactivation_is_a_soft_update() {
    let (db, tenant_id) = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(alice(tenant_id)).await.unwrap();
    let updated = repo
        .update(
            tenant_id,
            user.id,
            UpdateUser {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!updated.active);

    // Still on record.
    let fetched = repo.get_by_id(tenant_id, user.id).await.unwrap();
    assert!(!fetched.active);
}
