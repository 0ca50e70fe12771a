//! SurrealDB implementation of [`UserRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters.
//! Salt is randomly generated per hash. Emails are lowercased before
//! storage so that the tenant-scoped uniqueness index is
//! case-insensitive.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher};
use serde::Deserialize;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;
use worksmith_core::error::{WorksmithError, WorksmithResult};
use worksmith_core::models::user::{CreateUser, Role, UpdateUser, User};
use worksmith_core::repository::{PaginatedResult, Pagination, UserRepository};

use crate::error::DbError;

#[derive(Debug, Deserialize)]
struct UserRow {
    tenant_id: String,
    email: String,
    full_name: String,
    role: String,
    password_hash: String,
    active: bool,
    created_at: Datetime,
    updated_at: Datetime,
}

#[derive(Debug, Deserialize)]
struct UserRowWithId {
    record_id: String,
    tenant_id: String,
    email: String,
    full_name: String,
    role: String,
    password_hash: String,
    active: bool,
    created_at: Datetime,
    updated_at: Datetime,
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    match s {
        "PlatformAdmin" => Ok(Role::PlatformAdmin),
        "Staff" => Ok(Role::Staff),
        "ClientAdmin" => Ok(Role::ClientAdmin),
        "Client" => Ok(Role::Client),
        other => Err(DbError::Corrupt(format!("unknown role: {other}"))),
    }
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Corrupt(format!("invalid tenant UUID: {e}")))?;
        Ok(User {
            id,
            tenant_id,
            email: self.email,
            full_name: self.full_name,
            role: parse_role(&self.role)?,
            password_hash: self.password_hash,
            active: self.active,
            created_at: self.created_at.0,
            updated_at: self.updated_at.0,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Corrupt(format!("invalid tenant UUID: {e}")))?;
        Ok(User {
            id,
            tenant_id,
            email: self.email,
            full_name: self.full_name,
            role: parse_role(&self.role)?,
            password_hash: self.password_hash,
            active: self.active,
            created_at: self.created_at.0,
            updated_at: self.updated_at.0,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

/// Hash a password with Argon2id.
fn hash_password(password: &str) -> Result<String, DbError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| DbError::Corrupt(format!("password hashing failed: {e}")))
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> WorksmithResult<User> {
        let email = input.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(WorksmithError::Validation {
                message: "a valid email is required".into(),
            });
        }

        let password_hash = hash_password(&input.password)?;
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::thing('user', $id) SET \
                 tenant_id = $tenant_id, \
                 email = $email, \
                 full_name = $full_name, \
                 role = $role, \
                 password_hash = $password_hash, \
                 active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("email", email))
            .bind(("full_name", input.full_name))
            .bind(("role", input.role.as_str()))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            let msg = e.to_string();
            if msg.contains("idx_user_tenant_email") {
                WorksmithError::AlreadyExists {
                    entity: "user".into(),
                }
            } else {
                WorksmithError::Database(msg)
            }
        })?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        row.into_user(id).map_err(Into::into)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> WorksmithResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::thing('user', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        row.into_user(id).map_err(Into::into)
    }

    async fn get_by_email(&self, tenant_id: Uuid, email: &str) -> WorksmithResult<User> {
        let email_owned = email.trim().to_lowercase();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE tenant_id = $tenant_id AND email = $email",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("email", email_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("email={email_owned}"),
        })?;

        row.try_into_user().map_err(Into::into)
    }

    async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdateUser) -> WorksmithResult<User> {
        let mut sets = vec!["updated_at = time::now()"];
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.full_name.is_some() {
            sets.push("full_name = $full_name");
        }
        if input.role.is_some() {
            sets.push("role = $role");
        }
        if input.active.is_some() {
            sets.push("active = $active");
        }

        let query = format!(
            "UPDATE type::thing('user', $id) SET {} \
             WHERE tenant_id = $tenant_id",
            sets.join(", ")
        );

        let id_str = id.to_string();
        let mut q = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()));
        if let Some(email) = input.email {
            q = q.bind(("email", email.trim().to_lowercase()));
        }
        if let Some(full_name) = input.full_name {
            q = q.bind(("full_name", full_name));
        }
        if let Some(role) = input.role {
            q = q.bind(("role", role.as_str()));
        }
        if let Some(active) = input.active {
            q = q.bind(("active", active));
        }

        let mut result = q.await.map_err(DbError::from)?;
        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        row.into_user(id).map_err(Into::into)
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> WorksmithResult<PaginatedResult<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY email LIMIT $limit START $offset",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(UserRowWithId::try_into_user)
            .collect::<Result<Vec<_>, _>>()?;

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM user \
                 WHERE tenant_id = $tenant_id GROUP ALL",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
