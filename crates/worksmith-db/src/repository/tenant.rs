//! SurrealDB implementation of [`TenantRepository`].

use serde::Deserialize;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;
use worksmith_core::error::{WorksmithError, WorksmithResult};
use worksmith_core::models::tenant::{CreateTenant, Tenant, TenantStatus, UpdateTenant};
use worksmith_core::repository::{PaginatedResult, Pagination, TenantRepository};

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, Deserialize)]
struct TenantRow {
    code: String,
    name: String,
    status: String,
    created_at: Datetime,
    updated_at: Datetime,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct TenantRowWithId {
    record_id: String,
    code: String,
    name: String,
    status: String,
    created_at: Datetime,
    updated_at: Datetime,
}

fn parse_status(s: &str) -> Result<TenantStatus, DbError> {
    match s {
        "Active" => Ok(TenantStatus::Active),
        "Inactive" => Ok(TenantStatus::Inactive),
        "Archived" => Ok(TenantStatus::Archived),
        other => Err(DbError::Corrupt(format!("unknown tenant status: {other}"))),
    }
}

impl TenantRow {
    fn into_tenant(self, id: Uuid) -> Result<Tenant, DbError> {
        Ok(Tenant {
            id,
            code: self.code,
            name: self.name,
            status: parse_status(&self.status)?,
            created_at: self.created_at.0,
            updated_at: self.updated_at.0,
        })
    }
}

impl TenantRowWithId {
    fn try_into_tenant(self) -> Result<Tenant, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        Ok(Tenant {
            id,
            code: self.code,
            name: self.name,
            status: parse_status(&self.status)?,
            created_at: self.created_at.0,
            updated_at: self.updated_at.0,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenant) -> WorksmithResult<Tenant> {
        let code = input.code.trim().to_uppercase();
        if code.is_empty() || input.name.trim().is_empty() {
            return Err(WorksmithError::Validation {
                message: "tenant code and name must be non-empty".into(),
            });
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::thing('tenant', $id) SET \
                 code = $code, \
                 name = $name, \
                 status = 'Active'",
            )
            .bind(("id", id_str.clone()))
            .bind(("code", code))
            .bind(("name", input.name))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            let msg = e.to_string();
            if msg.contains("idx_tenant_code") {
                WorksmithError::AlreadyExists {
                    entity: "tenant".into(),
                }
            } else {
                WorksmithError::Database(msg)
            }
        })?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        row.into_tenant(id).map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> WorksmithResult<Tenant> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('tenant', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        row.into_tenant(id).map_err(Into::into)
    }

    async fn get_by_code(&self, code: &str) -> WorksmithResult<Tenant> {
        let code_owned = code.trim().to_uppercase();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant \
                 WHERE code = $code",
            )
            .bind(("code", code_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: format!("code={code_owned}"),
        })?;

        row.try_into_tenant().map_err(Into::into)
    }

    async fn update(&self, id: Uuid, input: UpdateTenant) -> WorksmithResult<Tenant> {
        let current = self.get_by_id(id).await?;

        // Archived is terminal: no status leaves it.
        if current.status == TenantStatus::Archived
            && input.status.is_some_and(|s| s != TenantStatus::Archived)
        {
            return Err(WorksmithError::Validation {
                message: "archived tenants cannot change status".into(),
            });
        }

        let mut sets = vec!["updated_at = time::now()"];
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }

        let query = format!(
            "UPDATE type::thing('tenant', $id) SET {}",
            sets.join(", ")
        );

        let id_str = id.to_string();
        let mut q = self.db.query(query).bind(("id", id_str.clone()));
        if let Some(name) = input.name {
            q = q.bind(("name", name));
        }
        if let Some(status) = input.status {
            q = q.bind(("status", status.as_str()));
        }

        let mut result = q.await.map_err(DbError::from)?;
        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        row.into_tenant(id).map_err(Into::into)
    }

    async fn list(&self, pagination: Pagination) -> WorksmithResult<PaginatedResult<Tenant>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant \
                 ORDER BY code LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(TenantRowWithId::try_into_tenant)
            .collect::<Result<Vec<_>, _>>()?;

        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM tenant GROUP ALL")
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
