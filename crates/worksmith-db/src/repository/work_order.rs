//! SurrealDB implementation of [`WorkOrderRepository`].
//!
//! Work orders are created only through quote conversion (see the
//! quote repository's transactional `convert`); this repository covers
//! reads.

use serde::Deserialize;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;
use worksmith_core::error::WorksmithResult;
use worksmith_core::models::work_order::WorkOrder;
use worksmith_core::repository::{PaginatedResult, Pagination, WorkOrderRepository};
use worksmith_core::scope::TenantFilter;

use crate::error::DbError;

#[derive(Debug, Deserialize)]
struct WorkOrderRow {
    tenant_id: String,
    job_no: String,
    quote_id: Option<String>,
    authorized_email: String,
    description: String,
    created_at: Datetime,
}

#[derive(Debug, Deserialize)]
struct WorkOrderRowWithId {
    record_id: String,
    tenant_id: String,
    job_no: String,
    quote_id: Option<String>,
    authorized_email: String,
    description: String,
    created_at: Datetime,
}

fn parse_opt_uuid(s: Option<String>) -> Result<Option<Uuid>, DbError> {
    s.map(|v| Uuid::parse_str(&v).map_err(|e| DbError::Corrupt(format!("invalid quote UUID: {e}"))))
        .transpose()
}

impl WorkOrderRow {
    fn into_work_order(self, id: Uuid) -> Result<WorkOrder, DbError> {
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Corrupt(format!("invalid tenant UUID: {e}")))?;
        Ok(WorkOrder {
            id,
            tenant_id,
            job_no: self.job_no,
            quote_id: parse_opt_uuid(self.quote_id)?,
            authorized_email: self.authorized_email,
            description: self.description,
            created_at: self.created_at.0,
        })
    }
}

impl WorkOrderRowWithId {
    fn try_into_work_order(self) -> Result<WorkOrder, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Corrupt(format!("invalid tenant UUID: {e}")))?;
        Ok(WorkOrder {
            id,
            tenant_id,
            job_no: self.job_no,
            quote_id: parse_opt_uuid(self.quote_id)?,
            authorized_email: self.authorized_email,
            description: self.description,
            created_at: self.created_at.0,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

fn filter_clause(filter: &TenantFilter) -> &'static str {
    match filter {
        TenantFilter::Global => "",
        TenantFilter::Tenant(_) => "WHERE tenant_id = $tenant_id",
        TenantFilter::TenantOwner { .. } => {
            "WHERE tenant_id = $tenant_id AND authorized_email = $owner_email"
        }
    }
}

/// SurrealDB implementation of the WorkOrder repository.
#[derive(Clone)]
pub struct SurrealWorkOrderRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealWorkOrderRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> WorkOrderRepository for SurrealWorkOrderRepository<C> {
    async fn get_by_id(&self, id: Uuid) -> WorksmithResult<WorkOrder> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('work_order', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<WorkOrderRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "work_order".into(),
            id: id_str,
        })?;

        row.into_work_order(id).map_err(Into::into)
    }

    async fn list(
        &self,
        filter: &TenantFilter,
        pagination: Pagination,
    ) -> WorksmithResult<PaginatedResult<WorkOrder>> {
        let clause = filter_clause(filter);
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM work_order {clause} \
             ORDER BY created_at DESC LIMIT $limit START $offset"
        );
        let count_query = format!("SELECT count() AS total FROM work_order {clause} GROUP ALL");

        let mut q = self
            .db
            .query(query)
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        let mut cq = self.db.query(count_query);

        match filter {
            TenantFilter::Global => {}
            TenantFilter::Tenant(tenant_id) => {
                q = q.bind(("tenant_id", tenant_id.to_string()));
                cq = cq.bind(("tenant_id", tenant_id.to_string()));
            }
            TenantFilter::TenantOwner { tenant_id, email } => {
                let email = email.trim().to_lowercase();
                q = q
                    .bind(("tenant_id", tenant_id.to_string()))
                    .bind(("owner_email", email.clone()));
                cq = cq
                    .bind(("tenant_id", tenant_id.to_string()))
                    .bind(("owner_email", email));
            }
        }

        let mut result = q.await.map_err(DbError::from)?;
        let rows: Vec<WorkOrderRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(WorkOrderRowWithId::try_into_work_order)
            .collect::<Result<Vec<_>, _>>()?;

        let mut count_result = cq.await.map_err(DbError::from)?;
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
