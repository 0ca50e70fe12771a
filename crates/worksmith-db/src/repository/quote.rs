//! SurrealDB implementation of [`QuoteRepository`].
//!
//! Status changes are conditional writes: the `UPDATE` carries a
//! `WHERE status = $expected` clause, so the precondition is
//! re-validated inside the same statement that performs the mutation.
//! A zero-row match means a concurrent writer got there first.
//! Conversion runs as a multi-statement transaction that either flips
//! the quote and creates the work order, or does neither.

use chrono::{Datelike, Utc};
use serde::Deserialize;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;
use worksmith_core::error::{WorksmithError, WorksmithResult};
use worksmith_core::lifecycle::QuoteStatus;
use worksmith_core::models::quote::{CreateQuote, Quote, UpdateQuote};
use worksmith_core::models::work_order::WorkOrder;
use worksmith_core::repository::{ConversionInput, PaginatedResult, Pagination, QuoteRepository};
use worksmith_core::scope::TenantFilter;

use crate::error::DbError;
use crate::sequence;

#[derive(Debug, Deserialize)]
struct QuoteRow {
    quote_number: String,
    tenant_id: String,
    status: String,
    contact_email: String,
    contact_name: String,
    property_address: String,
    description: String,
    estimated_cost: Option<f64>,
    quote_valid_until: Option<Datetime>,
    converted_to_work_order_id: Option<String>,
    created_at: Datetime,
    updated_at: Datetime,
}

#[derive(Debug, Deserialize)]
struct QuoteRowWithId {
    record_id: String,
    quote_number: String,
    tenant_id: String,
    status: String,
    contact_email: String,
    contact_name: String,
    property_address: String,
    description: String,
    estimated_cost: Option<f64>,
    quote_valid_until: Option<Datetime>,
    converted_to_work_order_id: Option<String>,
    created_at: Datetime,
    updated_at: Datetime,
}

#[derive(Debug, Deserialize)]
struct WorkOrderRow {
    tenant_id: String,
    job_no: String,
    quote_id: Option<String>,
    authorized_email: String,
    description: String,
    created_at: Datetime,
}

fn parse_status(s: &str) -> Result<QuoteStatus, DbError> {
    match s {
        "Draft" => Ok(QuoteStatus::Draft),
        "Submitted" => Ok(QuoteStatus::Submitted),
        "InformationRequested" => Ok(QuoteStatus::InformationRequested),
        "Quoted" => Ok(QuoteStatus::Quoted),
        "UnderDiscussion" => Ok(QuoteStatus::UnderDiscussion),
        "Approved" => Ok(QuoteStatus::Approved),
        "Declined" => Ok(QuoteStatus::Declined),
        "Expired" => Ok(QuoteStatus::Expired),
        "Converted" => Ok(QuoteStatus::Converted),
        other => Err(DbError::Corrupt(format!("unknown quote status: {other}"))),
    }
}

fn parse_opt_uuid(s: Option<String>, what: &str) -> Result<Option<Uuid>, DbError> {
    s.map(|v| {
        Uuid::parse_str(&v).map_err(|e| DbError::Corrupt(format!("invalid {what} UUID: {e}")))
    })
    .transpose()
}

impl QuoteRow {
    fn into_quote(self, id: Uuid) -> Result<Quote, DbError> {
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Corrupt(format!("invalid tenant UUID: {e}")))?;
        Ok(Quote {
            id,
            quote_number: self.quote_number,
            tenant_id,
            status: parse_status(&self.status)?,
            contact_email: self.contact_email,
            contact_name: self.contact_name,
            property_address: self.property_address,
            description: self.description,
            estimated_cost: self.estimated_cost,
            quote_valid_until: self.quote_valid_until.map(|d| d.0),
            converted_to_work_order_id: parse_opt_uuid(
                self.converted_to_work_order_id,
                "work order",
            )?,
            created_at: self.created_at.0,
            updated_at: self.updated_at.0,
        })
    }
}

impl QuoteRowWithId {
    fn try_into_quote(self) -> Result<Quote, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Corrupt(format!("invalid tenant UUID: {e}")))?;
        Ok(Quote {
            id,
            quote_number: self.quote_number,
            tenant_id,
            status: parse_status(&self.status)?,
            contact_email: self.contact_email,
            contact_name: self.contact_name,
            property_address: self.property_address,
            description: self.description,
            estimated_cost: self.estimated_cost,
            quote_valid_until: self.quote_valid_until.map(|d| d.0),
            converted_to_work_order_id: parse_opt_uuid(
                self.converted_to_work_order_id,
                "work order",
            )?,
            created_at: self.created_at.0,
            updated_at: self.updated_at.0,
        })
    }
}

impl WorkOrderRow {
    fn into_work_order(self, id: Uuid) -> Result<WorkOrder, DbError> {
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Corrupt(format!("invalid tenant UUID: {e}")))?;
        Ok(WorkOrder {
            id,
            tenant_id,
            job_no: self.job_no,
            quote_id: parse_opt_uuid(self.quote_id, "quote")?,
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

/// The tenant predicate of a list query, as a WHERE fragment.
fn filter_clause(filter: &TenantFilter) -> &'static str {
    match filter {
        TenantFilter::Global => "",
        TenantFilter::Tenant(_) => "WHERE tenant_id = $tenant_id",
        TenantFilter::TenantOwner { .. } => {
            "WHERE tenant_id = $tenant_id AND contact_email = $owner_email"
        }
    }
}

/// SurrealDB implementation of the Quote repository.
#[derive(Clone)]
pub struct SurrealQuoteRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealQuoteRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn fetch(&self, id: Uuid) -> WorksmithResult<Quote> {
        let id_str = id.to_string();
        let mut result = self
            .db
            .query("SELECT * FROM type::thing('quote', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<QuoteRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "quote".into(),
            id: id_str,
        })?;
        row.into_quote(id).map_err(Into::into)
    }

    async fn fetch_work_order(&self, id: Uuid) -> WorksmithResult<WorkOrder> {
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
}

impl<C: Connection> QuoteRepository for SurrealQuoteRepository<C> {
    async fn create(&self, tenant_id: Uuid, input: CreateQuote) -> WorksmithResult<Quote> {
        let contact_email = input.contact_email.trim().to_lowercase();
        if contact_email.is_empty() || !contact_email.contains('@') {
            return Err(WorksmithError::Validation {
                message: "a valid contact email is required".into(),
            });
        }

        // Number allocation happens before the insert; if the insert
        // fails the number is skipped, never reused.
        let year = Utc::now().year();
        let quote_number = sequence::next_quote_number(&self.db, year).await?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let mut query = self
            .db
            .query(
                "CREATE type::thing('quote', $id) SET \
                 quote_number = $quote_number, \
                 tenant_id = $tenant_id, \
                 status = 'Draft', \
                 contact_email = $contact_email, \
                 contact_name = $contact_name, \
                 property_address = $property_address, \
                 description = $description, \
                 estimated_cost = $estimated_cost, \
                 quote_valid_until = $quote_valid_until",
            )
            .bind(("id", id_str.clone()))
            .bind(("quote_number", quote_number))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("contact_email", contact_email))
            .bind(("contact_name", input.contact_name))
            .bind(("property_address", input.property_address))
            .bind(("description", input.description))
            .bind(("estimated_cost", input.estimated_cost));
        query = query.bind((
            "quote_valid_until",
            input.quote_valid_until.map(Datetime::from),
        ));

        let result = query.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| WorksmithError::Database(e.to_string()))?;

        let rows: Vec<QuoteRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "quote".into(),
            id: id_str,
        })?;

        row.into_quote(id).map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> WorksmithResult<Quote> {
        self.fetch(id).await
    }

    async fn list(
        &self,
        filter: &TenantFilter,
        pagination: Pagination,
    ) -> WorksmithResult<PaginatedResult<Quote>> {
        let clause = filter_clause(filter);
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM quote {clause} \
             ORDER BY created_at DESC LIMIT $limit START $offset"
        );
        let count_query = format!("SELECT count() AS total FROM quote {clause} GROUP ALL");

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
        let rows: Vec<QuoteRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(QuoteRowWithId::try_into_quote)
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

    async fn update(&self, id: Uuid, input: UpdateQuote) -> WorksmithResult<Quote> {
        let mut sets = vec!["updated_at = time::now()"];
        if input.contact_name.is_some() {
            sets.push("contact_name = $contact_name");
        }
        if input.property_address.is_some() {
            sets.push("property_address = $property_address");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.estimated_cost.is_some() {
            sets.push("estimated_cost = $estimated_cost");
        }
        match &input.quote_valid_until {
            Some(Some(_)) => sets.push("quote_valid_until = $quote_valid_until"),
            Some(None) => sets.push("quote_valid_until = NONE"),
            None => {}
        }

        let query = format!("UPDATE type::thing('quote', $id) SET {}", sets.join(", "));

        let id_str = id.to_string();
        let mut q = self.db.query(query).bind(("id", id_str.clone()));
        if let Some(contact_name) = input.contact_name {
            q = q.bind(("contact_name", contact_name));
        }
        if let Some(property_address) = input.property_address {
            q = q.bind(("property_address", property_address));
        }
        if let Some(description) = input.description {
            q = q.bind(("description", description));
        }
        if let Some(estimated_cost) = input.estimated_cost {
            q = q.bind(("estimated_cost", estimated_cost));
        }
        if let Some(Some(valid_until)) = input.quote_valid_until {
            q = q.bind(("quote_valid_until", Datetime::from(valid_until)));
        }

        let mut result = q.await.map_err(DbError::from)?;
        let rows: Vec<QuoteRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "quote".into(),
            id: id_str,
        })?;

        row.into_quote(id).map_err(Into::into)
    }

    async fn update_status_if(
        &self,
        id: Uuid,
        expected: QuoteStatus,
        next: QuoteStatus,
    ) -> WorksmithResult<Quote> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::thing('quote', $id) SET \
                 status = $next, updated_at = time::now() \
                 WHERE status = $expected",
            )
            .bind(("id", id_str.clone()))
            .bind(("next", next.as_str()))
            .bind(("expected", expected.as_str()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<QuoteRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => row.into_quote(id).map_err(Into::into),
            None => {
                // Zero rows: either the quote is gone or the status
                // moved underneath us. Distinguish for the caller.
                self.fetch(id).await?;
                Err(WorksmithError::Conflict)
            }
        }
    }

    async fn convert(&self, input: ConversionInput) -> WorksmithResult<(Quote, WorkOrder)> {
        let quote = self.fetch(input.quote_id).await?;

        // Job number allocated outside the transaction; a failed
        // conversion skips it (gap-tolerant, same as quote numbers).
        let job_no = sequence::next_job_number(&self.db, quote.tenant_id).await?;
        let work_order_id = Uuid::new_v4();

        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 LET $updated = (UPDATE type::thing('quote', $quote_id) SET \
                     status = 'Converted', \
                     converted_to_work_order_id = $work_order_id, \
                     updated_at = time::now() \
                     WHERE status = 'Approved' \
                     AND converted_to_work_order_id = NONE); \
                 IF array::len($updated) == 0 { \
                     THROW 'conversion precondition failed' \
                 }; \
                 CREATE type::thing('work_order', $work_order_id) SET \
                     tenant_id = $tenant_id, \
                     job_no = $job_no, \
                     quote_id = $quote_id, \
                     authorized_email = $authorized_email, \
                     description = $description; \
                 COMMIT TRANSACTION;",
            )
            .bind(("quote_id", input.quote_id.to_string()))
            .bind(("work_order_id", work_order_id.to_string()))
            .bind(("tenant_id", quote.tenant_id.to_string()))
            .bind(("job_no", job_no))
            .bind(("authorized_email", input.authorized_email.to_lowercase()))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        if let Err(e) = result.check() {
            // A failed transaction surfaces a generic "query was not
            // executed" error, not the THROW text, so the outcome is
            // classified from a re-read of the quote instead.
            let current = self.fetch(input.quote_id).await?;
            if current.converted_to_work_order_id.is_some() {
                return Err(WorksmithError::AlreadyConverted);
            }
            if current.status != QuoteStatus::Approved {
                return Err(WorksmithError::Conflict);
            }
            return Err(WorksmithError::Database(e.to_string()));
        }

        let quote = self.fetch(input.quote_id).await?;
        let work_order = self.fetch_work_order(work_order_id).await?;
        Ok((quote, work_order))
    }
}
