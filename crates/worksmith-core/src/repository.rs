//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. `NotFound` is a normal,
//! expected result for lookups — several callers probe for existence
//! (tenant directory checks during context switching in particular)
//! and must be able to branch on it without unwinding.
//!
//! Status-changing quote operations are conditional writes: the
//! implementation must re-check the expected status inside the same
//! transaction that performs the mutation, and report
//! [`WorksmithError::Conflict`](crate::error::WorksmithError::Conflict)
//! when the condition no longer holds. No in-process locking is
//! assumed anywhere (multi-process deployment).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::WorksmithResult;
use crate::lifecycle::QuoteStatus;
use crate::models::{
    quote::{CreateQuote, Quote, UpdateQuote},
    session::{CreateSession, Session},
    tenant::{CreateTenant, Tenant, UpdateTenant},
    user::{CreateUser, UpdateUser, User},
    work_order::WorkOrder,
};
use crate::scope::TenantFilter;

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Tenant directory (global scope)
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = WorksmithResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WorksmithResult<Tenant>> + Send;
    fn get_by_code(&self, code: &str) -> impl Future<Output = WorksmithResult<Tenant>> + Send;
    /// `code` is immutable and absent from [`UpdateTenant`]; status and
    /// name changes only. Tenants are never deleted.
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> impl Future<Output = WorksmithResult<Tenant>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = WorksmithResult<PaginatedResult<Tenant>>> + Send;
}

// ---------------------------------------------------------------------------
// Users (tenant-scoped)
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = WorksmithResult<User>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = WorksmithResult<User>> + Send;
    /// Email lookup is case-insensitive (emails are stored lowercased).
    fn get_by_email(
        &self,
        tenant_id: Uuid,
        email: &str,
    ) -> impl Future<Output = WorksmithResult<User>> + Send;
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = WorksmithResult<User>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = WorksmithResult<PaginatedResult<User>>> + Send;
}

// ---------------------------------------------------------------------------
// Sessions (refresh tokens, tenant-scoped)
// ---------------------------------------------------------------------------

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession)
    -> impl Future<Output = WorksmithResult<Session>> + Send;
    fn get_by_token_hash(
        &self,
        tenant_id: Uuid,
        token_hash: &str,
    ) -> impl Future<Output = WorksmithResult<Session>> + Send;
    fn invalidate(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = WorksmithResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

/// Everything needed to convert a quote. The work order inherits the
/// quote's tenant; the implementation allocates the job number.
#[derive(Debug, Clone)]
pub struct ConversionInput {
    pub quote_id: Uuid,
    pub authorized_email: String,
    pub description: String,
}

pub trait QuoteRepository: Send + Sync {
    /// Create a quote owned by `tenant_id` (always the effective
    /// tenant, never payload-supplied). The implementation allocates
    /// the `QTE-<year>-<seq>` number and sets status to `Draft`.
    fn create(
        &self,
        tenant_id: Uuid,
        input: CreateQuote,
    ) -> impl Future<Output = WorksmithResult<Quote>> + Send;

    /// Unscoped lookup. Callers are responsible for a scope check on
    /// the returned quote's `tenant_id` before revealing it.
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WorksmithResult<Quote>> + Send;

    fn list(
        &self,
        filter: &TenantFilter,
        pagination: Pagination,
    ) -> impl Future<Output = WorksmithResult<PaginatedResult<Quote>>> + Send;

    /// Update descriptive fields only; never status.
    fn update(
        &self,
        id: Uuid,
        input: UpdateQuote,
    ) -> impl Future<Output = WorksmithResult<Quote>> + Send;

    /// Compare-and-set status change: succeeds only if the stored
    /// status still equals `expected` at write time; a zero-row match
    /// is `Conflict`.
    fn update_status_if(
        &self,
        id: Uuid,
        expected: QuoteStatus,
        next: QuoteStatus,
    ) -> impl Future<Output = WorksmithResult<Quote>> + Send;

    /// Atomic conversion: flip status `Approved -> Converted`, set
    /// `converted_to_work_order_id`, and create the work order with
    /// the quote's tenant id — all in one transaction. If any step
    /// fails, none is observable. A lost race is `Conflict`.
    fn convert(
        &self,
        input: ConversionInput,
    ) -> impl Future<Output = WorksmithResult<(Quote, WorkOrder)>> + Send;
}

// ---------------------------------------------------------------------------
// Work orders
// ---------------------------------------------------------------------------

pub trait WorkOrderRepository: Send + Sync {
    /// Unscoped lookup; callers apply the scope check.
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WorksmithResult<WorkOrder>> + Send;
    fn list(
        &self,
        filter: &TenantFilter,
        pagination: Pagination,
    ) -> impl Future<Output = WorksmithResult<PaginatedResult<WorkOrder>>> + Send;
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Time source, injectable so that expiry gating is testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
