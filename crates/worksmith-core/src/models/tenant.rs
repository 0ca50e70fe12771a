//! Tenant domain model.
//!
//! Tenants are isolated customer organizations — the unit of data
//! partitioning. Every tenant-owned entity carries exactly one
//! immutable `tenant_id` assigned at creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a tenant. Tenants are never deleted; `Archived`
/// is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TenantStatus {
    Active,
    Inactive,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    /// Short uppercase identifier (e.g. `ACME`). Globally unique,
    /// immutable once set, never reassigned.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    pub status: TenantStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    /// Normalized to uppercase by the repository before storage.
    pub code: String,
    pub name: String,
}

/// Fields that can be updated on an existing tenant. The `code` is
/// deliberately absent — it is immutable.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTenant {
    pub name: Option<String>,
    pub status: Option<TenantStatus>,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Active => "Active",
            TenantStatus::Inactive => "Inactive",
            TenantStatus::Archived => "Archived",
        }
    }
}
