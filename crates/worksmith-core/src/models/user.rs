//! User (principal) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a principal. `Staff` and `PlatformAdmin` are cross-tenant
/// roles: they may context-switch into any tenant, and with no switch
/// requested they see resources across all tenants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    PlatformAdmin,
    Staff,
    ClientAdmin,
    Client,
}

impl Role {
    /// Whether this role may act outside its home tenant.
    pub fn is_cross_tenant(&self) -> bool {
        matches!(self, Role::PlatformAdmin | Role::Staff)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::PlatformAdmin => "PlatformAdmin",
            Role::Staff => "Staff",
            Role::ClientAdmin => "ClientAdmin",
            Role::Client => "Client",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Home tenant. Immutable for the lifetime of the account.
    pub tenant_id: Uuid,
    /// Stored lowercased; unique within the home tenant.
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub password_hash: String,
    /// Deactivated accounts stay on record (soft delete only).
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub tenant_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    /// Raw password (hashed with Argon2id before storage).
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

/// An authenticated actor, as produced by the principal resolver.
///
/// This is the identity half of a request; authorization decisions are
/// made downstream from an [`crate::context::AuthorizationContext`]
/// built on top of it.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
    pub home_tenant_id: Uuid,
    pub email: String,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Principal {
            id: user.id,
            role: user.role,
            home_tenant_id: user.tenant_id,
            email: user.email.clone(),
        }
    }
}
