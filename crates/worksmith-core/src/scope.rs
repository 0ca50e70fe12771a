//! Tenant scope enforcement.
//!
//! All role/ownership access decisions live here as one small pure
//! decision table, rather than being re-derived ad hoc at each call
//! site. Three questions are answered: may this principal touch this
//! resource, what tenant filter applies to a list query, and what
//! tenant id gets stamped on a newly created resource.

use uuid::Uuid;

use crate::context::AuthorizationContext;
use crate::error::{WorksmithError, WorksmithResult};
use crate::models::user::Role;

/// The scoping facts about a target resource: who owns it, and (for
/// resource kinds with an owner-email concept, e.g. work orders and
/// quotes) which party it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct ResourceScope<'a> {
    pub tenant_id: Uuid,
    pub owner_email: Option<&'a str>,
}

impl<'a> ResourceScope<'a> {
    pub fn tenant(tenant_id: Uuid) -> Self {
        ResourceScope {
            tenant_id,
            owner_email: None,
        }
    }

    pub fn owned(tenant_id: Uuid, owner_email: &'a str) -> Self {
        ResourceScope {
            tenant_id,
            owner_email: Some(owner_email),
        }
    }
}

/// Tenant predicate for a list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantFilter {
    /// No tenant restriction. Only cross-tenant roles with no context
    /// switch get this — a deliberate escalation-by-default design.
    Global,
    /// Restrict rows to one tenant.
    Tenant(Uuid),
    /// Restrict rows to one tenant and one owner email.
    TenantOwner { tenant_id: Uuid, email: String },
}

/// May the principal read or write this single resource?
pub fn can_access(ctx: &AuthorizationContext, resource: ResourceScope<'_>) -> bool {
    match ctx.role() {
        // Cross-tenant roles pass unconditionally; the context switch
        // only narrows their list visibility, not single-resource
        // access.
        Role::PlatformAdmin | Role::Staff => true,
        Role::ClientAdmin => resource.tenant_id == ctx.effective_tenant_id,
        Role::Client => {
            resource.tenant_id == ctx.effective_tenant_id
                && match resource.owner_email {
                    Some(owner) => owner.eq_ignore_ascii_case(&ctx.principal.email),
                    // No owner-email concept on this resource kind:
                    // tenant match suffices.
                    None => true,
                }
        }
    }
}

/// [`can_access`] as a typed outcome: `Forbidden` on denial.
///
/// Callers that prefer to hide cross-tenant existence remap this to
/// `NotFound` at the boundary; internally the two stay distinct.
pub fn check_access(ctx: &AuthorizationContext, resource: ResourceScope<'_>) -> WorksmithResult<()> {
    if can_access(ctx, resource) {
        Ok(())
    } else {
        Err(WorksmithError::Forbidden {
            reason: format!(
                "principal {} may not access resources of tenant {}",
                ctx.principal.id, resource.tenant_id
            ),
        })
    }
}

/// The tenant predicate a list query must apply for this context.
pub fn list_filter(ctx: &AuthorizationContext) -> TenantFilter {
    match ctx.role() {
        Role::PlatformAdmin | Role::Staff => {
            if ctx.context_switched {
                TenantFilter::Tenant(ctx.effective_tenant_id)
            } else {
                TenantFilter::Global
            }
        }
        Role::ClientAdmin => TenantFilter::Tenant(ctx.effective_tenant_id),
        Role::Client => TenantFilter::TenantOwner {
            tenant_id: ctx.effective_tenant_id,
            email: ctx.principal.email.clone(),
        },
    }
}

/// The tenant id stamped on a newly created resource.
///
/// Always the effective tenant — a tenant field in the creation
/// payload, if any, is silently overridden by callers using this.
pub fn creation_tenant(ctx: &AuthorizationContext) -> Uuid {
    ctx.effective_tenant_id
}
