//! Request-scoped authorization context.
//!
//! An [`AuthorizationContext`] is constructed once per request from the
//! resolved principal and the optional tenant-override signal, then
//! passed explicitly to every downstream call. It is immutable and must
//! never be cached or shared across requests — its correctness depends
//! entirely on the credential and headers of the single request that
//! created it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::{Principal, Role};

/// The effective scope of one request.
#[derive(Debug, Clone)]
pub struct AuthorizationContext {
    pub principal: Principal,
    /// The tenant id actually used to scope this request's reads and
    /// writes. Equals the home tenant unless a context switch was
    /// applied.
    pub effective_tenant_id: Uuid,
    /// True when a tenant-override signal was validated and applied.
    pub context_switched: bool,
    /// The principal's home tenant, recorded only when switched.
    pub original_tenant_id: Option<Uuid>,
    /// Whether the role is `Staff`/`PlatformAdmin`. Governs whether
    /// "no override present" means global visibility (cross-tenant
    /// roles) or home-tenant-only (client roles).
    pub is_cross_tenant_role: bool,
}

impl AuthorizationContext {
    /// Context scoped to the principal's home tenant (no switch).
    pub fn home(principal: Principal) -> Self {
        let effective_tenant_id = principal.home_tenant_id;
        let is_cross_tenant_role = principal.role.is_cross_tenant();
        AuthorizationContext {
            principal,
            effective_tenant_id,
            context_switched: false,
            original_tenant_id: None,
            is_cross_tenant_role,
        }
    }

    /// Context switched into `target_tenant_id`. Callers must have
    /// already validated the switch (elevated role, existing tenant).
    pub fn switched(principal: Principal, target_tenant_id: Uuid) -> Self {
        let original = principal.home_tenant_id;
        let is_cross_tenant_role = principal.role.is_cross_tenant();
        AuthorizationContext {
            principal,
            effective_tenant_id: target_tenant_id,
            context_switched: true,
            original_tenant_id: Some(original),
            is_cross_tenant_role,
        }
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }
}

/// Audit payload emitted on every applied context switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSwitchEvent {
    pub principal_id: Uuid,
    pub original_tenant_id: Uuid,
    pub target_tenant_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

/// Destination for context-switch audit events.
///
/// Emission is fire-and-forget: implementations must not block the
/// request and must swallow their own delivery failures.
pub trait AuditSink: Send + Sync {
    fn context_switch(&self, event: ContextSwitchEvent);
}

/// Default sink: a structured `tracing` event at INFO.
#[derive(Debug, Clone, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn context_switch(&self, event: ContextSwitchEvent) {
        tracing::info!(
            principal_id = %event.principal_id,
            original_tenant_id = %event.original_tenant_id,
            target_tenant_id = %event.target_tenant_id,
            timestamp = %event.timestamp,
            "tenant context switch"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            role,
            home_tenant_id: Uuid::new_v4(),
            email: "p@example.com".into(),
        }
    }

    #[test]
    fn home_context_is_unswitched() {
        let p = principal(Role::ClientAdmin);
        let home = p.home_tenant_id;
        let ctx = AuthorizationContext::home(p);
        assert_eq!(ctx.effective_tenant_id, home);
        assert!(!ctx.context_switched);
        assert!(ctx.original_tenant_id.is_none());
        assert!(!ctx.is_cross_tenant_role);
    }

    #[test]
    fn switched_context_records_original_tenant() {
        let p = principal(Role::Staff);
        let home = p.home_tenant_id;
        let target = Uuid::new_v4();
        let ctx = AuthorizationContext::switched(p, target);
        assert_eq!(ctx.effective_tenant_id, target);
        assert!(ctx.context_switched);
        assert_eq!(ctx.original_tenant_id, Some(home));
        assert!(ctx.is_cross_tenant_role);
    }
}
