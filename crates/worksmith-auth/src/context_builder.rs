//! Authorization context construction — the context-switch protocol.
//!
//! Per request, exactly one [`AuthorizationContext`] is built from the
//! resolved principal and the optional tenant-override signal (a
//! header-like value naming a target tenant by id or code):
//!
//! 1. Elevated roles (`Staff`, `PlatformAdmin`) with an override get
//!    `effective_tenant_id` = the override's tenant, after a format
//!    check and a directory lookup. Switching into an archived or
//!    inactive tenant is allowed — only nonexistent tenants are
//!    rejected. Every applied switch is audited.
//! 2. Any other role supplying an override is refused outright.
//! 3. No override: the context is scoped to the home tenant. For
//!    elevated roles this still means *global* list visibility — the
//!    scope enforcer widens unswitched cross-tenant contexts rather
//!    than narrowing them.

use uuid::Uuid;
use worksmith_core::context::{AuditSink, AuthorizationContext, ContextSwitchEvent};
use worksmith_core::error::{WorksmithError, WorksmithResult};
use worksmith_core::models::tenant::Tenant;
use worksmith_core::models::user::Principal;
use worksmith_core::repository::TenantRepository;

/// A well-formed tenant-override value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideKey {
    Id(Uuid),
    Code(String),
}

/// Parse the raw override signal.
///
/// Accepted forms: a UUID, or an uppercase tenant code (2–32 chars of
/// `A-Z 0-9 _ -`). Anything else is `InvalidContextFormat` — rejected
/// before any directory lookup happens.
pub fn parse_override(raw: &str) -> WorksmithResult<OverrideKey> {
    let trimmed = raw.trim();
    if let Ok(id) = Uuid::parse_str(trimmed) {
        return Ok(OverrideKey::Id(id));
    }
    let is_code = (2..=32).contains(&trimmed.len())
        && trimmed
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if is_code {
        Ok(OverrideKey::Code(trimmed.to_string()))
    } else {
        Err(WorksmithError::InvalidContextFormat {
            value: raw.to_string(),
        })
    }
}

/// Builds the per-request [`AuthorizationContext`].
pub struct ContextBuilder<T: TenantRepository, A: AuditSink> {
    tenant_repo: T,
    audit: A,
}

impl<T: TenantRepository, A: AuditSink> ContextBuilder<T, A> {
    pub fn new(tenant_repo: T, audit: A) -> Self {
        Self { tenant_repo, audit }
    }

    /// Build the context for one request.
    ///
    /// `tenant_override` is the raw header-like signal, if present.
    pub async fn build(
        &self,
        principal: Principal,
        tenant_override: Option<&str>,
    ) -> WorksmithResult<AuthorizationContext> {
        let Some(raw) = tenant_override else {
            return Ok(AuthorizationContext::home(principal));
        };

        // Non-elevated roles may never request cross-tenant context,
        // regardless of what the override says.
        if !principal.role.is_cross_tenant() {
            return Err(WorksmithError::ForbiddenContextSwitch {
                role: principal.role.as_str().into(),
            });
        }

        let key = parse_override(raw)?;
        let tenant = self.resolve_target(&key, raw).await?;

        self.audit.context_switch(ContextSwitchEvent {
            principal_id: principal.id,
            original_tenant_id: principal.home_tenant_id,
            target_tenant_id: tenant.id,
            timestamp: chrono::Utc::now(),
        });

        Ok(AuthorizationContext::switched(principal, tenant.id))
    }

    async fn resolve_target(&self, key: &OverrideKey, raw: &str) -> WorksmithResult<Tenant> {
        let result = match key {
            OverrideKey::Id(id) => self.tenant_repo.get_by_id(*id).await,
            OverrideKey::Code(code) => self.tenant_repo.get_by_code(code).await,
        };
        // Archived/inactive tenants are deliberately not rejected here;
        // only nonexistent ones are.
        result.map_err(|e| {
            if matches!(e, WorksmithError::NotFound { .. }) {
                WorksmithError::InvalidContext {
                    value: raw.to_string(),
                }
            } else {
                e
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_override_parses() {
        let id = Uuid::new_v4();
        assert_eq!(parse_override(&id.to_string()).unwrap(), OverrideKey::Id(id));
    }

    #[test]
    fn code_override_parses() {
        assert_eq!(
            parse_override("ACME-2").unwrap(),
            OverrideKey::Code("ACME-2".into())
        );
        assert_eq!(
            parse_override("  NORTH_WING  ").unwrap(),
            OverrideKey::Code("NORTH_WING".into())
        );
    }

    #[test]
    fn malformed_overrides_are_rejected() {
        for bad in ["", "a", "lowercase", "WAY TOO SPACEY", "tenant!", "X"] {
            assert!(
                matches!(
                    parse_override(bad),
                    Err(WorksmithError::InvalidContextFormat { .. })
                ),
                "{bad:?} should be malformed"
            );
        }
        let too_long = "A".repeat(33);
        assert!(matches!(
            parse_override(&too_long),
            Err(WorksmithError::InvalidContextFormat { .. })
        ));
    }
}
