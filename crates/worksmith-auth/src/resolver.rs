//! Principal resolution — credential in, identity out.
//!
//! This component decides identity only, never access; authorization
//! is the context builder's and scope enforcer's job. Keeping the two
//! apart keeps both independently testable.

use uuid::Uuid;
use worksmith_core::error::{WorksmithError, WorksmithResult};
use worksmith_core::models::user::Principal;
use worksmith_core::repository::{TenantRepository, UserRepository};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::token;

/// Turns a bearer credential into a [`Principal`].
///
/// Generic over repository implementations so that this layer has no
/// dependency on the database crate.
pub struct PrincipalResolver<U: UserRepository, T: TenantRepository> {
    user_repo: U,
    tenant_repo: T,
    config: AuthConfig,
}

impl<U: UserRepository, T: TenantRepository> PrincipalResolver<U, T> {
    pub fn new(user_repo: U, tenant_repo: T, config: AuthConfig) -> Self {
        Self {
            user_repo,
            tenant_repo,
            config,
        }
    }

    /// Resolve an access token to a principal.
    ///
    /// Fails `Unauthenticated` for structurally invalid or expired
    /// credentials (or credentials naming an unknown user/tenant), and
    /// `AccountDisabled` for deactivated accounts.
    pub async fn resolve(&self, access_token: &str) -> WorksmithResult<Principal> {
        let claims = token::decode_access_token(access_token, &self.config)
            .map_err(WorksmithError::from)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|e| AuthError::TokenInvalid(format!("bad subject: {e}")))?;
        let tenant_id = Uuid::parse_str(&claims.tenant_id)
            .map_err(|e| AuthError::TokenInvalid(format!("bad tenant claim: {e}")))?;

        // The home tenant must exist. Its status is not checked here:
        // tenant suspension gates new logins, not in-flight identity.
        self.tenant_repo.get_by_id(tenant_id).await.map_err(|e| {
            if matches!(e, WorksmithError::NotFound { .. }) {
                WorksmithError::Unauthenticated {
                    reason: "unknown home tenant".into(),
                }
            } else {
                e
            }
        })?;

        let user = self
            .user_repo
            .get_by_id(tenant_id, user_id)
            .await
            .map_err(|e| {
                if matches!(e, WorksmithError::NotFound { .. }) {
                    WorksmithError::Unauthenticated {
                        reason: "unknown principal".into(),
                    }
                } else {
                    e
                }
            })?;

        if !user.active {
            return Err(WorksmithError::AccountDisabled);
        }

        Ok(Principal::from(&user))
    }
}
