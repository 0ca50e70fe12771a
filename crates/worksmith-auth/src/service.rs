//! Authentication service — login orchestration.

use chrono::{Duration, Utc};
use uuid::Uuid;
use worksmith_core::error::{WorksmithError, WorksmithResult};
use worksmith_core::models::session::CreateSession;
use worksmith_core::repository::{SessionRepository, UserRepository};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub tenant_id: Uuid,
    pub email: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Raw opaque refresh token (return to client, not stored).
    pub refresh_token: String,
    /// Session ID (can be used for logout).
    pub session_id: Uuid,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Successful refresh result.
#[derive(Debug)]
pub struct RefreshOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate.
pub struct AuthService<U: UserRepository, S: SessionRepository> {
    user_repo: U,
    session_repo: S,
    config: AuthConfig,
}

impl<U: UserRepository, S: SessionRepository> AuthService<U, S> {
    pub fn new(user_repo: U, session_repo: S, config: AuthConfig) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    /// Authenticate a user with email + password and issue tokens.
    pub async fn login(&self, input: LoginInput) -> WorksmithResult<LoginOutput> {
        // 1. Look up user by email within the tenant. An unknown email
        //    reports the same error as a wrong password.
        let user = self
            .user_repo
            .get_by_email(input.tenant_id, &input.email)
            .await
            .map_err(|e| match e {
                WorksmithError::NotFound { .. } => AuthError::InvalidCredentials.into(),
                other => other,
            })?;

        // 2. Verify password.
        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        // 3. Deactivated accounts cannot log in.
        if !user.active {
            return Err(AuthError::AccountDisabled.into());
        }

        // 4. Issue access token + opaque refresh token.
        let access_token =
            token::issue_access_token(user.id, user.role, user.tenant_id, &self.config)?;
        let refresh_token = token::generate_refresh_token();
        let token_hash = token::hash_refresh_token(&refresh_token);

        let session = self
            .session_repo
            .create(CreateSession {
                tenant_id: user.tenant_id,
                user_id: user.id,
                token_hash,
                expires_at: Utc::now()
                    + Duration::seconds(self.config.refresh_token_lifetime_secs as i64),
            })
            .await?;

        tracing::debug!(user_id = %user.id, tenant_id = %user.tenant_id, "login succeeded");

        Ok(LoginOutput {
            access_token,
            refresh_token,
            session_id: session.id,
            expires_in: self.config.access_token_lifetime_secs,
        })
    }

    /// Exchange a stored refresh token for a fresh access token.
    ///
    /// The refresh token itself is not rotated; the session keeps its
    /// original expiry. A lapsed session is removed on sight.
    pub async fn refresh(&self, tenant_id: Uuid, refresh_token: &str) -> WorksmithResult<RefreshOutput> {
        let token_hash = token::hash_refresh_token(refresh_token);
        let session = self
            .session_repo
            .get_by_token_hash(tenant_id, &token_hash)
            .await
            .map_err(|e| match e {
                WorksmithError::NotFound { .. } => AuthError::InvalidCredentials.into(),
                other => other,
            })?;

        if session.expires_at < Utc::now() {
            self.session_repo.invalidate(tenant_id, session.id).await?;
            return Err(AuthError::TokenExpired.into());
        }

        let user = self.user_repo.get_by_id(tenant_id, session.user_id).await?;
        if !user.active {
            return Err(AuthError::AccountDisabled.into());
        }

        let access_token =
            token::issue_access_token(user.id, user.role, user.tenant_id, &self.config)?;

        tracing::debug!(user_id = %user.id, tenant_id = %tenant_id, "access token refreshed");

        Ok(RefreshOutput {
            access_token,
            expires_in: self.config.access_token_lifetime_secs,
        })
    }

    /// Invalidate a session (logout).
    pub async fn logout(&self, tenant_id: Uuid, session_id: Uuid) -> WorksmithResult<()> {
        self.session_repo.invalidate(tenant_id, session_id).await
    }

    /// Invalidate the session holding the given refresh token.
    ///
    /// Idempotent: an unknown token is treated as already logged out.
    pub async fn logout_by_token(&self, tenant_id: Uuid, refresh_token: &str) -> WorksmithResult<()> {
        let token_hash = token::hash_refresh_token(refresh_token);
        match self.session_repo.get_by_token_hash(tenant_id, &token_hash).await {
            Ok(session) => self.session_repo.invalidate(tenant_id, session.id).await,
            Err(WorksmithError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
