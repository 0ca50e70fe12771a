//! Authentication error types.

use thiserror::Error;
use worksmith_core::error::WorksmithError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is disabled")]
    AccountDisabled,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for WorksmithError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::TokenExpired | AuthError::TokenInvalid(_) => {
                WorksmithError::Unauthenticated {
                    reason: err.to_string(),
                }
            }
            AuthError::AccountDisabled => WorksmithError::AccountDisabled,
            AuthError::Crypto(msg) => WorksmithError::Internal(msg),
        }
    }
}
