//! Error types for the Worksmith system.
//!
//! Every variant here is an expected, typed outcome returned to the
//! caller — none of them are used for control flow inside the core.
//! The boundary layer decides how each maps onto the wire; in
//! particular, `Forbidden` on a single-resource read may be surfaced
//! externally as `NotFound` so that a cross-tenant probe cannot confirm
//! a resource's existence. The core always returns the precise variant.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorksmithError {
    /// Credential is structurally invalid or expired.
    #[error("authentication failed: {reason}")]
    Unauthenticated { reason: String },

    /// Valid credential, but the account has been deactivated.
    #[error("account is disabled")]
    AccountDisabled,

    /// Tenant-override value is malformed (not a UUID or tenant code).
    #[error("invalid tenant context format: {value}")]
    InvalidContextFormat { value: String },

    /// Tenant-override value names a tenant that does not exist.
    #[error("invalid tenant context: no tenant matches {value}")]
    InvalidContext { value: String },

    /// A non-elevated role supplied a tenant-override signal.
    #[error("role {role} may not switch tenant context")]
    ForbiddenContextSwitch { role: String },

    /// Authenticated, but the resource belongs to another tenant or
    /// another owner.
    #[error("access denied: {reason}")]
    Forbidden { reason: String },

    #[error("entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// Target status is not in the allowed-target set for the quote's
    /// current status.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// Approval attempted after `quote_valid_until` has passed. The
    /// remedy (request a renewal) differs from a plain bad request, so
    /// this is distinct from [`WorksmithError::InvalidTransition`].
    #[error("quote has expired and can no longer be approved")]
    QuoteExpired,

    /// Conversion attempted on a quote that already produced a work
    /// order. Conversion is a one-time billing-visible event, so a
    /// repeat call is an error, never a silent success.
    #[error("quote has already been converted to a work order")]
    AlreadyConverted,

    /// A conditional write matched zero rows — a concurrent writer won
    /// the race. Safe for the caller to retry once.
    #[error("conflicting concurrent update, retry may succeed")]
    Conflict,

    #[error("entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type WorksmithResult<T> = Result<T, WorksmithError>;

impl WorksmithError {
    /// Whether an automatic single retry is safe. Only lost
    /// conditional-write races qualify; everything else needs caller
    /// intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WorksmithError::Conflict)
    }
}
