//! Database-specific error types and conversions.

use worksmith_core::error::WorksmithError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl From<DbError> for WorksmithError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => WorksmithError::NotFound { entity, id },
            other => WorksmithError::Database(other.to_string()),
        }
    }
}
