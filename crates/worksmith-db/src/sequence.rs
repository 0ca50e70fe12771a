//! Monotonic number sequences.
//!
//! Quote numbers (`QTE-<year>-<seq>`) come from one global counter per
//! calendar year; job numbers (`WO-<seq>`) from one counter per
//! tenant. Each allocation is a single-record atomic `UPSERT .. += 1`,
//! so concurrent allocations never hand out the same number. Numbers
//! are allocated before the insert that uses them, which makes the
//! scheme gap-tolerant: a failed insert simply skips a number, it is
//! never reused.

use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;

async fn bump<C: Connection>(
    db: &Surreal<C>,
    table: &'static str,
    key: String,
) -> Result<u64, DbError> {
    let mut result = db
        .query("UPSERT type::thing($table, $key) SET next += 1 RETURN VALUE next")
        .bind(("table", table))
        .bind(("key", key))
        .await
        .map_err(DbError::from)?;

    let values: Vec<u64> = result.take(0).map_err(DbError::from)?;
    values
        .into_iter()
        .next()
        .ok_or_else(|| DbError::Corrupt(format!("sequence {table} returned no value")))
}

/// Allocate the next quote number for `year`.
///
/// Sequences reset per calendar year and are zero-padded to at least
/// three digits: `QTE-2025-001`, `QTE-2025-002`, …
pub async fn next_quote_number<C: Connection>(
    db: &Surreal<C>,
    year: i32,
) -> Result<String, DbError> {
    let seq = bump(db, "quote_sequence", year.to_string()).await?;
    Ok(format!("QTE-{year}-{seq:03}"))
}

/// Allocate the next job number for a tenant: `WO-001`, `WO-002`, …
/// unique within that tenant.
pub async fn next_job_number<C: Connection>(
    db: &Surreal<C>,
    tenant_id: Uuid,
) -> Result<String, DbError> {
    let seq = bump(db, "job_sequence", tenant_id.to_string()).await?;
    Ok(format!("WO-{seq:03}"))
}
