//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. Unique indexes carry the
//! uniqueness invariants: tenant codes and quote numbers are global,
//! emails and job numbers are unique per tenant.

use surrealdb::{Connection, Surreal};
use serde::Deserialize;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, Deserialize)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Tenants (global scope; never deleted, only archived)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD code ON TABLE tenant TYPE string;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD status ON TABLE tenant TYPE string \
    ASSERT $value IN ['Active', 'Inactive', 'Archived'] \
    DEFAULT 'Active';
DEFINE FIELD created_at ON TABLE tenant TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_tenant_code ON TABLE tenant COLUMNS code UNIQUE;

-- =======================================================================
-- Users (tenant-scoped; email unique per tenant, stored lowercased)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD full_name ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['PlatformAdmin', 'Staff', 'ClientAdmin', 'Client'];
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD active ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE user TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_user_tenant_email ON TABLE user \
    COLUMNS tenant_id, email UNIQUE;

-- =======================================================================
-- Sessions (refresh tokens)
-- =======================================================================
DEFINE TABLE session SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE session TYPE string;
DEFINE FIELD user_id ON TABLE session TYPE string;
DEFINE FIELD token_hash ON TABLE session TYPE string;
DEFINE FIELD expires_at ON TABLE session TYPE datetime;
DEFINE FIELD created_at ON TABLE session TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_session_token ON TABLE session \
    COLUMNS tenant_id, token_hash UNIQUE;

-- =======================================================================
-- Quotes (quote_number globally unique across tenants)
-- =======================================================================
DEFINE TABLE quote SCHEMAFULL;
DEFINE FIELD quote_number ON TABLE quote TYPE string;
DEFINE FIELD tenant_id ON TABLE quote TYPE string;
DEFINE FIELD status ON TABLE quote TYPE string \
    ASSERT $value IN ['Draft', 'Submitted', 'InformationRequested', \
        'Quoted', 'UnderDiscussion', 'Approved', 'Declined', 'Expired', \
        'Converted'] \
    DEFAULT 'Draft';
DEFINE FIELD contact_email ON TABLE quote TYPE string;
DEFINE FIELD contact_name ON TABLE quote TYPE string;
DEFINE FIELD property_address ON TABLE quote TYPE string;
DEFINE FIELD description ON TABLE quote TYPE string;
DEFINE FIELD estimated_cost ON TABLE quote TYPE option<number>;
DEFINE FIELD quote_valid_until ON TABLE quote TYPE option<datetime>;
DEFINE FIELD converted_to_work_order_id ON TABLE quote TYPE option<string>;
DEFINE FIELD created_at ON TABLE quote TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE quote TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_quote_number ON TABLE quote COLUMNS quote_number UNIQUE;

-- =======================================================================
-- Work orders (job_no unique per tenant)
-- =======================================================================
DEFINE TABLE work_order SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE work_order TYPE string;
DEFINE FIELD job_no ON TABLE work_order TYPE string;
DEFINE FIELD quote_id ON TABLE work_order TYPE option<string>;
DEFINE FIELD authorized_email ON TABLE work_order TYPE string;
DEFINE FIELD description ON TABLE work_order TYPE string;
DEFINE FIELD created_at ON TABLE work_order TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_work_order_tenant_job ON TABLE work_order \
    COLUMNS tenant_id, job_no UNIQUE;

-- =======================================================================
-- Number sequences (one record per key; atomic increments)
-- =======================================================================
DEFINE TABLE quote_sequence SCHEMAFULL;
DEFINE FIELD next ON TABLE quote_sequence TYPE int DEFAULT 0;

DEFINE TABLE job_sequence SCHEMAFULL;
DEFINE FIELD next ON TABLE job_sequence TYPE int DEFAULT 0;
";

// -----------------------------------------------------------------------
// Migration runner
// -----------------------------------------------------------------------

/// Apply all pending migrations.
///
/// Each migration runs once; applied versions are tracked in the
/// `_migration` table.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await
        .map_err(DbError::from)?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version")
        .await
        .map_err(DbError::from)?;
    let applied: Vec<MigrationRecord> = result.take(0).map_err(DbError::from)?;
    let max_applied = applied.iter().map(|m| m.version).max().unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= max_applied {
            continue;
        }
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql)
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "migration {} ({}) failed: {e}",
                    migration.version, migration.name
                ))
            })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;
    }

    Ok(())
}
