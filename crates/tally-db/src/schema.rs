//! Schema definitions and migration runner for SurrealDB.
//!
//! All tables are SCHEMAFULL. UUIDs are stored as strings; roles are
//! stored as their snake_case names with an ASSERT constraint.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
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

#[derive(Debug, SurrealValue)]
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

/// Sequences backing the `seq` columns.
pub(crate) const AUDIT_SEQUENCE: &str = "audit_seq";
pub(crate) const PRINCIPAL_SEQUENCE: &str = "principal_seq";

/// Index names referenced when classifying rejected writes.
pub(crate) const TENANT_DOMAIN_INDEX: &str = "idx_tenant_domain";
pub(crate) const PRINCIPAL_EMAIL_INDEX: &str = "idx_principal_email";

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Tenants (global scope)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD domain ON TABLE tenant TYPE string;
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now() READONLY;
DEFINE INDEX idx_tenant_domain ON TABLE tenant \
    COLUMNS domain UNIQUE;

-- =======================================================================
-- Principals (tenant scope, email globally unique)
-- =======================================================================
DEFINE TABLE principal SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE principal TYPE string;
DEFINE FIELD email ON TABLE principal TYPE string;
DEFINE FIELD credential_hash ON TABLE principal TYPE string;
DEFINE FIELD first_name ON TABLE principal TYPE string;
DEFINE FIELD last_name ON TABLE principal TYPE string;
DEFINE FIELD role ON TABLE principal TYPE string \
    ASSERT $value IN ['owner', 'admin', 'analyst', 'content_creator'];
DEFINE FIELD active ON TABLE principal TYPE bool DEFAULT true;
DEFINE FIELD seq ON TABLE principal TYPE int;
DEFINE FIELD created_at ON TABLE principal TYPE datetime \
    DEFAULT time::now() READONLY;
DEFINE INDEX idx_principal_email ON TABLE principal \
    COLUMNS email UNIQUE;
DEFINE INDEX idx_principal_tenant ON TABLE principal \
    COLUMNS tenant_id;

-- =======================================================================
-- Audit Log (tenant scope, append-only)
-- =======================================================================
DEFINE TABLE audit_log SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD seq ON TABLE audit_log TYPE int;
DEFINE FIELD tenant_id ON TABLE audit_log TYPE string;
DEFINE FIELD actor_id ON TABLE audit_log TYPE string;
DEFINE FIELD action ON TABLE audit_log TYPE string;
DEFINE FIELD resource_type ON TABLE audit_log TYPE string;
DEFINE FIELD resource_id ON TABLE audit_log TYPE option<string>;
DEFINE FIELD details ON TABLE audit_log TYPE option<string>;
DEFINE FIELD ip_address ON TABLE audit_log TYPE option<string>;
DEFINE FIELD user_agent ON TABLE audit_log TYPE option<string>;
DEFINE FIELD created_at ON TABLE audit_log TYPE datetime \
    DEFAULT time::now() READONLY;
DEFINE INDEX idx_audit_seq ON TABLE audit_log \
    COLUMNS seq UNIQUE;
DEFINE INDEX idx_audit_tenant_time ON TABLE audit_log \
    COLUMNS tenant_id, created_at;
DEFINE INDEX idx_audit_tenant_actor ON TABLE audit_log \
    COLUMNS tenant_id, actor_id;

-- Sequences backing audit_log.seq and principal.seq.
DEFINE SEQUENCE audit_seq START 1;
DEFINE SEQUENCE principal_seq START 1;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

        info!(version = migration.version, "Migration applied");
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn unique_indexes_are_defined() {
        assert!(SCHEMA_V1.contains(&format!("{TENANT_DOMAIN_INDEX} ON TABLE tenant")));
        assert!(SCHEMA_V1.contains(&format!("{PRINCIPAL_EMAIL_INDEX} ON TABLE principal")));
    }

    #[test]
    fn sequences_are_defined() {
        assert!(SCHEMA_V1.contains(&format!("DEFINE SEQUENCE {AUDIT_SEQUENCE} ")));
        assert!(SCHEMA_V1.contains(&format!("DEFINE SEQUENCE {PRINCIPAL_SEQUENCE} ")));
    }

    #[test]
    fn audit_log_forbids_update_and_delete() {
        assert!(SCHEMA_V1.contains("FOR update NONE"));
        assert!(SCHEMA_V1.contains("FOR delete NONE"));
    }
}
