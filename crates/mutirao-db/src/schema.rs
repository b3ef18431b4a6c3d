//! Schema definitions and migration runner for SurrealDB.
//!
//! Tables are SCHEMAFULL. Record keys are the string ids the domain
//! uses; the `uid` field duplicates the key and is optional so that
//! records written without it can still be read and repaired.

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

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        sql: SCHEMA_V1,
    },
    Migration {
        version: 2,
        name: "search_indexes",
        sql: SCHEMA_V2,
    },
];

// -----------------------------------------------------------------------
// Schema v1 — collections
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Volunteers
-- =======================================================================
DEFINE TABLE volunteer SCHEMAFULL;
DEFINE FIELD uid ON TABLE volunteer TYPE option<string>;
DEFINE FIELD name ON TABLE volunteer TYPE string;
DEFINE FIELD surname ON TABLE volunteer TYPE string DEFAULT '';
DEFINE FIELD name_to_search ON TABLE volunteer TYPE string DEFAULT '';
DEFINE FIELD age ON TABLE volunteer TYPE option<int>;
DEFINE FIELD email ON TABLE volunteer TYPE option<string>;
DEFINE FIELD avatar ON TABLE volunteer TYPE option<string>;
DEFINE FIELD roles ON TABLE volunteer TYPE array<string> DEFAULT [];
DEFINE FIELD pending_roles ON TABLE volunteer TYPE array<string> \
    DEFAULT [];
DEFINE FIELD created_at ON TABLE volunteer TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE volunteer TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Removed volunteers (archive of deleted records)
-- =======================================================================
DEFINE TABLE removed_volunteer SCHEMAFULL;
DEFINE FIELD uid ON TABLE removed_volunteer TYPE option<string>;
DEFINE FIELD name ON TABLE removed_volunteer TYPE string;
DEFINE FIELD surname ON TABLE removed_volunteer TYPE string;
DEFINE FIELD name_to_search ON TABLE removed_volunteer TYPE string;
DEFINE FIELD age ON TABLE removed_volunteer TYPE option<int>;
DEFINE FIELD email ON TABLE removed_volunteer TYPE option<string>;
DEFINE FIELD avatar ON TABLE removed_volunteer TYPE option<string>;
DEFINE FIELD roles ON TABLE removed_volunteer TYPE array<string>;
DEFINE FIELD pending_roles ON TABLE removed_volunteer TYPE array<string>;
DEFINE FIELD created_at ON TABLE removed_volunteer TYPE datetime;
DEFINE FIELD updated_at ON TABLE removed_volunteer TYPE datetime;
DEFINE FIELD removed_at ON TABLE removed_volunteer TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Roles
-- =======================================================================
DEFINE TABLE role SCHEMAFULL;
DEFINE FIELD uid ON TABLE role TYPE option<string>;
DEFINE FIELD name ON TABLE role TYPE string;
DEFINE FIELD description ON TABLE role TYPE string DEFAULT '';
DEFINE FIELD icon ON TABLE role TYPE string DEFAULT '';
DEFINE FIELD kind ON TABLE role TYPE int DEFAULT 0 \
    ASSERT $value IN [0, 1, 20, 50];
DEFINE FIELD initial ON TABLE role TYPE bool DEFAULT false;
DEFINE FIELD actions ON TABLE role TYPE array<string> DEFAULT [];
DEFINE FIELD created_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE role TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Actions
-- =======================================================================
DEFINE TABLE action SCHEMAFULL;
DEFINE FIELD uid ON TABLE action TYPE option<string>;
DEFINE FIELD name ON TABLE action TYPE string;
DEFINE FIELD description ON TABLE action TYPE string DEFAULT '';
DEFINE FIELD level ON TABLE action TYPE int ASSERT $value >= 0;
DEFINE FIELD parent ON TABLE action TYPE option<string>;
DEFINE FIELD created_at ON TABLE action TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE action TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Avatars
-- =======================================================================
DEFINE TABLE avatar SCHEMAFULL;
DEFINE FIELD kind ON TABLE avatar TYPE int DEFAULT 0 \
    ASSERT $value IN [0, 1, 20, 50];
DEFINE FIELD link ON TABLE avatar TYPE string;
";

// -----------------------------------------------------------------------
// Schema v2 — query indexes
// -----------------------------------------------------------------------

const SCHEMA_V2: &str = "\
DEFINE INDEX idx_volunteer_name_to_search ON TABLE volunteer \
    COLUMNS name_to_search;
DEFINE INDEX idx_volunteer_age ON TABLE volunteer COLUMNS age;
DEFINE INDEX idx_role_name ON TABLE role COLUMNS name;
DEFINE INDEX idx_role_initial ON TABLE role COLUMNS initial;
DEFINE INDEX idx_action_level ON TABLE action COLUMNS level;
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

    for migration in MIGRATIONS
        .iter()
        .filter(|m| m.version > current_version)
    {
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
    }

    info!(
        version = MIGRATIONS.last().map(|m| m.version).unwrap_or(0),
        "Schema up to date"
    );

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
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
    fn every_collection_is_defined() {
        for table in ["volunteer", "removed_volunteer", "role", "action", "avatar"] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing table {table}"
            );
        }
    }
}
