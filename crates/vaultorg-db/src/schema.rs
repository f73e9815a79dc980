//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

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
    #[allow(dead_code)]
    name: String,
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
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Organizations
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD billing_email ON TABLE organization TYPE string;
DEFINE FIELD enabled ON TABLE organization TYPE bool DEFAULT false;
DEFINE FIELD status ON TABLE organization TYPE string \
    ASSERT $value IN ['Pending', 'Created', 'Managed'];
DEFINE FIELD public_key ON TABLE organization TYPE option<string>;
DEFINE FIELD private_key ON TABLE organization TYPE option<string>;
DEFINE FIELD revision ON TABLE organization TYPE int DEFAULT 0;
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Memberships (organization scope)
-- =======================================================================
DEFINE TABLE membership SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE membership TYPE string;
DEFINE FIELD user_id ON TABLE membership TYPE option<string>;
DEFINE FIELD email ON TABLE membership TYPE string;
DEFINE FIELD role ON TABLE membership TYPE string \
    ASSERT $value IN ['Owner', 'Admin', 'User', 'Custom'];
DEFINE FIELD status ON TABLE membership TYPE string \
    ASSERT $value IN ['Revoked', 'Invited', 'Accepted', 'Confirmed'];
DEFINE FIELD created_at ON TABLE membership TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE membership TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_membership_org ON TABLE membership \
    COLUMNS organization_id;
DEFINE INDEX idx_membership_user ON TABLE membership \
    COLUMNS user_id;

-- =======================================================================
-- Collections (organization scope)
-- =======================================================================
DEFINE TABLE collection SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE collection TYPE string;
DEFINE FIELD name ON TABLE collection TYPE string;
DEFINE FIELD external_id ON TABLE collection TYPE option<string>;
DEFINE FIELD created_at ON TABLE collection TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE collection TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_collection_org ON TABLE collection \
    COLUMNS organization_id;

-- Membership -> Collection access entries
DEFINE TABLE collection_user SCHEMAFULL;
DEFINE FIELD collection_id ON TABLE collection_user TYPE string;
DEFINE FIELD membership_id ON TABLE collection_user TYPE string;
DEFINE FIELD manage ON TABLE collection_user TYPE bool DEFAULT false;
DEFINE FIELD read_only ON TABLE collection_user TYPE bool DEFAULT false;
DEFINE FIELD hide_passwords ON TABLE collection_user TYPE bool \
    DEFAULT false;
DEFINE INDEX idx_collection_user_pair ON TABLE collection_user \
    COLUMNS collection_id, membership_id UNIQUE;

-- =======================================================================
-- Policies (organization scope)
-- =======================================================================
DEFINE TABLE policy SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE policy TYPE string;
DEFINE FIELD policy_type ON TABLE policy TYPE string \
    ASSERT $value IN ['TwoFactorAuthentication', 'MasterPassword', \
    'PasswordGenerator', 'SingleOrg', 'RequireSso', 'DisableSend', \
    'ResetPassword'];
DEFINE FIELD enabled ON TABLE policy TYPE bool DEFAULT false;
DEFINE FIELD data ON TABLE policy TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE policy TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE policy TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_policy_org_type ON TABLE policy \
    COLUMNS organization_id, policy_type UNIQUE;

-- =======================================================================
-- User signing keys (user scope)
-- =======================================================================
DEFINE TABLE user_signing_keys SCHEMAFULL;
DEFINE FIELD user_id ON TABLE user_signing_keys TYPE string;
DEFINE FIELD key_type ON TABLE user_signing_keys TYPE string \
    ASSERT $value IN ['Ed25519'];
DEFINE FIELD verifying_key ON TABLE user_signing_keys \
    TYPE option<string>;
DEFINE FIELD signing_key ON TABLE user_signing_keys \
    TYPE option<string>;
DEFINE FIELD created_at ON TABLE user_signing_keys TYPE datetime \
    DEFAULT time::now() READONLY;
DEFINE FIELD updated_at ON TABLE user_signing_keys TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_signing_keys_user ON TABLE user_signing_keys \
    COLUMNS user_id UNIQUE;
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
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
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

        db.query(
            "CREATE _migration SET version = $version, \
             name = $name",
        )
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
    fn schema_v1_defines_every_table() {
        for table in [
            "organization",
            "membership",
            "collection",
            "collection_user",
            "policy",
            "user_signing_keys",
        ] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing table {table}"
            );
        }
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
