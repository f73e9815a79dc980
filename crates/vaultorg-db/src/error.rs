//! Database-specific error types and conversions.

use vaultorg_core::error::VaultorgError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Invalid stored value: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Stale revision for {entity} with id {id}")]
    Conflict { entity: String, id: String },
}

impl From<DbError> for VaultorgError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => VaultorgError::NotFound { entity, id },
            DbError::Conflict { entity, id } => VaultorgError::Conflict { entity, id },
            other => VaultorgError::Database(other.to_string()),
        }
    }
}

/// Parse a UUID stored as a string column.
pub(crate) fn parse_uuid(field: &str, value: &str) -> Result<uuid::Uuid, DbError> {
    uuid::Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}

impl DbError {
    /// Classify a failed write to `entity` `id`.
    ///
    /// The embedded engines abort a transaction that loses an optimistic
    /// write race; that outcome is reported as [`DbError::Conflict`].
    pub(crate) fn from_write(err: surrealdb::Error, entity: &str, id: &str) -> Self {
        if is_transaction_conflict(&err.to_string()) {
            DbError::Conflict {
                entity: entity.into(),
                id: id.into(),
            }
        } else {
            DbError::Surreal(err)
        }
    }
}

fn is_transaction_conflict(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("transaction conflict") || message.contains("write conflict")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_conflicts_are_recognised() {
        assert!(is_transaction_conflict(
            "Transaction conflict: Write conflict, retry the transaction"
        ));
        assert!(is_transaction_conflict(
            "There was a problem with the database: Transaction write conflict"
        ));
        assert!(!is_transaction_conflict("Found record: `organization:x` which already exists"));
        assert!(!is_transaction_conflict("Parse error"));
    }

    #[test]
    fn conflict_survives_conversion_to_core_error() {
        let err = VaultorgError::from(DbError::Conflict {
            entity: "organization".into(),
            id: "abc".into(),
        });
        assert!(matches!(err, VaultorgError::Conflict { .. }));
    }
}
