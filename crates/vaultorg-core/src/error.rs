//! Error types shared by every vaultorg crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultorgError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    /// A conditional write lost against a concurrent writer.
    #[error("Concurrent modification: {entity} with id {id}")]
    Conflict { entity: String, id: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type VaultorgResult<T> = Result<T, VaultorgError>;
