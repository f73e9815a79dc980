//! Per-user signing key material.
//!
//! Owned by the account subsystem. Identity, owner, key type and creation
//! time are fixed when the record is created; rotation replaces the key
//! pair and bumps `updated_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum stored length of either encoded key.
pub const MAX_SIGNING_KEY_LEN: usize = 500;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SigningKeyType {
    Ed25519,
}

impl SigningKeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519 => "Ed25519",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSigningKeys {
    pub id: Uuid,
    pub user_id: Uuid,
    pub key_type: SigningKeyType,
    /// Public verifying key.
    pub verifying_key: Option<String>,
    /// Signing key, wrapped by the user's symmetric key.
    pub signing_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSigningKeys {
    pub user_id: Uuid,
    pub key_type: SigningKeyType,
    pub verifying_key: Option<String>,
    pub signing_key: Option<String>,
}

/// Reject encoded keys longer than [`MAX_SIGNING_KEY_LEN`].
pub fn validate_key_len(field: &str, value: Option<&str>) -> Result<(), String> {
    match value {
        Some(v) if v.len() > MAX_SIGNING_KEY_LEN => Err(format!(
            "{field} exceeds {MAX_SIGNING_KEY_LEN} characters"
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_length_limit() {
        assert!(validate_key_len("signing_key", None).is_ok());
        assert!(validate_key_len("signing_key", Some(&"a".repeat(500))).is_ok());
        let err = validate_key_len("signing_key", Some(&"a".repeat(501))).unwrap_err();
        assert!(err.contains("signing_key"));
    }
}
