//! SurrealDB implementation of [`SigningKeyRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use vaultorg_core::error::{VaultorgError, VaultorgResult};
use vaultorg_core::models::signing_key::{
    CreateSigningKeys, SigningKeyType, UserSigningKeys, validate_key_len,
};
use vaultorg_core::repository::SigningKeyRepository;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct SigningKeysRow {
    user_id: String,
    key_type: String,
    verifying_key: Option<String>,
    signing_key: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct SigningKeysRowWithId {
    record_id: String,
    user_id: String,
    key_type: String,
    verifying_key: Option<String>,
    signing_key: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_key_type(s: &str) -> Result<SigningKeyType, DbError> {
    match s {
        "Ed25519" => Ok(SigningKeyType::Ed25519),
        other => Err(DbError::Decode(format!("unknown signing key type: {other}"))),
    }
}

fn row_to_keys(row: SigningKeysRow, id: Uuid) -> Result<UserSigningKeys, DbError> {
    Ok(UserSigningKeys {
        id,
        user_id: parse_uuid("user", &row.user_id)?,
        key_type: parse_key_type(&row.key_type)?,
        verifying_key: row.verifying_key,
        signing_key: row.signing_key,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl SigningKeysRowWithId {
    fn try_into_keys(self) -> Result<UserSigningKeys, DbError> {
        let id = parse_uuid("signing key", &self.record_id)?;
        row_to_keys(
            SigningKeysRow {
                user_id: self.user_id,
                key_type: self.key_type,
                verifying_key: self.verifying_key,
                signing_key: self.signing_key,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            id,
        )
    }
}

fn validate_keys(verifying_key: Option<&str>, signing_key: Option<&str>) -> VaultorgResult<()> {
    validate_key_len("verifying_key", verifying_key)
        .and_then(|()| validate_key_len("signing_key", signing_key))
        .map_err(|message| VaultorgError::Validation { message })
}

/// SurrealDB implementation of the signing key repository.
#[derive(Clone)]
pub struct SurrealSigningKeyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSigningKeyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SigningKeyRepository for SurrealSigningKeyRepository<C> {
    async fn create(&self, input: CreateSigningKeys) -> VaultorgResult<UserSigningKeys> {
        validate_keys(input.verifying_key.as_deref(), input.signing_key.as_deref())?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user_signing_keys', $id) SET \
                 user_id = $user_id, \
                 key_type = $key_type, \
                 verifying_key = $verifying_key, \
                 signing_key = $signing_key",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("key_type", input.key_type.as_str()))
            .bind(("verifying_key", input.verifying_key))
            .bind(("signing_key", input.signing_key))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<SigningKeysRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user_signing_keys".into(),
            id: id_str,
        })?;

        row_to_keys(row, id).map_err(Into::into)
    }

    async fn get_by_user_id(&self, user_id: Uuid) -> VaultorgResult<UserSigningKeys> {
        let user_id_str = user_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user_signing_keys \
                 WHERE user_id = $user_id",
            )
            .bind(("user_id", user_id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SigningKeysRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user_signing_keys".into(),
            id: format!("user_id={user_id_str}"),
        })?;

        row.try_into_keys().map_err(Into::into)
    }

    async fn rotate(
        &self,
        id: Uuid,
        verifying_key: Option<String>,
        signing_key: Option<String>,
    ) -> VaultorgResult<UserSigningKeys> {
        validate_keys(verifying_key.as_deref(), signing_key.as_deref())?;

        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('user_signing_keys', $id) SET \
                 verifying_key = $verifying_key, \
                 signing_key = $signing_key, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("verifying_key", verifying_key))
            .bind(("signing_key", signing_key))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<SigningKeysRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user_signing_keys".into(),
            id: id_str,
        })?;

        row_to_keys(row, id).map_err(Into::into)
    }
}
