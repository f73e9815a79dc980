//! SurrealDB implementation of [`CollectionRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use vaultorg_core::error::VaultorgResult;
use vaultorg_core::models::collection::{Collection, CollectionAccess, CreateCollection};
use vaultorg_core::repository::{CollectionRepository, PaginatedResult, Pagination};

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct CollectionRow {
    organization_id: String,
    name: String,
    external_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CollectionRowWithId {
    record_id: String,
    organization_id: String,
    name: String,
    external_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct AccessRow {
    membership_id: String,
    manage: bool,
    read_only: bool,
    hide_passwords: bool,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn row_to_collection(row: CollectionRow, id: Uuid) -> Result<Collection, DbError> {
    Ok(Collection {
        id,
        organization_id: parse_uuid("organization", &row.organization_id)?,
        name: row.name,
        external_id: row.external_id,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl CollectionRowWithId {
    fn try_into_collection(self) -> Result<Collection, DbError> {
        Ok(Collection {
            id: parse_uuid("collection", &self.record_id)?,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            name: self.name,
            external_id: self.external_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl AccessRow {
    fn try_into_access(self) -> Result<CollectionAccess, DbError> {
        Ok(CollectionAccess {
            membership_id: parse_uuid("membership", &self.membership_id)?,
            manage: self.manage,
            read_only: self.read_only,
            hide_passwords: self.hide_passwords,
        })
    }
}

/// SurrealDB implementation of the Collection repository.
#[derive(Clone)]
pub struct SurrealCollectionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCollectionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CollectionRepository for SurrealCollectionRepository<C> {
    async fn create(
        &self,
        input: CreateCollection,
        users: Vec<CollectionAccess>,
    ) -> VaultorgResult<Collection> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let access: Vec<serde_json::Value> = users
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "collection_id": id_str,
                    "membership_id": entry.membership_id.to_string(),
                    "manage": entry.manage,
                    "read_only": entry.read_only,
                    "hide_passwords": entry.hide_passwords,
                })
            })
            .collect();

        let mut statements = vec![
            "BEGIN TRANSACTION;",
            "CREATE type::record('collection', $id) SET \
             organization_id = $organization_id, \
             name = $name, \
             external_id = $external_id;",
        ];
        if !access.is_empty() {
            statements.push("INSERT INTO collection_user $access_rows;");
        }
        statements.push("COMMIT TRANSACTION;");

        self.db
            .query(statements.join("\n"))
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("name", input.name))
            .bind(("external_id", input.external_id))
            .bind(("access_rows", serde_json::Value::Array(access)))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> VaultorgResult<Collection> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('collection', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CollectionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "collection".into(),
            id: id_str,
        })?;

        row_to_collection(row, id).map_err(Into::into)
    }

    async fn get_access(&self, collection_id: Uuid) -> VaultorgResult<Vec<CollectionAccess>> {
        let mut result = self
            .db
            .query(
                "SELECT membership_id, manage, read_only, hide_passwords \
                 FROM collection_user \
                 WHERE collection_id = $collection_id \
                 ORDER BY membership_id ASC",
            )
            .bind(("collection_id", collection_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccessRow> = result.take(0).map_err(DbError::from)?;

        let access = rows
            .into_iter()
            .map(|row| row.try_into_access())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(access)
    }

    async fn list_by_organization(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> VaultorgResult<PaginatedResult<Collection>> {
        let org_id_str = organization_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM collection \
                 WHERE organization_id = $organization_id GROUP ALL",
            )
            .bind(("organization_id", org_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM collection \
                 WHERE organization_id = $organization_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("organization_id", org_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CollectionRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_collection())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
