//! SurrealDB implementation of [`OrganizationRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use vaultorg_core::error::VaultorgResult;
use vaultorg_core::models::organization::{CreateOrganization, Organization, OrganizationStatus};
use vaultorg_core::repository::OrganizationRepository;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    name: String,
    billing_email: String,
    enabled: bool,
    status: String,
    public_key: Option<String>,
    private_key: Option<String>,
    revision: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<OrganizationStatus, DbError> {
    match s {
        "Pending" => Ok(OrganizationStatus::Pending),
        "Created" => Ok(OrganizationStatus::Created),
        "Managed" => Ok(OrganizationStatus::Managed),
        other => Err(DbError::Decode(format!(
            "unknown organization status: {other}"
        ))),
    }
}

impl OrganizationRow {
    fn try_into_organization(self, id: Uuid) -> Result<Organization, DbError> {
        Ok(Organization {
            id,
            name: self.name,
            billing_email: self.billing_email,
            enabled: self.enabled,
            status: parse_status(&self.status)?,
            public_key: self.public_key,
            private_key: self.private_key,
            revision: self.revision,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Organization repository.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn create(&self, input: CreateOrganization) -> VaultorgResult<Organization> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('organization', $id) SET \
                 name = $name, billing_email = $billing_email, \
                 enabled = false, status = $status, revision = 0",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("billing_email", input.billing_email))
            .bind(("status", OrganizationStatus::Pending.as_str()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.try_into_organization(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> VaultorgResult<Organization> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('organization', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.try_into_organization(id)?)
    }

    async fn update(&self, organization: Organization) -> VaultorgResult<Organization> {
        let id = organization.id;
        let id_str = id.to_string();

        // Compare-and-set on `revision`. A stale snapshot matches no rows; a
        // write that races another commit is aborted by the engine. Both
        // come back as `Conflict`.
        let result = self
            .db
            .query(
                "UPDATE type::record('organization', $id) SET \
                 name = $name, \
                 billing_email = $billing_email, \
                 enabled = $enabled, \
                 status = $status, \
                 public_key = $public_key, \
                 private_key = $private_key, \
                 revision = revision + 1, \
                 updated_at = time::now() \
                 WHERE revision = $revision",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", organization.name))
            .bind(("billing_email", organization.billing_email))
            .bind(("enabled", organization.enabled))
            .bind(("status", organization.status.as_str()))
            .bind(("public_key", organization.public_key))
            .bind(("private_key", organization.private_key))
            .bind(("revision", organization.revision))
            .await
            .map_err(|e| DbError::from_write(e, "organization", &id_str))?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_write(e, "organization", &id_str))?;

        let rows: Vec<OrganizationRow> = result
            .take(0)
            .map_err(|e| DbError::from_write(e, "organization", &id_str))?;
        match rows.into_iter().next() {
            Some(row) => Ok(row.try_into_organization(id)?),
            None => {
                // Distinguish a missing record from a lost race.
                self.get_by_id(id).await?;
                Err(DbError::Conflict {
                    entity: "organization".into(),
                    id: id_str,
                }
                .into())
            }
        }
    }
}
