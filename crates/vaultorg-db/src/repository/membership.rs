//! SurrealDB implementation of [`MembershipRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use vaultorg_core::error::VaultorgResult;
use vaultorg_core::models::membership::{
    CreateMembership, Membership, MembershipRole, MembershipStatus,
};
use vaultorg_core::repository::MembershipRepository;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct MembershipRow {
    organization_id: String,
    user_id: Option<String>,
    email: String,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub(crate) fn parse_role(s: &str) -> Result<MembershipRole, DbError> {
    match s {
        "Owner" => Ok(MembershipRole::Owner),
        "Admin" => Ok(MembershipRole::Admin),
        "User" => Ok(MembershipRole::User),
        "Custom" => Ok(MembershipRole::Custom),
        other => Err(DbError::Decode(format!("unknown membership role: {other}"))),
    }
}

pub(crate) fn parse_status(s: &str) -> Result<MembershipStatus, DbError> {
    match s {
        "Revoked" => Ok(MembershipStatus::Revoked),
        "Invited" => Ok(MembershipStatus::Invited),
        "Accepted" => Ok(MembershipStatus::Accepted),
        "Confirmed" => Ok(MembershipStatus::Confirmed),
        other => Err(DbError::Decode(format!(
            "unknown membership status: {other}"
        ))),
    }
}

impl MembershipRow {
    fn try_into_membership(self, id: Uuid) -> Result<Membership, DbError> {
        let user_id = self
            .user_id
            .as_deref()
            .map(|u| parse_uuid("user", u))
            .transpose()?;
        Ok(Membership {
            id,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            user_id,
            email: self.email,
            role: parse_role(&self.role)?,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Membership repository.
#[derive(Clone)]
pub struct SurrealMembershipRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMembershipRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> MembershipRepository for SurrealMembershipRepository<C> {
    async fn create(&self, input: CreateMembership) -> VaultorgResult<Membership> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('membership', $id) SET \
                 organization_id = $organization_id, \
                 user_id = $user_id, \
                 email = $email, \
                 role = $role, \
                 status = $status",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("user_id", input.user_id.map(|u| u.to_string())))
            .bind(("email", input.email))
            .bind(("role", input.role.as_str()))
            .bind(("status", input.status.as_str()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "membership".into(),
            id: id_str,
        })?;

        Ok(row.try_into_membership(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> VaultorgResult<Membership> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('membership', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "membership".into(),
            id: id_str,
        })?;

        Ok(row.try_into_membership(id)?)
    }
}
