//! SurrealDB implementation of [`PolicyRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use vaultorg_core::error::VaultorgResult;
use vaultorg_core::models::policy::{
    CreatePolicy, POLICY_EXEMPT_ROLES, POLICY_EXEMPT_STATUSES, Policy, PolicyDetails, PolicyType,
};
use vaultorg_core::repository::PolicyRepository;

use crate::error::{DbError, parse_uuid};
use crate::repository::membership::{parse_role, parse_status};

#[derive(Debug, SurrealValue)]
struct PolicyRow {
    organization_id: String,
    policy_type: String,
    enabled: bool,
    data: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// A membership row joined against the policies of its organization.
#[derive(Debug, SurrealValue)]
struct PolicyDetailsRow {
    record_id: String,
    organization_id: String,
    role: String,
    status: String,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_policy_type(s: &str) -> Result<PolicyType, DbError> {
    match s {
        "TwoFactorAuthentication" => Ok(PolicyType::TwoFactorAuthentication),
        "MasterPassword" => Ok(PolicyType::MasterPassword),
        "PasswordGenerator" => Ok(PolicyType::PasswordGenerator),
        "SingleOrg" => Ok(PolicyType::SingleOrg),
        "RequireSso" => Ok(PolicyType::RequireSso),
        "DisableSend" => Ok(PolicyType::DisableSend),
        "ResetPassword" => Ok(PolicyType::ResetPassword),
        other => Err(DbError::Decode(format!("unknown policy type: {other}"))),
    }
}

/// Render static enum names as a SurrealQL array literal.
fn string_array<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = values.into_iter().map(|v| format!("'{v}'")).collect();
    format!("[{}]", quoted.join(", "))
}

impl PolicyRow {
    fn try_into_policy(self, id: Uuid) -> Result<Policy, DbError> {
        Ok(Policy {
            id,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            policy_type: parse_policy_type(&self.policy_type)?,
            enabled: self.enabled,
            data: self.data,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl PolicyDetailsRow {
    fn try_into_details(self, policy_type: PolicyType) -> Result<PolicyDetails, DbError> {
        Ok(PolicyDetails {
            organization_id: parse_uuid("organization", &self.organization_id)?,
            membership_id: parse_uuid("membership", &self.record_id)?,
            policy_type,
            role: parse_role(&self.role)?,
            status: parse_status(&self.status)?,
        })
    }
}

/// SurrealDB implementation of the Policy repository.
#[derive(Clone)]
pub struct SurrealPolicyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPolicyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PolicyRepository for SurrealPolicyRepository<C> {
    async fn create(&self, input: CreatePolicy) -> VaultorgResult<Policy> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let data = input
            .data
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let result = self
            .db
            .query(
                "CREATE type::record('policy', $id) SET \
                 organization_id = $organization_id, \
                 policy_type = $policy_type, \
                 enabled = $enabled, \
                 data = $data",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("policy_type", input.policy_type.as_str()))
            .bind(("enabled", input.enabled))
            .bind(("data", data))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<PolicyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "policy".into(),
            id: id_str,
        })?;

        Ok(row.try_into_policy(id)?)
    }

    async fn any_policy_applies(&self, user_id: Uuid, policy_type: PolicyType) -> VaultorgResult<bool> {
        let query = format!(
            "SELECT count() AS total FROM policy \
             WHERE policy_type = $policy_type AND enabled = true \
             AND organization_id IN (\
                 SELECT VALUE organization_id FROM membership \
                 WHERE user_id = $user_id \
                 AND role NOTINSIDE {roles} \
                 AND status NOTINSIDE {statuses}\
             ) GROUP ALL",
            roles = string_array(POLICY_EXEMPT_ROLES.iter().map(|r| r.as_str())),
            statuses = string_array(POLICY_EXEMPT_STATUSES.iter().map(|s| s.as_str())),
        );

        let mut result = self
            .db
            .query(query)
            .bind(("policy_type", policy_type.as_str()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(count_rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }

    async fn get_policy_details_by_user(
        &self,
        user_id: Uuid,
        policy_type: PolicyType,
    ) -> VaultorgResult<Vec<PolicyDetails>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, organization_id, role, status \
                 FROM membership \
                 WHERE user_id = $user_id \
                 AND organization_id IN (\
                     SELECT VALUE organization_id FROM policy \
                     WHERE policy_type = $policy_type AND enabled = true\
                 )",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("policy_type", policy_type.as_str()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PolicyDetailsRow> = result.take(0).map_err(DbError::from)?;

        let details = rows
            .into_iter()
            .map(|row| row.try_into_details(policy_type))
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_array_quotes_each_value() {
        assert_eq!(string_array(["Owner", "Admin"]), "['Owner', 'Admin']");
        assert_eq!(string_array(Vec::<&str>::new()), "[]");
    }

    #[test]
    fn policy_type_names_round_trip() {
        for t in [
            PolicyType::TwoFactorAuthentication,
            PolicyType::MasterPassword,
            PolicyType::PasswordGenerator,
            PolicyType::SingleOrg,
            PolicyType::RequireSso,
            PolicyType::DisableSend,
            PolicyType::ResetPassword,
        ] {
            assert_eq!(parse_policy_type(t.as_str()).unwrap(), t);
        }
        assert!(parse_policy_type("Nope").is_err());
    }
}
