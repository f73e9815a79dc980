//! Organization policy domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::membership::{MembershipRole, MembershipStatus};

/// Kind of rule an organization can enforce on its members.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PolicyType {
    TwoFactorAuthentication,
    MasterPassword,
    PasswordGenerator,
    /// Members may not belong to any other organization.
    SingleOrg,
    RequireSso,
    DisableSend,
    ResetPassword,
}

impl PolicyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TwoFactorAuthentication => "TwoFactorAuthentication",
            Self::MasterPassword => "MasterPassword",
            Self::PasswordGenerator => "PasswordGenerator",
            Self::SingleOrg => "SingleOrg",
            Self::RequireSso => "RequireSso",
            Self::DisableSend => "DisableSend",
            Self::ResetPassword => "ResetPassword",
        }
    }
}

/// A policy configured on one organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Policy {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub policy_type: PolicyType,
    pub enabled: bool,
    /// Policy-specific options.
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePolicy {
    pub organization_id: Uuid,
    pub policy_type: PolicyType,
    pub enabled: bool,
    pub data: Option<serde_json::Value>,
}

/// An enabled policy paired with the membership through which it reaches
/// a user.
///
/// Exemptions are not applied yet; that is the job of the policy
/// requirement built from these details.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyDetails {
    pub organization_id: Uuid,
    pub membership_id: Uuid,
    pub policy_type: PolicyType,
    pub role: MembershipRole,
    pub status: MembershipStatus,
}

/// Roles that are never subject to membership policies.
pub const POLICY_EXEMPT_ROLES: [MembershipRole; 2] = [MembershipRole::Owner, MembershipRole::Admin];

/// Statuses whose memberships are not yet (or no longer) bound by policies.
pub const POLICY_EXEMPT_STATUSES: [MembershipStatus; 2] =
    [MembershipStatus::Invited, MembershipStatus::Revoked];

impl PolicyDetails {
    pub fn is_exempt(&self) -> bool {
        POLICY_EXEMPT_ROLES.contains(&self.role) || POLICY_EXEMPT_STATUSES.contains(&self.status)
    }
}
