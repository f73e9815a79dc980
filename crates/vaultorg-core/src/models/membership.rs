//! Organization membership domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role a member holds inside an organization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MembershipRole {
    Owner,
    Admin,
    User,
    Custom,
}

impl MembershipRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::Admin => "Admin",
            Self::User => "User",
            Self::Custom => "Custom",
        }
    }
}

/// Progress of a membership through the invitation flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MembershipStatus {
    Revoked,
    Invited,
    Accepted,
    Confirmed,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revoked => "Revoked",
            Self::Invited => "Invited",
            Self::Accepted => "Accepted",
            Self::Confirmed => "Confirmed",
        }
    }
}

/// Link between a user (or an invited email address) and an organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Membership {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// `None` while the invitation has not been accepted by an account.
    pub user_id: Option<Uuid>,
    /// Address the invitation was sent to.
    pub email: String,
    pub role: MembershipRole,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    pub organization_id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: String,
    pub role: MembershipRole,
    pub status: MembershipStatus,
}
