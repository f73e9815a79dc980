//! Organization domain model.
//!
//! Organizations are the tenant accounts of vaultorg. They are created
//! elsewhere in a disabled `Pending` state and become usable exactly once,
//! when their owner confirms the invitation and installs the
//! organization keypair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of an organization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrganizationStatus {
    /// Provisioned but not yet claimed by its owner.
    Pending,
    /// Activated by its owner.
    Created,
    /// Administered by a provider on behalf of the owner.
    Managed,
}

impl OrganizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Created => "Created",
            Self::Managed => "Managed",
        }
    }
}

/// A tenant account.
///
/// `enabled == true` implies `status == Created` and both keys set.
/// `revision` is bumped by every persisted write and keys the
/// conditional update in [`OrganizationRepository::update`].
///
/// [`OrganizationRepository::update`]: crate::repository::OrganizationRepository::update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Organization {
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    pub billing_email: String,
    pub enabled: bool,
    pub status: OrganizationStatus,
    /// Organization public key (base64 SPKI).
    pub public_key: Option<String>,
    /// Organization private key, encrypted client-side.
    pub private_key: Option<String>,
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn has_public_key(&self) -> bool {
        self.public_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Fields required to provision a new organization.
///
/// New organizations always start disabled, `Pending`, and without keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub billing_email: String,
}
