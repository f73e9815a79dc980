//! Collection domain model.
//!
//! A collection is a named, access-controlled grouping of shared items
//! inside an organization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Collection {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// Collection name (client-encrypted).
    pub name: String,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCollection {
    pub organization_id: Uuid,
    pub name: String,
    pub external_id: Option<String>,
}

/// One access-control entry granting a membership rights on a collection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionAccess {
    pub membership_id: Uuid,
    pub manage: bool,
    pub read_only: bool,
    pub hide_passwords: bool,
}

impl CollectionAccess {
    /// Unrestricted access including the right to manage the collection.
    pub fn full_manage(membership_id: Uuid) -> Self {
        Self {
            membership_id,
            manage: true,
            read_only: false,
            hide_passwords: false,
        }
    }
}
