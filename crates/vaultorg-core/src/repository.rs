//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations live in
//! `vaultorg-db`; workflows are generic over these traits so they can run
//! against any store.

use uuid::Uuid;

use crate::error::VaultorgResult;
use crate::models::{
    collection::{Collection, CollectionAccess, CreateCollection},
    membership::{CreateMembership, Membership},
    organization::{CreateOrganization, Organization},
    policy::{CreatePolicy, Policy, PolicyDetails, PolicyType},
    signing_key::{CreateSigningKeys, UserSigningKeys},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Organizations
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = VaultorgResult<Organization>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = VaultorgResult<Organization>> + Send;
    /// Persist every mutable field of `organization`.
    ///
    /// The write only applies if the stored revision still equals
    /// `organization.revision`; otherwise [`VaultorgError::Conflict`] is
    /// returned and nothing changes. The returned organization carries
    /// the bumped revision.
    ///
    /// [`VaultorgError::Conflict`]: crate::error::VaultorgError::Conflict
    fn update(
        &self,
        organization: Organization,
    ) -> impl Future<Output = VaultorgResult<Organization>> + Send;
}

// ---------------------------------------------------------------------------
// Memberships
// ---------------------------------------------------------------------------

pub trait MembershipRepository: Send + Sync {
    fn create(
        &self,
        input: CreateMembership,
    ) -> impl Future<Output = VaultorgResult<Membership>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = VaultorgResult<Membership>> + Send;
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

pub trait CollectionRepository: Send + Sync {
    /// Create a collection together with its user access entries.
    ///
    /// Both writes commit or neither does.
    fn create(
        &self,
        input: CreateCollection,
        users: Vec<CollectionAccess>,
    ) -> impl Future<Output = VaultorgResult<Collection>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = VaultorgResult<Collection>> + Send;
    fn get_access(
        &self,
        collection_id: Uuid,
    ) -> impl Future<Output = VaultorgResult<Vec<CollectionAccess>>> + Send;
    fn list_by_organization(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = VaultorgResult<PaginatedResult<Collection>>> + Send;
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

pub trait PolicyRepository: Send + Sync {
    fn create(&self, input: CreatePolicy) -> impl Future<Output = VaultorgResult<Policy>> + Send;

    /// Whether any enabled policy of `policy_type` binds the user through
    /// a non-exempt membership.
    fn any_policy_applies(
        &self,
        user_id: Uuid,
        policy_type: PolicyType,
    ) -> impl Future<Output = VaultorgResult<bool>> + Send;

    /// Every enabled policy of `policy_type` reaching the user, one entry
    /// per membership, exemptions not applied.
    fn get_policy_details_by_user(
        &self,
        user_id: Uuid,
        policy_type: PolicyType,
    ) -> impl Future<Output = VaultorgResult<Vec<PolicyDetails>>> + Send;
}

// ---------------------------------------------------------------------------
// Signing keys
// ---------------------------------------------------------------------------

pub trait SigningKeyRepository: Send + Sync {
    fn create(
        &self,
        input: CreateSigningKeys,
    ) -> impl Future<Output = VaultorgResult<UserSigningKeys>> + Send;
    fn get_by_user_id(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = VaultorgResult<UserSigningKeys>> + Send;
    /// Replace the key pair. Only the keys and `updated_at` change.
    fn rotate(
        &self,
        id: Uuid,
        verifying_key: Option<String>,
        signing_key: Option<String>,
    ) -> impl Future<Output = VaultorgResult<UserSigningKeys>> + Send;
}
