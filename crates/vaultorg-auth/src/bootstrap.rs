//! Default collection for a freshly activated organization.

use tracing::{info, warn};
use uuid::Uuid;
use vaultorg_core::models::collection::{Collection, CollectionAccess, CreateCollection};
use vaultorg_core::models::organization::Organization;
use vaultorg_core::repository::CollectionRepository;

use crate::error::ActivationError;

pub struct CollectionBootstrapper<'a, C: CollectionRepository> {
    collection_repo: &'a C,
}

impl<'a, C: CollectionRepository> CollectionBootstrapper<'a, C> {
    pub fn new(collection_repo: &'a C) -> Self {
        Self { collection_repo }
    }

    /// Create the organization's first collection, giving the owner full
    /// manage rights over it.
    ///
    /// Does nothing when `name` is blank. Any store failure is reported
    /// as [`ActivationError::BootstrapFailure`].
    pub async fn maybe_create_default_collection(
        &self,
        org: &Organization,
        owner_membership_id: Uuid,
        name: &str,
    ) -> Result<Option<Collection>, ActivationError> {
        if name.trim().is_empty() {
            return Ok(None);
        }

        let input = CreateCollection {
            organization_id: org.id,
            name: name.to_string(),
            external_id: None,
        };
        let owner_access = vec![CollectionAccess::full_manage(owner_membership_id)];

        match self.collection_repo.create(input, owner_access).await {
            Ok(collection) => {
                info!(
                    organization_id = %org.id,
                    collection_id = %collection.id,
                    "Default collection created"
                );
                Ok(Some(collection))
            }
            Err(e) => {
                warn!(
                    organization_id = %org.id,
                    membership_id = %owner_membership_id,
                    error = %e,
                    "Organization activated without its default collection"
                );
                Err(ActivationError::BootstrapFailure {
                    organization_id: org.id,
                    reason: e.to_string(),
                })
            }
        }
    }
}
