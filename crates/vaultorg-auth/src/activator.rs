//! Pending → Created organization transition.
//!
//! The four preconditions are checked on a snapshot before anything is
//! written. The write itself is conditional on the snapshot's revision,
//! so of two racing activations at most one lands; the loser re-reads the
//! organization and reports whichever precondition now fails.

use tracing::info;
use uuid::Uuid;
use vaultorg_core::error::VaultorgError;
use vaultorg_core::models::organization::{Organization, OrganizationStatus};
use vaultorg_core::repository::OrganizationRepository;

use crate::error::ActivationError;

/// Keypair installed on an organization at activation.
#[derive(Debug, Clone)]
pub struct OrganizationKeys {
    pub public_key: String,
    /// Private key, already encrypted by the client.
    pub private_key: String,
}

/// Verify that `org` may be activated.
///
/// Checks run in a fixed order and the first failure wins.
pub fn check_preconditions(org: &Organization) -> Result<(), ActivationError> {
    if org.enabled {
        return Err(ActivationError::AlreadyEnabled);
    }
    if org.status != OrganizationStatus::Pending {
        return Err(ActivationError::NotPending);
    }
    if org.has_public_key() {
        return Err(ActivationError::PublicKeyAlreadySet);
    }
    if org.has_private_key() {
        return Err(ActivationError::PrivateKeyAlreadySet);
    }
    Ok(())
}

/// Compute the activated form of `org` without touching the original.
pub fn apply_activation(
    org: &Organization,
    keys: &OrganizationKeys,
) -> Result<Organization, ActivationError> {
    check_preconditions(org)?;

    if keys.public_key.trim().is_empty() || keys.private_key.trim().is_empty() {
        return Err(ActivationError::MissingKeyMaterial);
    }

    Ok(Organization {
        enabled: true,
        status: OrganizationStatus::Created,
        public_key: Some(keys.public_key.clone()),
        private_key: Some(keys.private_key.clone()),
        ..org.clone()
    })
}

/// Runs the activation transition against an organization store.
pub struct OrganizationActivator<'a, O: OrganizationRepository> {
    org_repo: &'a O,
}

impl<'a, O: OrganizationRepository> OrganizationActivator<'a, O> {
    pub fn new(org_repo: &'a O) -> Self {
        Self { org_repo }
    }

    pub async fn activate(
        &self,
        organization_id: Uuid,
        keys: OrganizationKeys,
    ) -> Result<Organization, ActivationError> {
        let org = self.org_repo.get_by_id(organization_id).await?;
        let activated = apply_activation(&org, &keys)?;

        match self.org_repo.update(activated).await {
            Ok(saved) => {
                info!(
                    organization_id = %saved.id,
                    revision = saved.revision,
                    "Organization activated"
                );
                Ok(saved)
            }
            Err(VaultorgError::Conflict { .. }) => {
                // Someone else wrote first; report what they left behind.
                let current = self.org_repo.get_by_id(organization_id).await?;
                check_preconditions(&current)?;
                Err(ActivationError::ConcurrentConflict)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn pending() -> Organization {
        Organization {
            id: Uuid::new_v4(),
            name: "Acme".into(),
            billing_email: "billing@acme.test".into(),
            enabled: false,
            status: OrganizationStatus::Pending,
            public_key: None,
            private_key: None,
            revision: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn keys() -> OrganizationKeys {
        OrganizationKeys {
            public_key: "pub".into(),
            private_key: "priv".into(),
        }
    }

    #[test]
    fn pending_org_activates() {
        let org = pending();
        let activated = apply_activation(&org, &keys()).unwrap();

        assert!(activated.enabled);
        assert_eq!(activated.status, OrganizationStatus::Created);
        assert_eq!(activated.public_key.as_deref(), Some("pub"));
        assert_eq!(activated.private_key.as_deref(), Some("priv"));
        assert_eq!(activated.revision, org.revision);
        assert_eq!(activated.id, org.id);
    }

    #[test]
    fn empty_keys_count_as_unset() {
        let org = Organization {
            public_key: Some(String::new()),
            private_key: Some(String::new()),
            ..pending()
        };
        assert!(check_preconditions(&org).is_ok());
    }

    #[test]
    fn enabled_org_is_rejected_first() {
        let org = Organization {
            enabled: true,
            status: OrganizationStatus::Created,
            public_key: Some("k".into()),
            ..pending()
        };
        assert!(matches!(
            check_preconditions(&org),
            Err(ActivationError::AlreadyEnabled)
        ));
    }

    #[test]
    fn non_pending_org_is_rejected() {
        let org = Organization {
            status: OrganizationStatus::Created,
            ..pending()
        };
        assert!(matches!(
            check_preconditions(&org),
            Err(ActivationError::NotPending)
        ));
    }

    #[test]
    fn existing_public_key_is_rejected() {
        let org = Organization {
            public_key: Some("existing".into()),
            private_key: Some("existing".into()),
            ..pending()
        };
        assert!(matches!(
            apply_activation(&org, &keys()),
            Err(ActivationError::PublicKeyAlreadySet)
        ));
    }

    #[test]
    fn existing_private_key_is_rejected() {
        let org = Organization {
            private_key: Some("existing".into()),
            ..pending()
        };
        assert!(matches!(
            apply_activation(&org, &keys()),
            Err(ActivationError::PrivateKeyAlreadySet)
        ));
    }

    #[test]
    fn blank_submitted_keys_are_rejected() {
        let blank_public = OrganizationKeys {
            public_key: "  ".into(),
            private_key: "priv".into(),
        };
        assert!(matches!(
            apply_activation(&pending(), &blank_public),
            Err(ActivationError::MissingKeyMaterial)
        ));

        let blank_private = OrganizationKeys {
            public_key: "pub".into(),
            private_key: String::new(),
        };
        assert!(matches!(
            apply_activation(&pending(), &blank_private),
            Err(ActivationError::MissingKeyMaterial)
        ));
    }
}
