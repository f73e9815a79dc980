//! Pending organization activation: the owner's confirmation flow.

use tracing::{info, warn};
use uuid::Uuid;
use vaultorg_core::error::VaultorgError;
use vaultorg_core::models::collection::Collection;
use vaultorg_core::models::organization::Organization;
use vaultorg_core::models::user::User;
use vaultorg_core::repository::{
    CollectionRepository, MembershipRepository, OrganizationRepository, PolicyRepository,
};

use crate::activator::{OrganizationActivator, OrganizationKeys};
use crate::bootstrap::CollectionBootstrapper;
use crate::error::ActivationError;
use crate::feature::FeatureService;
use crate::invite::{InviteTokenFactory, validate_invite_token};
use crate::policy::PolicyRequirementEvaluator;

/// Input for the activation flow.
#[derive(Debug, Clone)]
pub struct ActivatePendingOrganization {
    pub organization_id: Uuid,
    /// The pending owner membership the invitation was issued for.
    pub membership_id: Uuid,
    pub public_key: String,
    pub private_key: String,
    /// Name of the collection to create for the owner; blank means none.
    pub default_collection_name: Option<String>,
    /// Invite token from the invitation email.
    pub email_token: String,
}

/// Successful activation result.
#[derive(Debug)]
pub struct ActivationOutput {
    /// The organization as persisted, now enabled.
    pub organization: Organization,
    pub default_collection: Option<Collection>,
}

/// Activation service.
///
/// Generic over repository implementations so that the workflow has no
/// dependency on the database crate.
pub struct ActivationService<O, M, C, P, F>
where
    O: OrganizationRepository,
    M: MembershipRepository,
    C: CollectionRepository,
    P: PolicyRepository,
    F: FeatureService,
{
    org_repo: O,
    membership_repo: M,
    collection_repo: C,
    policy: PolicyRequirementEvaluator<P, F>,
    tokens: InviteTokenFactory,
}

impl<O, M, C, P, F> ActivationService<O, M, C, P, F>
where
    O: OrganizationRepository,
    M: MembershipRepository,
    C: CollectionRepository,
    P: PolicyRepository,
    F: FeatureService,
{
    pub fn new(
        org_repo: O,
        membership_repo: M,
        collection_repo: C,
        policy_repo: P,
        features: F,
        tokens: InviteTokenFactory,
    ) -> Self {
        Self {
            org_repo,
            membership_repo,
            collection_repo,
            policy: PolicyRequirementEvaluator::new(policy_repo, features),
            tokens,
        }
    }

    /// Activate a pending organization on behalf of its invited owner.
    ///
    /// Stops at the first failure. Everything up to and including the
    /// organization write is all-or-nothing; a failure creating the
    /// default collection afterwards is reported as
    /// [`ActivationError::BootstrapFailure`] with the organization
    /// already active.
    pub async fn activate_pending_organization(
        &self,
        user: &User,
        input: ActivatePendingOrganization,
    ) -> Result<ActivationOutput, ActivationError> {
        // 1. Sign-up policy.
        if !self.policy.can_activate(user.id).await? {
            warn!(
                user_id = %user.id,
                organization_id = %input.organization_id,
                "Activation blocked by single-organization policy"
            );
            return Err(ActivationError::PolicyForbidden);
        }

        // 2. Pending membership.
        let membership = match self.membership_repo.get_by_id(input.membership_id).await {
            Ok(m) => m,
            Err(VaultorgError::NotFound { .. }) => {
                return Err(ActivationError::MembershipNotFound);
            }
            Err(e) => return Err(e.into()),
        };
        if membership.organization_id != input.organization_id {
            return Err(ActivationError::MembershipNotFound);
        }

        // 3. Invite token.
        if !validate_invite_token(&self.tokens, &input.email_token, &membership, user) {
            warn!(
                user_id = %user.id,
                membership_id = %membership.id,
                "Activation attempted with an invalid invite token"
            );
            return Err(ActivationError::TokenInvalid);
        }

        // 4 + 5. Preconditions and conditional write.
        let organization = OrganizationActivator::new(&self.org_repo)
            .activate(
                input.organization_id,
                OrganizationKeys {
                    public_key: input.public_key,
                    private_key: input.private_key,
                },
            )
            .await?;

        info!(
            organization_id = %organization.id,
            user_id = %user.id,
            membership_id = %membership.id,
            "Pending organization initialized"
        );

        // 6. Default collection.
        let default_collection = match input.default_collection_name.as_deref() {
            Some(name) => {
                CollectionBootstrapper::new(&self.collection_repo)
                    .maybe_create_default_collection(&organization, membership.id, name)
                    .await?
            }
            None => None,
        };

        Ok(ActivationOutput {
            organization,
            default_collection,
        })
    }
}
