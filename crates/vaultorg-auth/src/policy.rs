//! Sign-up policy evaluation.
//!
//! Two interchangeable strategies decide whether a user may own a new
//! organization. The legacy strategy asks the store whether any
//! single-organization policy applies; the structured strategy builds a
//! [`SingleOrganizationPolicyRequirement`] from raw policy details. A
//! feature flag, read once per evaluation, picks between them.

use tracing::debug;
use uuid::Uuid;
use vaultorg_core::error::VaultorgResult;
use vaultorg_core::models::policy::{PolicyDetails, PolicyType};
use vaultorg_core::repository::PolicyRepository;

use crate::feature::{FeatureService, POLICY_REQUIREMENTS};

/// How policy applicability is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyEvaluationStrategy {
    LegacyAnyPolicy,
    StructuredRequirement,
}

impl PolicyEvaluationStrategy {
    pub fn from_features<F: FeatureService + ?Sized>(features: &F) -> Self {
        if features.is_enabled(POLICY_REQUIREMENTS) {
            Self::StructuredRequirement
        } else {
            Self::LegacyAnyPolicy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LegacyAnyPolicy => "legacy_any_policy",
            Self::StructuredRequirement => "structured_requirement",
        }
    }
}

/// An aggregated view of every policy of one type reaching a user.
pub trait PolicyRequirement: Sized {
    const POLICY_TYPE: PolicyType;

    /// Build the requirement from unfiltered policy details.
    fn create(details: Vec<PolicyDetails>) -> Self;
}

/// Requirement derived from single-organization policies.
#[derive(Debug, Clone, Default)]
pub struct SingleOrganizationPolicyRequirement {
    details: Vec<PolicyDetails>,
}

impl SingleOrganizationPolicyRequirement {
    /// A user may create an organization unless a single-organization
    /// policy binds them somewhere else.
    pub fn can_create_organization(&self) -> bool {
        self.details.is_empty()
    }

    /// Organizations whose policy binds the user.
    pub fn binding_organizations(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.details.iter().map(|d| d.organization_id)
    }
}

impl PolicyRequirement for SingleOrganizationPolicyRequirement {
    const POLICY_TYPE: PolicyType = PolicyType::SingleOrg;

    fn create(details: Vec<PolicyDetails>) -> Self {
        Self {
            details: details.into_iter().filter(|d| !d.is_exempt()).collect(),
        }
    }
}

/// Loads policy requirements for a user.
pub struct PolicyRequirementQuery<'a, P: PolicyRepository> {
    policy_repo: &'a P,
}

impl<'a, P: PolicyRepository> PolicyRequirementQuery<'a, P> {
    pub fn new(policy_repo: &'a P) -> Self {
        Self { policy_repo }
    }

    pub async fn get<R: PolicyRequirement>(&self, user_id: Uuid) -> VaultorgResult<R> {
        let details = self
            .policy_repo
            .get_policy_details_by_user(user_id, R::POLICY_TYPE)
            .await?;
        Ok(R::create(details))
    }
}

/// Decides whether a user is allowed to take ownership of an organization.
pub struct PolicyRequirementEvaluator<P: PolicyRepository, F: FeatureService> {
    policy_repo: P,
    features: F,
}

impl<P: PolicyRepository, F: FeatureService> PolicyRequirementEvaluator<P, F> {
    pub fn new(policy_repo: P, features: F) -> Self {
        Self {
            policy_repo,
            features,
        }
    }

    /// Evaluate with whichever strategy the feature flag currently selects.
    pub async fn can_activate(&self, owner_user_id: Uuid) -> VaultorgResult<bool> {
        let strategy = PolicyEvaluationStrategy::from_features(&self.features);
        self.evaluate_with(strategy, owner_user_id).await
    }

    pub async fn evaluate_with(
        &self,
        strategy: PolicyEvaluationStrategy,
        owner_user_id: Uuid,
    ) -> VaultorgResult<bool> {
        let allowed = match strategy {
            PolicyEvaluationStrategy::LegacyAnyPolicy => !self
                .policy_repo
                .any_policy_applies(owner_user_id, PolicyType::SingleOrg)
                .await?,
            PolicyEvaluationStrategy::StructuredRequirement => {
                PolicyRequirementQuery::new(&self.policy_repo)
                    .get::<SingleOrganizationPolicyRequirement>(owner_user_id)
                    .await?
                    .can_create_organization()
            }
        };

        debug!(
            user_id = %owner_user_id,
            strategy = strategy.as_str(),
            allowed,
            "Evaluated single-organization policy"
        );

        Ok(allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::StaticFeatureService;
    use vaultorg_core::models::membership::{MembershipRole, MembershipStatus};

    fn details(role: MembershipRole, status: MembershipStatus) -> PolicyDetails {
        PolicyDetails {
            organization_id: Uuid::new_v4(),
            membership_id: Uuid::new_v4(),
            policy_type: PolicyType::SingleOrg,
            role,
            status,
        }
    }

    #[test]
    fn no_policies_allows_creation() {
        let req = SingleOrganizationPolicyRequirement::create(Vec::new());
        assert!(req.can_create_organization());
    }

    #[test]
    fn confirmed_member_is_blocked() {
        let d = details(MembershipRole::User, MembershipStatus::Confirmed);
        let org = d.organization_id;
        let req = SingleOrganizationPolicyRequirement::create(vec![d]);
        assert!(!req.can_create_organization());
        assert_eq!(req.binding_organizations().collect::<Vec<_>>(), vec![org]);
    }

    #[test]
    fn owners_and_admins_are_exempt() {
        let req = SingleOrganizationPolicyRequirement::create(vec![
            details(MembershipRole::Owner, MembershipStatus::Confirmed),
            details(MembershipRole::Admin, MembershipStatus::Accepted),
        ]);
        assert!(req.can_create_organization());
    }

    #[test]
    fn invited_and_revoked_memberships_are_exempt() {
        let req = SingleOrganizationPolicyRequirement::create(vec![
            details(MembershipRole::User, MembershipStatus::Invited),
            details(MembershipRole::Custom, MembershipStatus::Revoked),
        ]);
        assert!(req.can_create_organization());
    }

    #[test]
    fn one_binding_membership_is_enough_to_block() {
        let req = SingleOrganizationPolicyRequirement::create(vec![
            details(MembershipRole::Owner, MembershipStatus::Confirmed),
            details(MembershipRole::Custom, MembershipStatus::Accepted),
        ]);
        assert!(!req.can_create_organization());
    }

    #[test]
    fn flag_selects_strategy() {
        assert_eq!(
            PolicyEvaluationStrategy::from_features(&StaticFeatureService::default()),
            PolicyEvaluationStrategy::LegacyAnyPolicy
        );
        assert_eq!(
            PolicyEvaluationStrategy::from_features(&StaticFeatureService::new([
                POLICY_REQUIREMENTS
            ])),
            PolicyEvaluationStrategy::StructuredRequirement
        );
    }
}
