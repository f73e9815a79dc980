//! Integration tests for the policy repository using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;
use vaultorg_core::models::membership::{CreateMembership, MembershipRole, MembershipStatus};
use vaultorg_core::models::policy::{CreatePolicy, PolicyType};
use vaultorg_core::repository::{MembershipRepository, PolicyRepository};
use vaultorg_db::repository::{SurrealMembershipRepository, SurrealPolicyRepository};

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    vaultorg_db::run_migrations(&db).await.unwrap();
    db
}

async fn join(
    db: &Surreal<Db>,
    org_id: Uuid,
    user_id: Uuid,
    role: MembershipRole,
    status: MembershipStatus,
) -> Uuid {
    SurrealMembershipRepository::new(db.clone())
        .create(CreateMembership {
            organization_id: org_id,
            user_id: Some(user_id),
            email: "member@example.com".into(),
            role,
            status,
        })
        .await
        .unwrap()
        .id
}

async fn enforce(db: &Surreal<Db>, org_id: Uuid, policy_type: PolicyType, enabled: bool) {
    SurrealPolicyRepository::new(db.clone())
        .create(CreatePolicy {
            organization_id: org_id,
            policy_type,
            enabled,
            data: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn create_policy_defaults_data_to_empty_object() {
    let db = setup().await;
    let repo = SurrealPolicyRepository::new(db);
    let org_id = Uuid::new_v4();

    let policy = repo
        .create(CreatePolicy {
            organization_id: org_id,
            policy_type: PolicyType::SingleOrg,
            enabled: true,
            data: None,
        })
        .await
        .unwrap();

    assert_eq!(policy.organization_id, org_id);
    assert_eq!(policy.policy_type, PolicyType::SingleOrg);
    assert!(policy.enabled);
    assert_eq!(policy.data, serde_json::json!({}));
}

#[tokio::test]
async fn user_without_memberships_is_unaffected() {
    let db = setup().await;
    let repo = SurrealPolicyRepository::new(db);
    let user = Uuid::new_v4();

    assert!(!repo.any_policy_applies(user, PolicyType::SingleOrg).await.unwrap());
    assert!(
        repo.get_policy_details_by_user(user, PolicyType::SingleOrg)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn confirmed_member_of_single_org_is_bound() {
    let db = setup().await;
    let repo = SurrealPolicyRepository::new(db.clone());
    let user = Uuid::new_v4();
    let org = Uuid::new_v4();

    let membership = join(&db, org, user, MembershipRole::User, MembershipStatus::Confirmed).await;
    enforce(&db, org, PolicyType::SingleOrg, true).await;

    assert!(repo.any_policy_applies(user, PolicyType::SingleOrg).await.unwrap());

    let details = repo
        .get_policy_details_by_user(user, PolicyType::SingleOrg)
        .await
        .unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].organization_id, org);
    assert_eq!(details[0].membership_id, membership);
    assert_eq!(details[0].role, MembershipRole::User);
    assert_eq!(details[0].status, MembershipStatus::Confirmed);
}

#[tokio::test]
async fn disabled_or_other_policies_do_not_apply() {
    let db = setup().await;
    let repo = SurrealPolicyRepository::new(db.clone());
    let user = Uuid::new_v4();
    let disabled_org = Uuid::new_v4();
    let other_policy_org = Uuid::new_v4();

    join(&db, disabled_org, user, MembershipRole::User, MembershipStatus::Confirmed).await;
    enforce(&db, disabled_org, PolicyType::SingleOrg, false).await;
    join(&db, other_policy_org, user, MembershipRole::User, MembershipStatus::Confirmed).await;
    enforce(&db, other_policy_org, PolicyType::TwoFactorAuthentication, true).await;

    assert!(!repo.any_policy_applies(user, PolicyType::SingleOrg).await.unwrap());
    assert!(
        repo.get_policy_details_by_user(user, PolicyType::SingleOrg)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        repo.any_policy_applies(user, PolicyType::TwoFactorAuthentication)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn exempt_memberships_are_filtered_by_legacy_query_only() {
    let db = setup().await;
    let repo = SurrealPolicyRepository::new(db.clone());
    let user = Uuid::new_v4();

    for (role, status) in [
        (MembershipRole::Owner, MembershipStatus::Confirmed),
        (MembershipRole::Admin, MembershipStatus::Accepted),
        (MembershipRole::User, MembershipStatus::Invited),
        (MembershipRole::Custom, MembershipStatus::Revoked),
    ] {
        let org = Uuid::new_v4();
        join(&db, org, user, role, status).await;
        enforce(&db, org, PolicyType::SingleOrg, true).await;
    }

    assert!(!repo.any_policy_applies(user, PolicyType::SingleOrg).await.unwrap());

    // Details are returned raw; exemption is applied by the requirement.
    let details = repo
        .get_policy_details_by_user(user, PolicyType::SingleOrg)
        .await
        .unwrap();
    assert_eq!(details.len(), 4);
    assert!(details.iter().all(|d| d.is_exempt()));
}

#[tokio::test]
async fn other_users_memberships_are_ignored() {
    let db = setup().await;
    let repo = SurrealPolicyRepository::new(db.clone());
    let org = Uuid::new_v4();

    join(&db, org, Uuid::new_v4(), MembershipRole::User, MembershipStatus::Confirmed).await;
    enforce(&db, org, PolicyType::SingleOrg, true).await;

    assert!(
        !repo
            .any_policy_applies(Uuid::new_v4(), PolicyType::SingleOrg)
            .await
            .unwrap()
    );
}
