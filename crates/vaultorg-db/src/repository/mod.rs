//! SurrealDB repository implementations.

mod collection;
mod membership;
mod organization;
mod policy;
mod signing_key;

pub use collection::SurrealCollectionRepository;
pub use membership::SurrealMembershipRepository;
pub use organization::SurrealOrganizationRepository;
pub use policy::SurrealPolicyRepository;
pub use signing_key::SurrealSigningKeyRepository;
