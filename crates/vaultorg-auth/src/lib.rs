//! vaultorg auth: invitation tokens, sign-up policy evaluation and the
//! pending-organization activation workflow.

pub mod activator;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod feature;
pub mod invite;
pub mod policy;
pub mod service;

pub use config::ActivationConfig;
pub use error::ActivationError;
pub use feature::{FeatureService, StaticFeatureService};
pub use invite::{InviteTokenClaims, InviteTokenFactory};
pub use service::{ActivatePendingOrganization, ActivationOutput, ActivationService};
