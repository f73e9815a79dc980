//! Activation error taxonomy.
//!
//! Every variant except [`ActivationError::ConcurrentConflict`] is
//! terminal for the request. [`ActivationError::BootstrapFailure`] is the
//! only error raised after the organization is already active.

use thiserror::Error;
use uuid::Uuid;
use vaultorg_core::error::VaultorgError;

#[derive(Debug, Error)]
pub enum ActivationError {
    #[error(
        "You may not create an organization. You belong to an organization \
         which has a policy that prohibits you from being a member of any \
         other organization."
    )]
    PolicyForbidden,

    #[error("User invalid.")]
    MembershipNotFound,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Organization is already enabled.")]
    AlreadyEnabled,

    #[error("Organization is not on a Pending status.")]
    NotPending,

    #[error("Organization already has a Public Key.")]
    PublicKeyAlreadySet,

    #[error("Organization already has a Private Key.")]
    PrivateKeyAlreadySet,

    #[error("Organization keys are required.")]
    MissingKeyMaterial,

    #[error("Organization was modified concurrently, retry the request.")]
    ConcurrentConflict,

    #[error("Organization {organization_id} was activated but its default collection could not be created: {reason}")]
    BootstrapFailure {
        organization_id: Uuid,
        reason: String,
    },

    #[error("cryptography error: {0}")]
    Crypto(String),

    #[error("invalid activation configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Repository(#[from] VaultorgError),
}

impl ActivationError {
    /// Whether re-running the whole workflow may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentConflict)
    }

    /// Whether the organization was left active when this error was raised.
    pub fn is_post_activation(&self) -> bool {
        matches!(self, Self::BootstrapFailure { .. })
    }
}

impl From<ActivationError> for VaultorgError {
    fn from(err: ActivationError) -> Self {
        match err {
            ActivationError::PolicyForbidden => VaultorgError::AuthorizationDenied {
                reason: err.to_string(),
            },
            ActivationError::MembershipNotFound | ActivationError::TokenInvalid => {
                VaultorgError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            ActivationError::AlreadyEnabled
            | ActivationError::NotPending
            | ActivationError::PublicKeyAlreadySet
            | ActivationError::PrivateKeyAlreadySet
            | ActivationError::MissingKeyMaterial => VaultorgError::Validation {
                message: err.to_string(),
            },
            ActivationError::ConcurrentConflict => VaultorgError::Conflict {
                entity: "organization".into(),
                id: String::new(),
            },
            ActivationError::BootstrapFailure { .. } => VaultorgError::Internal(err.to_string()),
            ActivationError::Crypto(msg) => VaultorgError::Crypto(msg),
            ActivationError::Configuration(msg) => VaultorgError::Internal(msg),
            ActivationError::Repository(inner) => inner,
        }
    }
}
