//! Activation configuration.

use serde::Deserialize;

/// Configuration for invitation tokens and the activation workflow.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
    /// PEM-encoded Ed25519 private key for signing invite tokens.
    pub invite_private_key_pem: String,
    /// PEM-encoded Ed25519 public key for verifying invite tokens.
    pub invite_public_key_pem: String,
    /// Invite token lifetime in seconds (default: 432_000 = 5 days).
    pub invite_token_lifetime_secs: u64,
    /// Invite token issuer (`iss` claim).
    pub invite_issuer: String,
    /// Names of the feature flags switched on for this deployment.
    pub enabled_features: Vec<String>,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            invite_private_key_pem: String::new(),
            invite_public_key_pem: String::new(),
            invite_token_lifetime_secs: 432_000,
            invite_issuer: "vaultorg".into(),
            enabled_features: Vec::new(),
        }
    }
}
