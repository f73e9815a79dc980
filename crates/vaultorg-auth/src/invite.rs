//! Organization invite tokens.
//!
//! An invite token is an EdDSA (Ed25519) JWT bound to one membership
//! record and the address the invitation was sent to. Verification is
//! stateless: signature, issuer, expiry and the binding claims are all
//! that is checked.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;
use vaultorg_core::models::membership::Membership;
use vaultorg_core::models::user::User;

use crate::config::ActivationConfig;
use crate::error::ActivationError;

/// `purpose` claim carried by every invite token.
pub const INVITE_TOKEN_PURPOSE: &str = "OrgUserInvite";

/// JWT claims embedded in an invite token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteTokenClaims {
    /// Subject: membership ID (UUID string).
    pub sub: String,
    /// Invited email address.
    pub email: String,
    /// Organization ID (UUID string).
    pub org_id: String,
    pub purpose: String,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID string).
    pub jti: String,
}

/// Why an invite token was refused.
///
/// Only ever logged; callers see a single "invalid token" outcome.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InviteTokenRejection {
    #[error("token has expired")]
    Expired,
    #[error("malformed or unauthenticated token: {0}")]
    Malformed(String),
    #[error("token was not issued for an organization invite")]
    WrongPurpose,
    #[error("token is bound to a different membership")]
    MembershipMismatch,
    #[error("token is bound to a different email address")]
    EmailMismatch,
    #[error("confirming user is not the invited user")]
    UserMismatch,
}

/// Signs and verifies invite tokens.
#[derive(Clone)]
pub struct InviteTokenFactory {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    lifetime: Duration,
}

impl InviteTokenFactory {
    pub fn new(config: &ActivationConfig) -> Result<Self, ActivationError> {
        let encoding_key = EncodingKey::from_ed_pem(config.invite_private_key_pem.as_bytes())
            .map_err(|e| ActivationError::Crypto(format!("bad private key: {e}")))?;
        let decoding_key = DecodingKey::from_ed_pem(config.invite_public_key_pem.as_bytes())
            .map_err(|e| ActivationError::Crypto(format!("bad public key: {e}")))?;
        let lifetime = token_lifetime(config.invite_token_lifetime_secs)?;

        Ok(Self {
            encoding_key,
            decoding_key,
            issuer: config.invite_issuer.clone(),
            lifetime,
        })
    }

    /// Issue a token for `membership` valid for the configured lifetime.
    pub fn issue(&self, membership: &Membership) -> Result<String, ActivationError> {
        let expires_at = Utc::now()
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| lifetime_out_of_range(self.lifetime.num_seconds()))?;
        self.issue_expiring_at(membership, expires_at)
    }

    pub fn issue_expiring_at(
        &self,
        membership: &Membership,
        expires_at: DateTime<Utc>,
    ) -> Result<String, ActivationError> {
        let claims = InviteTokenClaims {
            sub: membership.id.to_string(),
            email: membership.email.clone(),
            org_id: membership.organization_id.to_string(),
            purpose: INVITE_TOKEN_PURPOSE.into(),
            iss: self.issuer.clone(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header::new(Algorithm::EdDSA);
        jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| ActivationError::Crypto(format!("JWT encode: {e}")))
    }

    /// Authenticate a token and return its claims.
    pub fn decode(&self, token: &str) -> Result<InviteTokenClaims, InviteTokenRejection> {
        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

        jsonwebtoken::decode::<InviteTokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => InviteTokenRejection::Expired,
                _ => InviteTokenRejection::Malformed(e.to_string()),
            })
    }

    /// Check that `token` authorizes `user` to complete `membership`'s
    /// invitation.
    pub fn check(
        &self,
        token: &str,
        membership: &Membership,
        user: &User,
    ) -> Result<(), InviteTokenRejection> {
        let claims = self.decode(token)?;

        if claims.purpose != INVITE_TOKEN_PURPOSE {
            return Err(InviteTokenRejection::WrongPurpose);
        }
        if claims.sub != membership.id.to_string() {
            return Err(InviteTokenRejection::MembershipMismatch);
        }
        if !claims.email.eq_ignore_ascii_case(&membership.email) {
            return Err(InviteTokenRejection::EmailMismatch);
        }
        if !user.email.eq_ignore_ascii_case(&membership.email) {
            return Err(InviteTokenRejection::UserMismatch);
        }

        Ok(())
    }
}

fn lifetime_out_of_range(secs: impl std::fmt::Display) -> ActivationError {
    ActivationError::Configuration(format!(
        "invite_token_lifetime_secs = {secs} is out of range"
    ))
}

/// Convert the configured lifetime, rejecting values whose expiry
/// timestamp cannot be represented.
fn token_lifetime(secs: u64) -> Result<Duration, ActivationError> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .filter(|lifetime| Utc::now().checked_add_signed(*lifetime).is_some())
        .ok_or_else(|| lifetime_out_of_range(secs))
}

/// Validate an invite token, failing closed.
///
/// Returns `false` for every kind of failure; the reason is only logged.
pub fn validate_invite_token(
    factory: &InviteTokenFactory,
    token: &str,
    membership: &Membership,
    user: &User,
) -> bool {
    match factory.check(token, membership, user) {
        Ok(()) => true,
        Err(reason) => {
            debug!(
                membership_id = %membership.id,
                user_id = %user.id,
                token = %token_fingerprint(token),
                %reason,
                "Invite token rejected"
            );
            false
        }
    }
}

/// Short SHA-256 fingerprint of a raw token, safe to log.
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..6])
}
