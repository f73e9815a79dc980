//! Domain models for vaultorg.
//!
//! These are the core types shared across all crates.

pub mod collection;
pub mod membership;
pub mod organization;
pub mod policy;
pub mod signing_key;
pub mod user;
