//! vaultorg core: domain models, repository traits and the shared
//! error type.

pub mod error;
pub mod models;
pub mod repository;
