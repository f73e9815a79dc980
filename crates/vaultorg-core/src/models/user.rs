//! User domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated account holder.
///
/// Identity is established by the session layer before any workflow in
/// this workspace runs; only the fields needed to bind invitations are
/// carried here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}
