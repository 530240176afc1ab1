//! Principal (user) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    /// Argon2id PHC string. Opaque outside the credential store.
    #[serde(skip_serializing, default)]
    pub credential_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Storage-level input. The credential must already be hashed.
#[derive(Debug, Clone)]
pub struct CreatePrincipal {
    pub tenant_id: Uuid,
    pub email: String,
    pub credential_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Caller-facing input for creating a principal with a raw credential.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPrincipal {
    pub email: String,
    pub credential: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Canonical form of an email: trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
