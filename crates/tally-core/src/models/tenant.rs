//! Tenant domain model.
//!
//! Tenants (accounts) provide full data isolation. Every principal and
//! every audit entry is scoped to exactly one tenant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// Globally unique domain (e.g., `acme.com`), stored lower-cased.
    pub domain: String,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a new tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub name: String,
    pub domain: String,
}

/// Canonical form of a domain: trimmed and lower-cased, so uniqueness
/// is case-insensitive.
pub fn normalize_domain(domain: &str) -> String {
    domain.trim().to_lowercase()
}
