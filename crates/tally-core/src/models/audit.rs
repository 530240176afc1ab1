//! Audit log domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::principal::Principal;
use super::role::Role;

/// Action codes written by the built-in flows.
pub mod actions {
    pub const ACCOUNT_CREATED: &str = "account_created";
    pub const USER_CREATED: &str = "user_created";
    pub const USER_LOGIN: &str = "user_login";
    pub const USER_LOGOUT: &str = "user_logout";
    pub const USER_ACTIVATED: &str = "user_activated";
    pub const USER_DEACTIVATED: &str = "user_deactivated";
}

/// Resource type labels written by the built-in flows.
pub mod resources {
    pub const ACCOUNT: &str = "account";
    pub const USER: &str = "user";
}

/// An immutable, stored audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditEntry {
    /// Store-assigned sequence number, strictly increasing by insertion.
    pub id: u64,
    pub tenant_id: Uuid,
    pub actor_id: Uuid,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Storage-level input for appending an entry.
#[derive(Debug, Clone)]
pub struct CreateAuditEntry {
    pub tenant_id: Uuid,
    pub actor_id: Uuid,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// What happened, independent of who did it and from where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub details: Option<String>,
}

impl AuditEvent {
    pub fn new(action: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            resource_type: resource_type.into(),
            resource_id: None,
            details: None,
        }
    }

    pub fn resource_id(mut self, id: impl ToString) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// The actor's identity as it is *now*, joined onto query results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActorSnapshot {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl From<&Principal> for ActorSnapshot {
    fn from(p: &Principal) -> Self {
        Self {
            id: p.id,
            email: p.email.clone(),
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            role: p.role,
        }
    }
}

/// A query result row: the stored entry plus its actor.
#[derive(Debug, Clone, Serialize)]
pub struct AuditLogView {
    #[serde(flatten)]
    pub entry: AuditEntry,
    /// `None` only if the actor record could not be resolved.
    pub actor: Option<ActorSnapshot>,
}
