//! Role domain model.
//!
//! Roles form a closed set. Stored as their snake_case name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TallyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Created with the tenant; exactly one per tenant.
    Owner,
    Admin,
    Analyst,
    ContentCreator,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Owner,
        Role::Admin,
        Role::Analyst,
        Role::ContentCreator,
    ];

    /// Roles that may be granted through general user creation.
    pub const ASSIGNABLE: [Role; 3] = [Role::Admin, Role::Analyst, Role::ContentCreator];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Analyst => "analyst",
            Role::ContentCreator => "content_creator",
        }
    }

    /// Owners and admins may manage users and read the audit log.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Owner | Role::Admin)
    }

    pub fn is_assignable(&self) -> bool {
        !matches!(self, Role::Owner)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "analyst" => Ok(Role::Analyst),
            "content_creator" => Ok(Role::ContentCreator),
            other => Err(TallyError::InvalidRole {
                role: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert!(matches!(err, TallyError::InvalidRole { role } if role == "superuser"));
    }

    #[test]
    fn only_owner_and_admin_are_privileged() {
        assert!(Role::Owner.is_privileged());
        assert!(Role::Admin.is_privileged());
        assert!(!Role::Analyst.is_privileged());
        assert!(!Role::ContentCreator.is_privileged());
    }

    #[test]
    fn owner_is_not_assignable() {
        assert!(!Role::Owner.is_assignable());
        assert!(Role::ASSIGNABLE.iter().all(Role::is_assignable));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::ContentCreator).unwrap();
        assert_eq!(json, "\"content_creator\"");
    }
}
