//! Error types for the Tally system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TallyError {
    #[error("An account with domain {domain} already exists")]
    DuplicateDomain { domain: String },

    #[error("A user with email {email} already exists")]
    DuplicateEmail { email: String },

    #[error("Invalid role: {role}")]
    InvalidRole { role: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Principal is inactive")]
    Inactive,

    #[error("Insufficient permissions: {reason}")]
    InsufficientPermissions { reason: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Audit write failed: {0}")]
    AuditWriteFailure(String),

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TallyError {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::InsufficientPermissions {
            reason: reason.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

pub type TallyResult<T> = Result<T, TallyError>;
