//! Authentication error types.

use tally_core::error::TallyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("principal is inactive")]
    Inactive,

    #[error("credential must be at least {min} characters")]
    WeakCredential { min: usize },

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for TallyError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => TallyError::InvalidCredentials,
            AuthError::Inactive => TallyError::Inactive,
            AuthError::WeakCredential { .. } => TallyError::validation(err.to_string()),
            AuthError::Crypto(msg) => TallyError::Crypto(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_credential_is_a_validation_error() {
        let err: TallyError = AuthError::WeakCredential { min: 8 }.into();
        match err {
            TallyError::Validation { message } => assert!(message.contains('8')),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn login_failures_keep_their_kind() {
        assert!(matches!(
            TallyError::from(AuthError::InvalidCredentials),
            TallyError::InvalidCredentials
        ));
        assert!(matches!(
            TallyError::from(AuthError::Inactive),
            TallyError::Inactive
        ));
    }
}
