//! Authentication service: credential checks against the principal
//! store.

use tally_core::error::{TallyError, TallyResult};
use tally_core::models::principal::{Principal, normalize_email};
use tally_core::repository::PrincipalRepository;
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;

/// Authentication service.
///
/// Generic over the principal repository so that the auth layer has no
/// dependency on the database crate.
#[derive(Clone)]
pub struct AuthService<P: PrincipalRepository> {
    principals: P,
    config: AuthConfig,
}

impl<P: PrincipalRepository> AuthService<P> {
    pub fn new(principals: P, config: AuthConfig) -> Self {
        Self { principals, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Check an email/credential pair.
    ///
    /// Unknown email and wrong credential are indistinguishable: both
    /// return `InvalidCredentials` after one Argon2id verification.
    /// `Inactive` is only reported once the credential has matched.
    pub async fn authenticate(&self, email: &str, credential: &str) -> TallyResult<Principal> {
        let email = normalize_email(email);
        let pepper = self.config.pepper.as_deref();

        let principal = match self.principals.get_by_email(&email).await {
            Ok(p) => Some(p),
            Err(TallyError::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };

        let Some(principal) = principal else {
            password::verify_password(credential, password::DUMMY_HASH, pepper)?;
            warn!(%email, "Authentication failed: unknown email");
            return Err(AuthError::InvalidCredentials.into());
        };

        if !password::verify_password(credential, &principal.credential_hash, pepper)? {
            warn!(%email, principal_id = %principal.id, "Authentication failed: wrong credential");
            return Err(AuthError::InvalidCredentials.into());
        }

        if !principal.active {
            warn!(%email, principal_id = %principal.id, "Authentication refused: inactive");
            return Err(AuthError::Inactive.into());
        }

        debug!(principal_id = %principal.id, "Authenticated");
        Ok(principal)
    }

    /// Enforce the length policy and hash a new credential.
    pub fn hash_credential(&self, credential: &str) -> TallyResult<String> {
        let min = self.config.min_password_length;
        if credential.chars().count() < min {
            return Err(AuthError::WeakCredential { min }.into());
        }
        Ok(password::hash_password(
            credential,
            self.config.pepper.as_deref(),
        )?)
    }
}
