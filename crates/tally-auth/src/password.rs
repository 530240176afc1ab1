//! Credential hashing and verification using Argon2id.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::AuthError;

/// A well-formed hash that no credential matches. Verified against when
/// the email is unknown so that both failure paths cost one Argon2id run.
pub const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$\
AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

fn peppered_input<'a>(credential: &'a str, pepper: Option<&str>, buf: &'a mut String) -> &'a [u8] {
    match pepper {
        Some(p) => {
            *buf = format!("{p}{credential}");
            buf.as_bytes()
        }
        None => credential.as_bytes(),
    }
}

/// Hash a credential with Argon2id using OWASP-recommended parameters
/// (m=19456, t=2, p=1). The salt is randomly generated for each call.
pub fn hash_password(credential: &str, pepper: Option<&str>) -> Result<String, AuthError> {
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| AuthError::Crypto(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut buf = String::new();
    let input = peppered_input(credential, pepper, &mut buf);

    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| AuthError::Crypto(format!("hash error: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a credential against an Argon2id PHC-format hash.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
/// `Err(AuthError::Crypto)` if the stored hash is malformed.
pub fn verify_password(
    credential: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let mut buf = String::new();
    let input = peppered_input(credential, pepper, &mut buf);

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    // Parameters come from the PHC string, not from the instance.
    match Argon2::default().verify_password(input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_credential_matches() {
        let hash = hash_password("hunter22", None).unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        assert!(verify_password("hunter22", &hash, None).unwrap());
    }

    #[test]
    fn wrong_credential_does_not_match() {
        let hash = hash_password("hunter22", None).unwrap();
        assert!(!verify_password("wrong", &hash, None).unwrap());
    }

    #[test]
    fn pepper_is_applied() {
        let hash = hash_password("hunter22", Some("pepper!")).unwrap();
        assert!(verify_password("hunter22", &hash, Some("pepper!")).unwrap());
        assert!(!verify_password("hunter22", &hash, None).unwrap());
    }

    #[test]
    fn salts_differ_per_hash() {
        let a = hash_password("same", None).unwrap();
        let b = hash_password("same", None).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn dummy_hash_parses_and_never_matches() {
        assert!(!verify_password("", DUMMY_HASH, None).unwrap());
        assert!(!verify_password("password", DUMMY_HASH, Some("p")).unwrap());
    }

    #[test]
    fn malformed_hash_returns_error() {
        assert!(verify_password("pw", "not-a-hash", None).is_err());
    }
}
