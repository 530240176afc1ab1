//! Authentication configuration.

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Optional pepper prepended to credentials before Argon2id hashing
    /// and verification.
    pub pepper: Option<String>,
    /// Minimum credential length accepted when hashing a new credential.
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            pepper: None,
            min_password_length: 8,
        }
    }
}
