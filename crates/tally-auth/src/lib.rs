//! Tally Auth: Argon2id credential hashing and principal
//! authentication.

pub mod config;
pub mod error;
pub mod password;
pub mod service;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::AuthService;
