//! SurrealDB repository implementations.

mod audit_log;
mod principal;
mod tenant;

pub use audit_log::SurrealAuditLogRepository;
pub use principal::SurrealPrincipalRepository;
pub use tenant::SurrealTenantRepository;
