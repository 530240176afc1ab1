//! Tally Directory: tenants and the principals that belong to them.
//!
//! Every state-changing flow here records its audit entry through
//! [`tally_audit::AuditRecorder`] after the change has been committed.

pub mod principal;
pub mod tenant;
mod validate;

pub use principal::PrincipalDirectory;
pub use tenant::{OnboardTenant, Onboarded, TenantDirectory};
