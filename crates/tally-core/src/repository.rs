//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped repositories
//! require a `tenant_id` parameter to enforce data isolation.
//! Uniqueness (tenant domain, principal email) must be enforced by the
//! store itself, atomically with the insert.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::TallyResult;
use crate::models::{
    audit::{AuditEntry, CreateAuditEntry},
    principal::{CreatePrincipal, Principal},
    tenant::{CreateTenant, Tenant},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Tenants (global scope)
// ---------------------------------------------------------------------------

/// Storage for tenants. Ids and `created_at` are assigned on create.
pub trait TenantRepository: Send + Sync {
    /// Fails with `DuplicateDomain` if the domain is already registered.
    fn create(&self, input: CreateTenant) -> impl Future<Output = TallyResult<Tenant>> + Send;
    /// Fails with `NotFound` if no tenant has this id.
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = TallyResult<Tenant>> + Send;
    /// Look up by normalized domain.
    fn get_by_domain(&self, domain: &str) -> impl Future<Output = TallyResult<Tenant>> + Send;
    /// Remove a tenant that was never completed. Only used to roll back
    /// an onboarding whose owner could not be created.
    fn delete(&self, id: Uuid) -> impl Future<Output = TallyResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Principals (tenant-scoped, email globally unique)
// ---------------------------------------------------------------------------

/// Storage for principals. Every read except `get_by_email` is scoped
/// to one tenant.
pub trait PrincipalRepository: Send + Sync {
    /// Fails with `DuplicateEmail` if the email is already registered.
    fn create(
        &self,
        input: CreatePrincipal,
    ) -> impl Future<Output = TallyResult<Principal>> + Send;
    /// A principal outside `tenant_id` is reported as `NotFound`.
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = TallyResult<Principal>> + Send;
    /// Global lookup used by authentication.
    fn get_by_email(&self, email: &str) -> impl Future<Output = TallyResult<Principal>> + Send;
    /// Soft-disable or re-enable. Principals are never hard-deleted.
    fn set_active(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        active: bool,
    ) -> impl Future<Output = TallyResult<Principal>> + Send;
    /// All principals of a tenant in creation order. Principals created
    /// within the same timestamp keep their insertion order.
    fn list(&self, tenant_id: Uuid) -> impl Future<Output = TallyResult<Vec<Principal>>> + Send;
}

// ---------------------------------------------------------------------------
// Audit (append-only, tenant-scoped)
// ---------------------------------------------------------------------------

/// Query filters for audit log entries. All set fields must match.
#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    /// Exact match on the acting principal.
    pub actor_id: Option<Uuid>,
    /// Case-sensitive substring match on the action code.
    pub action: Option<String>,
    /// Exact match on the resource type.
    pub resource_type: Option<String>,
    /// Inclusive lower bound on `created_at`.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub to: Option<DateTime<Utc>>,
}

/// Append-only storage for audit entries.
pub trait AuditLogRepository: Send + Sync {
    /// Append a new audit log entry. No update or delete operations exist.
    ///
    /// The store assigns `id` and `created_at`. Concurrent appends must
    /// all commit, each with a distinct id.
    fn append(
        &self,
        input: CreateAuditEntry,
    ) -> impl Future<Output = TallyResult<AuditEntry>> + Send;
    /// Newest first: `created_at DESC, id DESC`.
    ///
    /// `total` counts every entry matching the filter, not just the page.
    /// An offset past the end yields an empty page.
    fn list(
        &self,
        tenant_id: Uuid,
        filter: AuditLogFilter,
        pagination: Pagination,
    ) -> impl Future<Output = TallyResult<PaginatedResult<AuditEntry>>> + Send;
    /// Sorted distinct action codes present in the tenant's log.
    fn distinct_actions(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = TallyResult<Vec<String>>> + Send;
    /// Sorted distinct resource types present in the tenant's log.
    fn distinct_resource_types(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = TallyResult<Vec<String>>> + Send;
}
