//! Audit query engine: tenant-scoped, filtered, paginated reads of the
//! audit log, with each entry joined to its actor's current identity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tally_core::access::require_tenant_admin;
use tally_core::error::{TallyError, TallyResult};
use tally_core::models::audit::{ActorSnapshot, AuditLogView};
use tally_core::models::principal::Principal;
use tally_core::repository::{AuditLogFilter, AuditLogRepository, Pagination, PrincipalRepository};
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_PER_PAGE: u64 = 50;
pub const MAX_PER_PAGE: u64 = 100;

/// A 1-indexed page request as supplied by a caller. Out-of-range
/// values are corrected, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self { page, per_page }
    }

    /// Page 0 becomes 1; `per_page` is clamped to `1..=MAX_PER_PAGE`.
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Store-level offset/limit for a normalized request. The offset is
    /// capped at `i64::MAX`, the largest start the store accepts.
    pub fn pagination(self) -> Pagination {
        let req = self.normalized();
        Pagination {
            offset: (req.page - 1)
                .saturating_mul(req.per_page)
                .min(i64::MAX as u64),
            limit: req.per_page,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageInfo {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        let pages = total.div_ceil(per_page.max(1));
        Self {
            page,
            per_page,
            total,
            pages,
            has_next: page < pages,
            has_prev: page > 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditPage {
    pub entries: Vec<AuditLogView>,
    pub page_info: PageInfo,
}

/// Distinct values present in a tenant's log, for filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub actions: Vec<String>,
    pub resource_types: Vec<String>,
}

/// Read side of the audit log.
///
/// Every call checks that the requester is an active owner or admin of
/// the tenant being read.
#[derive(Clone)]
pub struct AuditQueryEngine<A: AuditLogRepository, P: PrincipalRepository> {
    audit: A,
    principals: P,
}

impl<A: AuditLogRepository, P: PrincipalRepository> AuditQueryEngine<A, P> {
    pub fn new(audit: A, principals: P) -> Self {
        Self { audit, principals }
    }

    fn authorize(&self, tenant_id: Uuid, requester: &Principal) -> TallyResult<()> {
        require_tenant_admin(requester, tenant_id).inspect_err(|e| {
            warn!(
                %tenant_id,
                requester_id = %requester.id,
                requester_tenant = %requester.tenant_id,
                role = %requester.role,
                error = %e,
                "Audit query denied"
            );
        })
    }

    pub async fn query(
        &self,
        tenant_id: Uuid,
        requester: &Principal,
        filter: AuditLogFilter,
        page: PageRequest,
    ) -> TallyResult<AuditPage> {
        self.authorize(tenant_id, requester)?;

        let req = page.normalized();
        let result = self
            .audit
            .list(tenant_id, filter, req.pagination())
            .await?;

        let actors = self
            .resolve_actors(tenant_id, result.items.iter().map(|e| e.actor_id))
            .await?;

        let entries = result
            .items
            .into_iter()
            .map(|entry| {
                let actor = actors.get(&entry.actor_id).cloned().flatten();
                AuditLogView { entry, actor }
            })
            .collect::<Vec<_>>();

        debug!(
            %tenant_id,
            page = req.page,
            per_page = req.per_page,
            total = result.total,
            returned = entries.len(),
            "Audit query served"
        );

        Ok(AuditPage {
            entries,
            page_info: PageInfo::new(req.page, req.per_page, result.total),
        })
    }

    pub async fn filter_options(
        &self,
        tenant_id: Uuid,
        requester: &Principal,
    ) -> TallyResult<FilterOptions> {
        self.authorize(tenant_id, requester)?;

        Ok(FilterOptions {
            actions: self.audit.distinct_actions(tenant_id).await?,
            resource_types: self.audit.distinct_resource_types(tenant_id).await?,
        })
    }

    /// Look up each distinct actor once. A missing actor maps to `None`.
    async fn resolve_actors(
        &self,
        tenant_id: Uuid,
        actor_ids: impl Iterator<Item = Uuid>,
    ) -> TallyResult<HashMap<Uuid, Option<ActorSnapshot>>> {
        let mut actors = HashMap::new();
        for actor_id in actor_ids {
            if actors.contains_key(&actor_id) {
                continue;
            }
            let snapshot = match self.principals.get_by_id(tenant_id, actor_id).await {
                Ok(principal) => Some(ActorSnapshot::from(&principal)),
                Err(TallyError::NotFound { .. }) => {
                    warn!(%tenant_id, %actor_id, "Audit actor could not be resolved");
                    None
                }
                Err(e) => return Err(e),
            };
            actors.insert(actor_id, snapshot);
        }
        Ok(actors)
    }
}
