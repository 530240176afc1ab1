//! Audit recorder: turns an actor, an event and a request context into
//! a stored entry.

use tally_core::error::{TallyError, TallyResult};
use tally_core::models::audit::{AuditEntry, AuditEvent, CreateAuditEntry};
use tally_core::models::context::RequestContext;
use tally_core::models::principal::Principal;
use tally_core::repository::AuditLogRepository;
use tracing::{error, info};

#[derive(Clone)]
pub struct AuditRecorder<A: AuditLogRepository> {
    repo: A,
}

impl<A: AuditLogRepository> AuditRecorder<A> {
    pub fn new(repo: A) -> Self {
        Self { repo }
    }

    /// Append one entry. The tenant is taken from the actor, never from
    /// the caller, so an entry always lands in its actor's tenant.
    pub async fn record(
        &self,
        actor: &Principal,
        event: AuditEvent,
        ctx: &RequestContext,
    ) -> TallyResult<AuditEntry> {
        let input = CreateAuditEntry {
            tenant_id: actor.tenant_id,
            actor_id: actor.id,
            action: event.action,
            resource_type: event.resource_type,
            resource_id: event.resource_id,
            details: event.details,
            ip_address: ctx.client_ip.clone(),
            user_agent: ctx.user_agent.clone(),
        };

        let entry = self
            .repo
            .append(input)
            .await
            .map_err(|e| TallyError::AuditWriteFailure(e.to_string()))?;

        info!(
            target: "tally::audit",
            id = entry.id,
            tenant_id = %entry.tenant_id,
            actor_id = %entry.actor_id,
            action = %entry.action,
            "Audit entry recorded"
        );
        Ok(entry)
    }

    /// Like [`record`](Self::record), but a failed write is logged and
    /// swallowed. Used after a business action has already succeeded.
    pub async fn record_best_effort(
        &self,
        actor: &Principal,
        event: AuditEvent,
        ctx: &RequestContext,
    ) -> Option<AuditEntry> {
        let action = event.action.clone();
        match self.record(actor, event, ctx).await {
            Ok(entry) => Some(entry),
            Err(e) => {
                error!(
                    target: "tally::audit",
                    tenant_id = %actor.tenant_id,
                    actor_id = %actor.id,
                    %action,
                    error = %e,
                    "Audit entry dropped"
                );
                None
            }
        }
    }
}
