//! SurrealDB implementation of [`AuditLogRepository`].
//!
//! Entries are append-only. Each insert draws its sequence number from
//! the `audit_seq` store sequence inside the CREATE statement. Sequence
//! allocation does not contend between writers; an insert the store still
//! rejects as a retryable transaction conflict is attempted again.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tally_core::error::TallyResult;
use tally_core::models::audit::{AuditEntry, CreateAuditEntry};
use tally_core::repository::{AuditLogFilter, AuditLogRepository, PaginatedResult, Pagination};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, is_retryable};
use crate::schema::AUDIT_SEQUENCE;

/// Largest offset the store accepts for `START`.
const MAX_START: u64 = i64::MAX as u64;

/// Attempts per append before a retryable conflict is surfaced.
const APPEND_ATTEMPTS: u32 = 5;

#[derive(Debug, SurrealValue)]
struct AuditLogRow {
    seq: u64,
    tenant_id: String,
    actor_id: String,
    action: String,
    resource_type: String,
    resource_id: Option<String>,
    details: Option<String>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
}

impl AuditLogRow {
    fn try_into_entry(self) -> Result<AuditEntry, DbError> {
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Decode(format!("invalid tenant UUID: {e}")))?;
        let actor_id = Uuid::parse_str(&self.actor_id)
            .map_err(|e| DbError::Decode(format!("invalid actor UUID: {e}")))?;
        Ok(AuditEntry {
            id: self.seq,
            tenant_id,
            actor_id,
            action: self.action,
            resource_type: self.resource_type,
            resource_id: self.resource_id,
            details: self.details,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            created_at: self.created_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

#[derive(Debug, SurrealValue)]
struct ActionRow {
    action: String,
}

#[derive(Debug, SurrealValue)]
struct ResourceTypeRow {
    resource_type: String,
}

/// Build the WHERE clause for a filter. Only conditions whose parameter
/// is set are included; the tenant condition is always present.
fn where_clause(filter: &AuditLogFilter) -> String {
    let mut conditions = vec!["tenant_id = $tenant_id"];
    if filter.actor_id.is_some() {
        conditions.push("actor_id = $actor_id");
    }
    if filter.action.is_some() {
        conditions.push("string::contains(action, $action)");
    }
    if filter.resource_type.is_some() {
        conditions.push("resource_type = $resource_type");
    }
    if filter.from.is_some() {
        conditions.push("created_at >= $from");
    }
    if filter.to.is_some() {
        conditions.push("created_at <= $to");
    }
    conditions.join(" AND ")
}

/// SurrealDB implementation of the audit log repository.
#[derive(Clone)]
pub struct SurrealAuditLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAuditLogRepository<C> {
    /// Wrap a client whose schema is already migrated.
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// A single insert attempt.
    async fn insert(&self, input: CreateAuditEntry) -> Result<AuditEntry, DbError> {
        let result = self
            .db
            .query(
                "CREATE audit_log SET \
                 seq = sequence::nextval($sequence), \
                 tenant_id = $tenant_id, \
                 actor_id = $actor_id, \
                 action = $action, \
                 resource_type = $resource_type, \
                 resource_id = $resource_id, \
                 details = $details, \
                 ip_address = $ip_address, \
                 user_agent = $user_agent",
            )
            .bind(("sequence", AUDIT_SEQUENCE.to_string()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("actor_id", input.actor_id.to_string()))
            .bind(("action", input.action))
            .bind(("resource_type", input.resource_type))
            .bind(("resource_id", input.resource_id))
            .bind(("details", input.details))
            .bind(("ip_address", input.ip_address))
            .bind(("user_agent", input.user_agent))
            .await?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<AuditLogRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| DbError::Query("audit insert returned no row".into()))?
            .try_into_entry()
    }
}

impl<C: Connection> AuditLogRepository for SurrealAuditLogRepository<C> {
    /// Retries a conflicting insert up to `APPEND_ATTEMPTS` times.
    async fn append(&self, input: CreateAuditEntry) -> TallyResult<AuditEntry> {
        let mut attempt = 1;
        loop {
            match self.insert(input.clone()).await {
                Ok(entry) => {
                    debug!(id = entry.id, action = %entry.action, attempt, "Audit entry appended");
                    return Ok(entry);
                }
                Err(e) if attempt < APPEND_ATTEMPTS && is_retryable(&e) => {
                    debug!(attempt, error = %e, "Audit append conflicted, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: AuditLogFilter,
        pagination: Pagination,
    ) -> TallyResult<PaginatedResult<AuditEntry>> {
        let condition = where_clause(&filter);
        // START is a signed integer in the store.
        let start = pagination.offset.min(MAX_START);
        // Statement 0 counts, statement 1 fetches the page.
        let query = format!(
            "SELECT count() AS total FROM audit_log WHERE {condition} GROUP ALL; \
             SELECT * FROM audit_log WHERE {condition} \
             ORDER BY created_at DESC, seq DESC \
             LIMIT $limit START $offset;"
        );

        let mut builder = self
            .db
            .query(query)
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", start));

        if let Some(actor_id) = filter.actor_id {
            builder = builder.bind(("actor_id", actor_id.to_string()));
        }
        if let Some(action) = filter.action {
            builder = builder.bind(("action", action));
        }
        if let Some(resource_type) = filter.resource_type {
            builder = builder.bind(("resource_type", resource_type));
        }
        if let Some(from) = filter.from {
            builder = builder.bind(("from", from));
        }
        if let Some(to) = filter.to {
            builder = builder.bind(("to", to));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let rows: Vec<AuditLogRow> = result.take(1).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_entry())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    /// Grouped in the store, sorted here.
    async fn distinct_actions(&self, tenant_id: Uuid) -> TallyResult<Vec<String>> {
        let mut result = self
            .db
            .query("SELECT action FROM audit_log WHERE tenant_id = $tenant_id GROUP BY action")
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ActionRow> = result.take(0).map_err(DbError::from)?;
        let mut actions: Vec<String> = rows.into_iter().map(|r| r.action).collect();
        actions.sort();
        Ok(actions)
    }

    async fn distinct_resource_types(&self, tenant_id: Uuid) -> TallyResult<Vec<String>> {
        let mut result = self
            .db
            .query(
                "SELECT resource_type FROM audit_log \
                 WHERE tenant_id = $tenant_id GROUP BY resource_type",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResourceTypeRow> = result.take(0).map_err(DbError::from)?;
        let mut resource_types: Vec<String> = rows.into_iter().map(|r| r.resource_type).collect();
        resource_types.sort();
        Ok(resource_types)
    }
}
