//! SurrealDB implementation of [`TenantRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tally_core::error::{TallyError, TallyResult};
use tally_core::models::tenant::{CreateTenant, Tenant};
use tally_core::repository::TenantRepository;
use uuid::Uuid;

use crate::error::{DbError, violates_index};
use crate::schema::TENANT_DOMAIN_INDEX;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct TenantRow {
    name: String,
    domain: String,
    created_at: DateTime<Utc>,
}

impl TenantRow {
    fn into_tenant(self, id: Uuid) -> Tenant {
        Tenant {
            id,
            name: self.name,
            domain: self.domain,
            created_at: self.created_at,
        }
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TenantRowWithId {
    record_id: String,
    name: String,
    domain: String,
    created_at: DateTime<Utc>,
}

impl TenantRowWithId {
    fn try_into_tenant(self) -> Result<Tenant, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid tenant UUID: {e}")))?;
        Ok(Tenant {
            id,
            name: self.name,
            domain: self.domain,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    /// Wrap a client whose schema is already migrated.
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Classify a rejected CREATE. The unique index names itself in the
    /// error; if the store reported a write conflict instead, the domain
    /// is re-read to see whether a concurrent insert won.
    async fn create_failure(&self, err: surrealdb::Error, domain: &str) -> TallyError {
        if violates_index(&err, TENANT_DOMAIN_INDEX) || self.get_by_domain(domain).await.is_ok() {
            return TallyError::DuplicateDomain {
                domain: domain.to_string(),
            };
        }
        DbError::Query(err.to_string()).into()
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenant) -> TallyResult<Tenant> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let domain = input.domain.clone();

        let outcome = match self
            .db
            .query("CREATE type::record('tenant', $id) SET name = $name, domain = $domain")
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("domain", input.domain))
            .await
        {
            Ok(response) => response.check(),
            Err(e) => Err(e),
        };

        let mut result = match outcome {
            Ok(result) => result,
            Err(e) => return Err(self.create_failure(e, &domain).await),
        };

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id))
    }

    async fn get_by_id(&self, id: Uuid) -> TallyResult<Tenant> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('tenant', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id))
    }

    /// Expects an already-normalized domain.
    async fn get_by_domain(&self, domain: &str) -> TallyResult<Tenant> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM tenant WHERE domain = $domain")
            .bind(("domain", domain.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: format!("domain={domain}"),
        })?;

        Ok(row.try_into_tenant()?)
    }

    async fn delete(&self, id: Uuid) -> TallyResult<()> {
        self.db
            .query("DELETE type::record('tenant', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }
}
