//! SurrealDB implementation of [`PrincipalRepository`].
//!
//! Credentials arrive already hashed; this layer never sees a raw
//! secret.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tally_core::error::{TallyError, TallyResult};
use tally_core::models::principal::{CreatePrincipal, Principal};
use tally_core::models::role::Role;
use tally_core::repository::PrincipalRepository;
use uuid::Uuid;

use crate::error::{DbError, violates_index};
use crate::schema::{PRINCIPAL_EMAIL_INDEX, PRINCIPAL_SEQUENCE};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct PrincipalRow {
    tenant_id: String,
    email: String,
    credential_hash: String,
    first_name: String,
    last_name: String,
    role: String,
    active: bool,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct PrincipalRowWithId {
    record_id: String,
    tenant_id: String,
    email: String,
    credential_hash: String,
    first_name: String,
    last_name: String,
    role: String,
    active: bool,
    created_at: DateTime<Utc>,
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    Role::from_str(s).map_err(|_| DbError::Decode(format!("unknown role: {s}")))
}

impl PrincipalRow {
    fn into_principal(self, id: Uuid) -> Result<Principal, DbError> {
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Decode(format!("invalid tenant UUID: {e}")))?;
        Ok(Principal {
            id,
            tenant_id,
            email: self.email,
            credential_hash: self.credential_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            role: parse_role(&self.role)?,
            active: self.active,
            created_at: self.created_at,
        })
    }
}

impl PrincipalRowWithId {
    fn try_into_principal(self) -> Result<Principal, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        PrincipalRow {
            tenant_id: self.tenant_id,
            email: self.email,
            credential_hash: self.credential_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            active: self.active,
            created_at: self.created_at,
        }
        .into_principal(id)
    }
}

/// SurrealDB implementation of the Principal repository.
#[derive(Clone)]
pub struct SurrealPrincipalRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPrincipalRepository<C> {
    /// Wrap a client whose schema is already migrated.
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Classify a rejected insert. A write conflict can hide the index
    /// violation, so the email is read back before giving up.
    async fn create_failure(&self, err: surrealdb::Error, email: &str) -> TallyError {
        if violates_index(&err, PRINCIPAL_EMAIL_INDEX) || self.get_by_email(email).await.is_ok() {
            return TallyError::DuplicateEmail {
                email: email.to_string(),
            };
        }
        DbError::Query(err.to_string()).into()
    }
}

impl<C: Connection> PrincipalRepository for SurrealPrincipalRepository<C> {
    /// Stores the principal active, with the next `principal_seq` value
    /// as its creation-order key.
    async fn create(&self, input: CreatePrincipal) -> TallyResult<Principal> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let email = input.email.clone();

        let outcome = match self
            .db
            .query(
                "CREATE type::record('principal', $id) SET \
                 tenant_id = $tenant_id, \
                 email = $email, \
                 credential_hash = $credential_hash, \
                 first_name = $first_name, \
                 last_name = $last_name, \
                 role = $role, \
                 active = true, \
                 seq = sequence::nextval($sequence)",
            )
            .bind(("id", id_str.clone()))
            .bind(("sequence", PRINCIPAL_SEQUENCE.to_string()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("email", input.email))
            .bind(("credential_hash", input.credential_hash))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("role", input.role.as_str().to_string()))
            .await
        {
            Ok(response) => response.check(),
            Err(e) => Err(e),
        };

        let mut result = match outcome {
            Ok(result) => result,
            Err(e) => return Err(self.create_failure(e, &email).await),
        };

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: id_str,
        })?;

        Ok(row.into_principal(id)?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> TallyResult<Principal> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('principal', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: id_str,
        })?;

        Ok(row.into_principal(id)?)
    }

    async fn get_by_email(&self, email: &str) -> TallyResult<Principal> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM principal \
                 WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrincipalRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_principal()?)
    }

    /// The `tenant_id` guard turns a foreign principal into `NotFound`.
    async fn set_active(&self, tenant_id: Uuid, id: Uuid, active: bool) -> TallyResult<Principal> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('principal', $id) SET active = $active \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("active", active))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: id_str,
        })?;

        Ok(row.into_principal(id)?)
    }

    /// `seq` breaks ties between principals sharing a `created_at`.
    async fn list(&self, tenant_id: Uuid) -> TallyResult<Vec<Principal>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM principal \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY created_at ASC, seq ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrincipalRowWithId> = result.take(0).map_err(DbError::from)?;

        let principals = rows
            .into_iter()
            .map(|row| row.try_into_principal())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(principals)
    }
}
