//! Database-specific error types and conversions.

use tally_core::error::TallyError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Malformed row: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for TallyError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => TallyError::NotFound { entity, id },
            other => TallyError::Database(other.to_string()),
        }
    }
}

/// True if a failed write was rejected by the named UNIQUE index.
pub(crate) fn violates_index(err: &surrealdb::Error, index: &str) -> bool {
    err.to_string().contains(index)
}

/// True if the store rejected a transaction that may succeed when run
/// again, such as a write conflict between concurrent commits.
pub(crate) fn is_retryable(err: &DbError) -> bool {
    let message = err.to_string().to_lowercase();
    message.contains("can be retried") || message.contains("write conflict")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_core_not_found() {
        let err: TallyError = DbError::NotFound {
            entity: "tenant".into(),
            id: "abc".into(),
        }
        .into();
        assert!(matches!(err, TallyError::NotFound { entity, .. } if entity == "tenant"));
    }

    #[test]
    fn other_errors_map_to_database() {
        let err: TallyError = DbError::Decode("bad uuid".into()).into();
        match err {
            TallyError::Database(msg) => assert!(msg.contains("bad uuid")),
            other => panic!("expected Database, got {other:?}"),
        }
    }

    #[test]
    fn write_conflicts_are_retryable() {
        let conflict = DbError::Query(
            "Transaction conflict: Write conflict. This transaction can be retried".into(),
        );
        assert!(is_retryable(&conflict));
        assert!(is_retryable(&DbError::Query("Write conflict".into())));
    }

    #[test]
    fn other_failures_are_not_retryable() {
        assert!(!is_retryable(&DbError::Query(
            "Database index `idx_tenant_domain` already contains 'acme.com'".into()
        )));
        assert!(!is_retryable(&DbError::Decode("bad uuid".into())));
    }
}
