//! SurrealDB connection management.
//!
//! The engine is chosen from the URL scheme: `ws://` / `wss://` for a
//! server, `mem://` for an embedded in-memory store.

use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use tracing::info;

#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Endpoint URL, e.g. `ws://127.0.0.1:8000` or `mem://`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root credentials. Ignored for embedded engines.
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8000".into(),
            namespace: "tally".into(),
            database: "audit".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    /// Embedded engines have no users to sign in as.
    pub fn is_embedded(&self) -> bool {
        self.url.starts_with("mem://")
    }
}

/// A connected, namespace-scoped SurrealDB client.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Any>,
}

impl DbManager {
    pub async fn connect(config: &DbConfig) -> Result<Self, surrealdb::Error> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let db = any::connect(config.url.as_str()).await?;

        if !config.is_embedded() {
            db.signin(Root {
                username: config.username.clone(),
                password: config.password.clone(),
            })
            .await?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!("Connected to SurrealDB");

        Ok(Self { db })
    }

    pub fn client(&self) -> &Surreal<Any> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_mem_urls_are_embedded() {
        let mut config = DbConfig::default();
        assert!(!config.is_embedded());
        config.url = "mem://".into();
        assert!(config.is_embedded());
    }
}
