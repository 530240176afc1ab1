//! Tally Server. Process bootstrap: configuration, logging, database
//! connection, migrations and optional sample data.

mod config;
mod seed;

use tally_audit::AuditRecorder;
use tally_auth::AuthService;
use tally_core::error::TallyResult;
use tally_db::repository::{
    SurrealAuditLogRepository, SurrealPrincipalRepository, SurrealTenantRepository,
};
use tally_db::{DbError, DbManager};
use tally_directory::{PrincipalDirectory, TenantDirectory};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tally=info")),
        )
        .json()
        .init();

    tracing::info!("Starting Tally server...");

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Tally server failed");
        std::process::exit(1);
    }

    tracing::info!("Tally server stopped.");
}

async fn run() -> TallyResult<()> {
    let config = ServerConfig::from_env()?;

    let manager = DbManager::connect(&config.db)
        .await
        .map_err(DbError::from)?;
    let db = manager.client().clone();
    tally_db::run_migrations(&db).await?;

    let principal_repo = SurrealPrincipalRepository::new(db.clone());
    let audit_repo = SurrealAuditLogRepository::new(db.clone());
    let auth = AuthService::new(principal_repo.clone(), config.auth.clone());
    let recorder = AuditRecorder::new(audit_repo);

    let tenants = TenantDirectory::new(
        SurrealTenantRepository::new(db),
        principal_repo.clone(),
        auth.clone(),
        recorder.clone(),
    );
    let principals = PrincipalDirectory::new(principal_repo, auth, recorder.clone());

    if config.seed_sample_data {
        if let Some(summary) = seed::seed_sample_data(&tenants, &principals, &recorder).await? {
            for principal in &summary.principals {
                tracing::info!(email = %principal.email, role = %principal.role, "Sample principal");
            }
            tracing::info!(entries = summary.entries, "Sample audit entries written");
        }
    }

    tracing::info!("Tally server ready");
    Ok(())
}
