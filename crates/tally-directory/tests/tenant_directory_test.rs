//! Integration tests for the tenant directory using in-memory
//! SurrealDB.

use tally_audit::{AuditQueryEngine, AuditRecorder, PageRequest};
use tally_auth::{AuthConfig, AuthService};
use tally_core::error::TallyError;
use tally_core::models::context::RequestContext;
use tally_core::models::role::Role;
use tally_core::repository::{AuditLogFilter, PrincipalRepository, TenantRepository};
use tally_db::repository::{
    SurrealAuditLogRepository, SurrealPrincipalRepository, SurrealTenantRepository,
};
use tally_directory::{OnboardTenant, TenantDirectory};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

type Directory = TenantDirectory<
    SurrealTenantRepository<Db>,
    SurrealPrincipalRepository<Db>,
    SurrealAuditLogRepository<Db>,
>;

struct Fixture {
    directory: Directory,
    tenants: SurrealTenantRepository<Db>,
    principals: SurrealPrincipalRepository<Db>,
    engine: AuditQueryEngine<SurrealAuditLogRepository<Db>, SurrealPrincipalRepository<Db>>,
}

async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tally_db::run_migrations(&db).await.unwrap();

    let tenants = SurrealTenantRepository::new(db.clone());
    let principals = SurrealPrincipalRepository::new(db.clone());
    let audit = SurrealAuditLogRepository::new(db);
    let auth = AuthService::new(principals.clone(), AuthConfig::default());

    Fixture {
        directory: TenantDirectory::new(
            tenants.clone(),
            principals.clone(),
            auth,
            AuditRecorder::new(audit.clone()),
        ),
        tenants,
        principals: principals.clone(),
        engine: AuditQueryEngine::new(audit, principals),
    }
}

fn acme() -> OnboardTenant {
    OnboardTenant {
        name: "Acme".into(),
        domain: "acme.com".into(),
        owner_email: "o@acme.com".into(),
        owner_credential: "owner-secret".into(),
        owner_first_name: "Olive".into(),
        owner_last_name: "Owner".into(),
    }
}

#[tokio::test]
async fn create_and_get_tenant() {
    let fx = setup().await;

    let tenant = fx.directory.create_tenant("Acme", "acme.com").await.unwrap();
    let fetched = fx.directory.get_tenant(tenant.id).await.unwrap();

    assert_eq!(fetched.id, tenant.id);
    assert_eq!(fetched.name, "Acme");
    assert_eq!(fetched.domain, "acme.com");
}

#[tokio::test]
async fn duplicate_domain_is_case_insensitive() {
    let fx = setup().await;

    fx.directory.create_tenant("Acme", "acme.com").await.unwrap();
    let err = fx
        .directory
        .create_tenant("Imposter", " ACME.com ")
        .await
        .unwrap_err();

    assert!(
        matches!(&err, TallyError::DuplicateDomain { domain } if domain == "acme.com"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn concurrent_same_domain_has_one_winner() {
    let fx = setup().await;

    let (a, b) = tokio::join!(
        fx.directory.create_tenant("First", "race.com"),
        fx.directory.create_tenant("Second", "race.com"),
    );

    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    let loser = a.err().or(b.err()).unwrap();
    assert!(matches!(loser, TallyError::DuplicateDomain { .. }));
}

#[tokio::test]
async fn blank_name_is_rejected() {
    let fx = setup().await;

    let err = fx.directory.create_tenant("  ", "acme.com").await.unwrap_err();
    assert!(matches!(err, TallyError::Validation { .. }));
}

#[tokio::test]
async fn onboard_creates_tenant_owner_and_audit_entry() {
    let fx = setup().await;

    let onboarded = fx
        .directory
        .onboard(acme(), &RequestContext::new(Some("10.0.0.1".into()), None))
        .await
        .unwrap();

    assert_eq!(onboarded.owner.role, Role::Owner);
    assert_eq!(onboarded.owner.tenant_id, onboarded.tenant.id);
    assert!(onboarded.owner.active);

    let page = fx
        .engine
        .query(
            onboarded.tenant.id,
            &onboarded.owner,
            AuditLogFilter::default(),
            PageRequest::default(),
        )
        .await
        .unwrap();

    assert_eq!(page.entries.len(), 1);
    let entry = &page.entries[0].entry;
    assert_eq!(entry.action, "account_created");
    assert_eq!(entry.resource_type, "account");
    assert_eq!(entry.resource_id, Some(onboarded.tenant.id.to_string()));
    assert_eq!(entry.details.as_deref(), Some("Account Acme created"));
    assert_eq!(entry.actor_id, onboarded.owner.id);
    assert_eq!(entry.ip_address.as_deref(), Some("10.0.0.1"));
}

#[tokio::test]
async fn onboard_with_taken_email_leaves_no_tenant() {
    let fx = setup().await;
    fx.directory.onboard(acme(), &RequestContext::default()).await.unwrap();

    let err = fx
        .directory
        .onboard(
            OnboardTenant {
                name: "Globex".into(),
                domain: "globex.com".into(),
                ..acme()
            },
            &RequestContext::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, TallyError::DuplicateEmail { .. }));
    assert!(matches!(
        fx.tenants.get_by_domain("globex.com").await,
        Err(TallyError::NotFound { .. })
    ));
}

#[tokio::test]
async fn onboard_with_weak_credential_creates_nothing() {
    let fx = setup().await;

    let err = fx
        .directory
        .onboard(
            OnboardTenant {
                owner_credential: "short".into(),
                ..acme()
            },
            &RequestContext::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, TallyError::Validation { .. }));
    assert!(fx.tenants.get_by_domain("acme.com").await.is_err());
    assert!(fx.principals.get_by_email("o@acme.com").await.is_err());
}

#[tokio::test]
async fn principals_may_only_read_their_own_tenant() {
    let fx = setup().await;
    let acme_co = fx.directory.onboard(acme(), &RequestContext::default()).await.unwrap();
    let globex = fx
        .directory
        .onboard(
            OnboardTenant {
                name: "Globex".into(),
                domain: "globex.com".into(),
                owner_email: "o@globex.com".into(),
                ..acme()
            },
            &RequestContext::default(),
        )
        .await
        .unwrap();

    let own = fx
        .directory
        .get_tenant_for(&acme_co.owner, acme_co.tenant.id)
        .await
        .unwrap();
    assert_eq!(own.domain, "acme.com");

    let err = fx
        .directory
        .get_tenant_for(&acme_co.owner, globex.tenant.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TallyError::InsufficientPermissions { .. }));
}
