//! Sample data: one store with a principal per role and a hundred
//! random audit entries.

use rand::Rng;
use rand::seq::IndexedRandom;
use tally_audit::AuditRecorder;
use tally_core::error::{TallyError, TallyResult};
use tally_core::models::audit::AuditEvent;
use tally_core::models::context::RequestContext;
use tally_core::models::principal::{NewPrincipal, Principal};
use tally_core::models::role::Role;
use tally_core::repository::{AuditLogRepository, PrincipalRepository, TenantRepository};
use tally_directory::{OnboardTenant, PrincipalDirectory, TenantDirectory};
use tracing::info;

pub const SAMPLE_DOMAIN: &str = "sample-store.com";
const SAMPLE_ENTRIES: usize = 100;
const SAMPLE_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const SAMPLE_ACTIONS: &[&str] = &[
    "user_login",
    "user_logout",
    "product_created",
    "product_updated",
    "order_created",
    "order_cancelled",
    "user_created",
    "user_updated",
    "inventory_updated",
    "price_changed",
    "category_created",
];

const SAMPLE_RESOURCE_TYPES: &[&str] = &["user", "product", "order", "inventory", "category"];

/// (email, credential, first name, last name, role) for the non-owner
/// members.
const SAMPLE_MEMBERS: &[(&str, &str, &str, &str, Role)] = &[
    ("admin@sample-store.com", "admin123", "Jane", "Admin", Role::Admin),
    ("analyst@sample-store.com", "analyst123", "Bob", "Analyst", Role::Analyst),
    ("creator@sample-store.com", "creator123", "Alice", "Creator", Role::ContentCreator),
];

#[derive(Debug)]
pub struct SeedSummary {
    pub principals: Vec<Principal>,
    pub entries: usize,
}

struct PlannedEntry {
    actor: usize,
    action: &'static str,
    resource_type: &'static str,
    resource_id: u32,
    client_ip: String,
}

/// Drawn up front; the thread-local RNG must not live across an await.
fn plan_entries(actors: usize, count: usize) -> Vec<PlannedEntry> {
    let mut rng = rand::rng();
    (0..count)
        .map(|_| PlannedEntry {
            actor: rng.random_range(0..actors),
            action: SAMPLE_ACTIONS.choose(&mut rng).copied().unwrap_or("user_login"),
            resource_type: SAMPLE_RESOURCE_TYPES
                .choose(&mut rng)
                .copied()
                .unwrap_or("user"),
            resource_id: rng.random_range(1..=1000),
            client_ip: format!("192.168.1.{}", rng.random_range(1..=255)),
        })
        .collect()
}

/// Create the sample store unless its domain is already taken. Returns
/// `None` when the data was seeded on an earlier run.
pub async fn seed_sample_data<T, P, A>(
    tenants: &TenantDirectory<T, P, A>,
    principals: &PrincipalDirectory<P, A>,
    recorder: &AuditRecorder<A>,
) -> TallyResult<Option<SeedSummary>>
where
    T: TenantRepository,
    P: PrincipalRepository,
    A: AuditLogRepository,
{
    let ctx = RequestContext::default();

    let onboarded = match tenants
        .onboard(
            OnboardTenant {
                name: "Sample Ecommerce Store".into(),
                domain: SAMPLE_DOMAIN.into(),
                owner_email: "owner@sample-store.com".into(),
                owner_credential: "owner123".into(),
                owner_first_name: "John".into(),
                owner_last_name: "Owner".into(),
            },
            &ctx,
        )
        .await
    {
        Ok(onboarded) => onboarded,
        Err(TallyError::DuplicateDomain { .. }) => {
            info!(domain = SAMPLE_DOMAIN, "Sample data already present");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let owner = onboarded.owner;
    let mut members = vec![owner.clone()];
    for (email, credential, first_name, last_name, role) in SAMPLE_MEMBERS {
        let member = principals
            .create_principal(
                &owner,
                onboarded.tenant.id,
                NewPrincipal {
                    email: (*email).into(),
                    credential: (*credential).into(),
                    first_name: (*first_name).into(),
                    last_name: (*last_name).into(),
                    role: *role,
                },
                &ctx,
            )
            .await?;
        members.push(member);
    }

    let plan = plan_entries(members.len(), SAMPLE_ENTRIES);
    for planned in &plan {
        let actor = &members[planned.actor];
        recorder
            .record(
                actor,
                AuditEvent::new(planned.action, planned.resource_type)
                    .resource_id(planned.resource_id)
                    .details(format!(
                        "Sample {} action performed by {} {}",
                        planned.action, actor.first_name, actor.last_name
                    )),
                &RequestContext::new(
                    Some(planned.client_ip.clone()),
                    Some(SAMPLE_USER_AGENT.into()),
                ),
            )
            .await?;
    }

    info!(
        tenant_id = %onboarded.tenant.id,
        principals = members.len(),
        entries = plan.len(),
        "Sample data seeded"
    );

    Ok(Some(SeedSummary {
        principals: members,
        entries: plan.len(),
    }))
}

#[cfg(test)]
mod tests {
    use surrealdb::Surreal;
    use surrealdb::engine::local::Mem;
    use tally_audit::{AuditQueryEngine, PageRequest};
    use tally_auth::{AuthConfig, AuthService};
    use tally_core::repository::AuditLogFilter;
    use tally_db::repository::{
        SurrealAuditLogRepository, SurrealPrincipalRepository, SurrealTenantRepository,
    };

    use super::*;

    #[test]
    fn plan_stays_within_sample_vocabulary() {
        let plan = plan_entries(4, 200);
        assert_eq!(plan.len(), 200);
        for entry in &plan {
            assert!(entry.actor < 4);
            assert!(SAMPLE_ACTIONS.contains(&entry.action));
            assert!(SAMPLE_RESOURCE_TYPES.contains(&entry.resource_type));
            assert!((1..=1000).contains(&entry.resource_id));
            assert!(entry.client_ip.starts_with("192.168.1."));
        }
    }

    #[tokio::test]
    async fn seeds_once_and_is_queryable() {
        let db = Surreal::new::<Mem>(()).await.unwrap();
        db.use_ns("test").use_db("test").await.unwrap();
        tally_db::run_migrations(&db).await.unwrap();

        let principal_repo = SurrealPrincipalRepository::new(db.clone());
        let audit_repo = SurrealAuditLogRepository::new(db.clone());
        let auth = AuthService::new(principal_repo.clone(), AuthConfig::default());
        let recorder = AuditRecorder::new(audit_repo.clone());
        let tenants = TenantDirectory::new(
            SurrealTenantRepository::new(db),
            principal_repo.clone(),
            auth.clone(),
            recorder.clone(),
        );
        let principals = PrincipalDirectory::new(principal_repo.clone(), auth, recorder.clone());

        let summary = seed_sample_data(&tenants, &principals, &recorder)
            .await
            .unwrap()
            .expect("first run seeds");
        assert_eq!(summary.principals.len(), 4);
        assert_eq!(summary.entries, SAMPLE_ENTRIES);

        let roles: Vec<Role> = summary.principals.iter().map(|p| p.role).collect();
        assert_eq!(roles, Role::ALL);

        let second = seed_sample_data(&tenants, &principals, &recorder).await.unwrap();
        assert!(second.is_none());

        let owner = &summary.principals[0];
        let page = AuditQueryEngine::new(audit_repo, principal_repo)
            .query(
                owner.tenant_id,
                owner,
                AuditLogFilter::default(),
                PageRequest::new(1, 100),
            )
            .await
            .unwrap();
        // account_created + three user_created + the random entries.
        assert_eq!(page.page_info.total, 104);
        assert_eq!(page.page_info.pages, 2);

        principals
            .authenticate("analyst@sample-store.com", "analyst123")
            .await
            .unwrap();
    }
}
