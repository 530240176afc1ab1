//! Tenant directory: tenant creation, lookup and onboarding.

use serde::Deserialize;
use tally_audit::AuditRecorder;
use tally_auth::AuthService;
use tally_core::access::require_member;
use tally_core::error::TallyResult;
use tally_core::models::audit::{AuditEvent, actions, resources};
use tally_core::models::context::RequestContext;
use tally_core::models::principal::{CreatePrincipal, Principal, normalize_email};
use tally_core::models::role::Role;
use tally_core::models::tenant::{CreateTenant, Tenant, normalize_domain};
use tally_core::repository::{AuditLogRepository, PrincipalRepository, TenantRepository};
use tracing::{error, info};
use uuid::Uuid;

use crate::validate;

/// Everything needed to open a new account: the tenant and its owner.
#[derive(Debug, Clone, Deserialize)]
pub struct OnboardTenant {
    pub name: String,
    pub domain: String,
    pub owner_email: String,
    pub owner_credential: String,
    pub owner_first_name: String,
    pub owner_last_name: String,
}

#[derive(Debug, Clone)]
pub struct Onboarded {
    pub tenant: Tenant,
    pub owner: Principal,
}

pub struct TenantDirectory<T, P, A>
where
    T: TenantRepository,
    P: PrincipalRepository,
    A: AuditLogRepository,
{
    tenants: T,
    principals: P,
    auth: AuthService<P>,
    recorder: AuditRecorder<A>,
}

impl<T, P, A> TenantDirectory<T, P, A>
where
    T: TenantRepository,
    P: PrincipalRepository,
    A: AuditLogRepository,
{
    pub fn new(tenants: T, principals: P, auth: AuthService<P>, recorder: AuditRecorder<A>) -> Self {
        Self {
            tenants,
            principals,
            auth,
            recorder,
        }
    }

    /// Register a tenant. Writes no audit entry; there is no actor yet.
    pub async fn create_tenant(&self, name: &str, domain: &str) -> TallyResult<Tenant> {
        let name = name.trim();
        let domain = normalize_domain(domain);
        validate::non_empty("name", name)?;
        validate::non_empty("domain", &domain)?;

        let tenant = self
            .tenants
            .create(CreateTenant {
                name: name.to_string(),
                domain,
            })
            .await?;

        info!(tenant_id = %tenant.id, domain = %tenant.domain, "Tenant created");
        Ok(tenant)
    }

    pub async fn get_tenant(&self, id: Uuid) -> TallyResult<Tenant> {
        self.tenants.get_by_id(id).await
    }

    /// A principal may only read its own tenant.
    pub async fn get_tenant_for(&self, requester: &Principal, id: Uuid) -> TallyResult<Tenant> {
        require_member(requester, id)?;
        self.tenants.get_by_id(id).await
    }

    /// Create a tenant together with its owner, then record
    /// `account_created` with the owner as actor.
    ///
    /// If the owner cannot be created the tenant is removed again and
    /// the owner's error is returned.
    pub async fn onboard(
        &self,
        input: OnboardTenant,
        ctx: &RequestContext,
    ) -> TallyResult<Onboarded> {
        let email = normalize_email(&input.owner_email);
        validate::email(&email)?;
        validate::non_empty("first_name", &input.owner_first_name)?;
        validate::non_empty("last_name", &input.owner_last_name)?;
        let credential_hash = self.auth.hash_credential(&input.owner_credential)?;

        let tenant = self.create_tenant(&input.name, &input.domain).await?;

        let owner = match self
            .principals
            .create(CreatePrincipal {
                tenant_id: tenant.id,
                email,
                credential_hash,
                first_name: input.owner_first_name.trim().to_string(),
                last_name: input.owner_last_name.trim().to_string(),
                role: Role::Owner,
            })
            .await
        {
            Ok(owner) => owner,
            Err(e) => {
                if let Err(cleanup) = self.tenants.delete(tenant.id).await {
                    error!(
                        tenant_id = %tenant.id,
                        error = %cleanup,
                        "Failed to remove tenant after owner creation failed"
                    );
                }
                return Err(e);
            }
        };

        info!(tenant_id = %tenant.id, owner_id = %owner.id, "Tenant onboarded");

        self.recorder
            .record_best_effort(
                &owner,
                AuditEvent::new(actions::ACCOUNT_CREATED, resources::ACCOUNT)
                    .resource_id(tenant.id)
                    .details(format!("Account {} created", tenant.name)),
                ctx,
            )
            .await;

        Ok(Onboarded { tenant, owner })
    }
}
