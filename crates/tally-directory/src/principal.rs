//! Principal directory: user creation, listing, activation and the
//! audited login/logout flows.

use tally_audit::AuditRecorder;
use tally_auth::AuthService;
use tally_core::access::require_tenant_admin;
use tally_core::error::{TallyError, TallyResult};
use tally_core::models::audit::{AuditEvent, actions, resources};
use tally_core::models::context::RequestContext;
use tally_core::models::principal::{CreatePrincipal, NewPrincipal, Principal, normalize_email};
use tally_core::models::role::Role;
use tally_core::repository::{AuditLogRepository, PrincipalRepository};
use tracing::{info, warn};
use uuid::Uuid;

use crate::validate;

pub struct PrincipalDirectory<P, A>
where
    P: PrincipalRepository,
    A: AuditLogRepository,
{
    principals: P,
    auth: AuthService<P>,
    recorder: AuditRecorder<A>,
}

impl<P, A> PrincipalDirectory<P, A>
where
    P: PrincipalRepository,
    A: AuditLogRepository,
{
    pub fn new(principals: P, auth: AuthService<P>, recorder: AuditRecorder<A>) -> Self {
        Self {
            principals,
            auth,
            recorder,
        }
    }

    fn authorize(&self, requester: &Principal, tenant_id: Uuid, operation: &str) -> TallyResult<()> {
        require_tenant_admin(requester, tenant_id).inspect_err(|e| {
            warn!(
                %tenant_id,
                requester_id = %requester.id,
                role = %requester.role,
                operation,
                error = %e,
                "Directory operation denied"
            );
        })
    }

    /// Create a principal in `tenant_id`. Owner cannot be granted here.
    pub async fn create_principal(
        &self,
        requester: &Principal,
        tenant_id: Uuid,
        input: NewPrincipal,
        ctx: &RequestContext,
    ) -> TallyResult<Principal> {
        self.authorize(requester, tenant_id, "create_principal")?;

        if !input.role.is_assignable() {
            return Err(TallyError::InvalidRole {
                role: input.role.to_string(),
            });
        }

        let email = normalize_email(&input.email);
        validate::email(&email)?;
        validate::non_empty("first_name", &input.first_name)?;
        validate::non_empty("last_name", &input.last_name)?;
        let credential_hash = self.auth.hash_credential(&input.credential)?;

        let principal = self
            .principals
            .create(CreatePrincipal {
                tenant_id,
                email,
                credential_hash,
                first_name: input.first_name.trim().to_string(),
                last_name: input.last_name.trim().to_string(),
                role: input.role,
            })
            .await?;

        info!(
            %tenant_id,
            principal_id = %principal.id,
            role = %principal.role,
            created_by = %requester.id,
            "Principal created"
        );

        self.recorder
            .record_best_effort(
                requester,
                AuditEvent::new(actions::USER_CREATED, resources::USER)
                    .resource_id(principal.id)
                    .details(format!(
                        "User {} created with role {}",
                        principal.email, principal.role
                    )),
                ctx,
            )
            .await;

        Ok(principal)
    }

    /// Credential check without side effects.
    pub async fn authenticate(&self, email: &str, credential: &str) -> TallyResult<Principal> {
        self.auth.authenticate(email, credential).await
    }

    /// Authenticate and record `user_login`.
    pub async fn login(
        &self,
        email: &str,
        credential: &str,
        ctx: &RequestContext,
    ) -> TallyResult<Principal> {
        let principal = self.auth.authenticate(email, credential).await?;

        info!(tenant_id = %principal.tenant_id, principal_id = %principal.id, "Login");
        self.recorder
            .record_best_effort(
                &principal,
                AuditEvent::new(actions::USER_LOGIN, resources::USER)
                    .resource_id(principal.id)
                    .details("User logged in successfully"),
                ctx,
            )
            .await;

        Ok(principal)
    }

    /// Record `user_logout`. Session teardown belongs to the caller.
    pub async fn logout(&self, principal: &Principal, ctx: &RequestContext) {
        info!(tenant_id = %principal.tenant_id, principal_id = %principal.id, "Logout");
        self.recorder
            .record_best_effort(
                principal,
                AuditEvent::new(actions::USER_LOGOUT, resources::USER)
                    .resource_id(principal.id)
                    .details("User logged out"),
                ctx,
            )
            .await;
    }

    /// All principals of the tenant in creation order.
    pub async fn list_principals(
        &self,
        requester: &Principal,
        tenant_id: Uuid,
    ) -> TallyResult<Vec<Principal>> {
        self.authorize(requester, tenant_id, "list_principals")?;
        self.principals.list(tenant_id).await
    }

    /// Soft-disable or re-enable a principal. An owner cannot be
    /// deactivated.
    pub async fn set_active(
        &self,
        requester: &Principal,
        tenant_id: Uuid,
        principal_id: Uuid,
        active: bool,
        ctx: &RequestContext,
    ) -> TallyResult<Principal> {
        self.authorize(requester, tenant_id, "set_active")?;

        let target = self.principals.get_by_id(tenant_id, principal_id).await?;
        if target.role == Role::Owner && !active {
            return Err(TallyError::validation("the tenant owner cannot be deactivated"));
        }

        let updated = self
            .principals
            .set_active(tenant_id, principal_id, active)
            .await?;

        let (action, verb) = if active {
            (actions::USER_ACTIVATED, "activated")
        } else {
            (actions::USER_DEACTIVATED, "deactivated")
        };
        info!(%tenant_id, %principal_id, active, changed_by = %requester.id, "Principal {verb}");

        self.recorder
            .record_best_effort(
                requester,
                AuditEvent::new(action, resources::USER)
                    .resource_id(updated.id)
                    .details(format!("User {} {verb}", updated.email)),
                ctx,
            )
            .await;

        Ok(updated)
    }
}
