//! Authorization gate used by the directory and audit services.
//!
//! Every check takes the requesting principal explicitly; there is no
//! ambient "current user".

use uuid::Uuid;

use crate::error::{TallyError, TallyResult};
use crate::models::principal::Principal;

/// Requester must hold a privileged role (owner or admin) and be active.
pub fn require_privileged(requester: &Principal) -> TallyResult<()> {
    if !requester.active {
        return Err(TallyError::forbidden("principal is inactive"));
    }
    if !requester.role.is_privileged() {
        return Err(TallyError::forbidden(format!(
            "role {} may not perform this operation",
            requester.role
        )));
    }
    Ok(())
}

/// Requester must belong to `tenant_id`.
pub fn require_member(requester: &Principal, tenant_id: Uuid) -> TallyResult<()> {
    if requester.tenant_id != tenant_id {
        return Err(TallyError::forbidden("cross-tenant access denied"));
    }
    Ok(())
}

/// Requester must be a privileged member of `tenant_id`.
pub fn require_tenant_admin(requester: &Principal, tenant_id: Uuid) -> TallyResult<()> {
    require_member(requester, tenant_id)?;
    require_privileged(requester)
}
