//! Binding authenticated callers to their tenant.

use tracing::debug;

use shipgate_core::types::TenantScope;
use shipgate_entity::credential::CredentialView;

use crate::jwt::StaffClaims;

/// Produces the [`TenantScope`] every downstream store call requires.
///
/// The scope is derived from the authenticated identity only, never from
/// request parameters, so a caller cannot name another tenant.
#[derive(Debug, Clone, Copy, Default)]
pub struct TenantContextBinder;

impl TenantContextBinder {
    /// Create a binder.
    pub fn new() -> Self {
        Self
    }

    /// Scope for an external agent.
    pub fn bind(&self, view: &CredentialView) -> TenantScope {
        let scope = TenantScope::bind(view.tenant_id);
        debug!(credential_id = %view.credential_id, %scope, "Bound external request to tenant");
        scope
    }

    /// Scope for an internal staff user.
    pub fn bind_staff(&self, claims: &StaffClaims) -> TenantScope {
        let scope = TenantScope::bind(claims.tenant_id);
        debug!(user_id = %claims.sub, %scope, "Bound staff request to tenant");
        scope
    }
}
