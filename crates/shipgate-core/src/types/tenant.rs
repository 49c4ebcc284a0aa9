//! Tenant scope handle threaded through every storage call.

use std::fmt;

use serde::Serialize;

use super::id::TenantId;
use crate::error::AppError;

/// Proof that a request has been bound to exactly one tenant.
///
/// Store methods take a `&TenantScope` rather than a bare [`TenantId`], so
/// a query path cannot be written without first obtaining a scope from an
/// authenticated credential or staff token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TenantScope {
    tenant_id: TenantId,
}

impl TenantScope {
    /// Bind a scope to the given tenant.
    pub fn bind(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }

    /// The tenant this scope is bound to.
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Fail with `NotFound` when a loaded row belongs to another tenant.
    ///
    /// Cross-tenant rows are reported as missing so their existence is not
    /// disclosed.
    pub fn ensure_owns(&self, owner: TenantId, what: &str) -> Result<(), AppError> {
        if owner == self.tenant_id {
            Ok(())
        } else {
            Err(AppError::not_found(format!("{what} not found")))
        }
    }
}

impl fmt::Display for TenantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tenant:{}", self.tenant_id)
    }
}
