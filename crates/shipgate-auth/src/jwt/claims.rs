//! Claims carried by staff tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shipgate_core::types::{TenantId, UserId};

/// JWT claims payload for an internal staff user.
///
/// Staff identity and roles are owned by the surrounding system; the gateway
/// only needs to know who the user is and which tenant they act for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffClaims {
    /// Subject: the staff user id.
    pub sub: UserId,
    /// Tenant the user acts for.
    pub tenant_id: TenantId,
    /// Display name, for logs.
    #[serde(default)]
    pub name: Option<String>,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
    /// Token id.
    pub jti: Uuid,
}

impl StaffClaims {
    /// Expiration as a timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}
