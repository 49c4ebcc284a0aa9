//! External credential entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use shipgate_core::AppError;
use shipgate_core::types::{CredentialId, ShipmentId, TenantId, UserId};

use super::agent::{AgentDescriptor, AgentType};
use super::capability::CapabilitySet;

/// One issued access grant.
///
/// Never physically deleted: the active flag and expiry are the only
/// invalidation mechanisms, so the audit trail can always resolve the
/// credential an entry refers to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExternalCredential {
    /// Unique credential identifier.
    pub id: CredentialId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// The single shipment this credential grants access to.
    pub shipment_id: ShipmentId,
    /// Non-secret public identifier embedded in the issued token.
    #[serde(skip_serializing)]
    pub lookup_key: Option<String>,
    /// Argon2id PHC string of the token secret.
    #[serde(skip_serializing)]
    pub secret_hash: String,
    /// Agent classification.
    pub agent_type: AgentType,
    /// Agent display name.
    pub agent_name: String,
    /// Agent contact email.
    pub agent_email: Option<String>,
    /// Agent contact phone.
    pub agent_phone: Option<String>,
    /// Stored capability set (see [`CapabilitySet::from_stored`]).
    pub capabilities: serde_json::Value,
    /// Whether the credential has not been revoked.
    pub is_active: bool,
    /// Hard expiry.
    pub expires_at: DateTime<Utc>,
    /// Last successful authentication.
    pub last_used_at: Option<DateTime<Utc>>,
    /// Successful authentications since issue or last rotation.
    pub use_count: i64,
    /// Internal user who issued the grant.
    pub created_by: UserId,
    /// When the grant was issued.
    pub created_at: DateTime<Utc>,
    /// When the grant was revoked.
    pub revoked_at: Option<DateTime<Utc>>,
    /// When the secret was last rotated.
    pub rotated_at: Option<DateTime<Utc>>,
}

impl ExternalCredential {
    /// Whether the credential has expired at the given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// The agent this credential speaks for.
    pub fn agent(&self) -> AgentDescriptor {
        AgentDescriptor {
            agent_type: self.agent_type,
            name: self.agent_name.clone(),
            email: self.agent_email.clone(),
            phone: self.agent_phone.clone(),
        }
    }

    /// Decode the stored capability set.
    pub fn capability_set(&self) -> Result<CapabilitySet, AppError> {
        CapabilitySet::from_stored(&self.capabilities)
    }

    /// Build the capability-bearing view handed to the rest of a request.
    pub fn to_view(&self) -> Result<CredentialView, AppError> {
        Ok(CredentialView {
            credential_id: self.id,
            tenant_id: self.tenant_id,
            shipment_id: self.shipment_id,
            agent: self.agent(),
            capabilities: self.capability_set()?,
            expires_at: self.expires_at,
        })
    }
}

/// The result of a successful authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialView {
    /// Credential identifier.
    pub credential_id: CredentialId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Target shipment.
    pub shipment_id: ShipmentId,
    /// Agent descriptor.
    pub agent: AgentDescriptor,
    /// Decoded capability set.
    pub capabilities: CapabilitySet,
    /// Expiry, surfaced so agents can see how long access lasts.
    pub expires_at: DateTime<Utc>,
}

/// Data required to persist a new credential.
#[derive(Debug, Clone)]
pub struct CreateCredential {
    /// Identifier assigned before the write.
    pub id: CredentialId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Target shipment.
    pub shipment_id: ShipmentId,
    /// Public lookup key.
    pub lookup_key: String,
    /// Argon2id PHC string.
    pub secret_hash: String,
    /// Agent descriptor.
    pub agent: AgentDescriptor,
    /// Capability set.
    pub capabilities: CapabilitySet,
    /// Hard expiry.
    pub expires_at: DateTime<Utc>,
    /// Issuing internal user.
    pub created_by: UserId,
}

impl CreateCredential {
    /// Materialize the stored row.
    pub fn into_credential(self, created_at: DateTime<Utc>) -> ExternalCredential {
        ExternalCredential {
            id: self.id,
            tenant_id: self.tenant_id,
            shipment_id: self.shipment_id,
            lookup_key: Some(self.lookup_key),
            secret_hash: self.secret_hash,
            agent_type: self.agent.agent_type,
            agent_name: self.agent.name,
            agent_email: self.agent.email,
            agent_phone: self.agent.phone,
            capabilities: self.capabilities.to_stored(),
            is_active: true,
            expires_at: self.expires_at,
            last_used_at: None,
            use_count: 0,
            created_by: self.created_by,
            created_at,
            revoked_at: None,
            rotated_at: None,
        }
    }
}

/// Replacement secret material for a rotation.
#[derive(Debug, Clone)]
pub struct RotateCredential {
    /// New public lookup key.
    pub lookup_key: String,
    /// New Argon2id PHC string.
    pub secret_hash: String,
}
