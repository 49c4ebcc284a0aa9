//! Audit trail entry entity model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use shipgate_core::types::{AuditEntryId, CredentialId, ShipmentId, TenantId, UserId};

use crate::credential::AgentType;

/// Kind of mutation an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "audit_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Shipment status moved.
    StatusChange,
    /// Date or named fields written.
    FieldUpdate,
    /// Only cost fields written.
    CostUpdate,
    /// Document reference attached.
    DocumentUpload,
    /// Journal note appended.
    NoteAdded,
    /// External credential issued.
    GrantCreated,
    /// External credential revoked.
    GrantRevoked,
    /// External credential secret rotated.
    GrantRotated,
}

impl AuditAction {
    /// Return the action as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StatusChange => "status_change",
            Self::FieldUpdate => "field_update",
            Self::CostUpdate => "cost_update",
            Self::DocumentUpload => "document_upload",
            Self::NoteAdded => "note_added",
            Self::GrantCreated => "grant_created",
            Self::GrantRevoked => "grant_revoked",
            Self::GrantRotated => "grant_rotated",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the actor was internal staff or an external agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "audit_origin", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuditOrigin {
    /// Tenant staff.
    Internal,
    /// Holder of an external credential.
    External,
}

/// Who performed a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "lowercase")]
pub enum Actor {
    /// Tenant staff, identified by the surrounding identity system.
    Internal {
        /// Staff user id.
        user_id: UserId,
    },
    /// External agent acting through a credential.
    External {
        /// Credential used.
        credential_id: CredentialId,
        /// Agent classification.
        agent_type: AgentType,
        /// Agent display name.
        agent_name: String,
    },
}

impl Actor {
    /// Origin tag for this actor.
    pub fn origin(&self) -> AuditOrigin {
        match self {
            Self::Internal { .. } => AuditOrigin::Internal,
            Self::External { .. } => AuditOrigin::External,
        }
    }

    /// Display name used in journal lines.
    pub fn display_name(&self) -> String {
        match self {
            Self::Internal { user_id } => format!("staff {user_id}"),
            Self::External {
                agent_type,
                agent_name,
                ..
            } => format!("{agent_name} ({agent_type})"),
        }
    }
}

/// One immutable audit record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditEntry {
    /// Unique, time-ordered entry identifier.
    pub id: AuditEntryId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Shipment the mutation touched.
    pub shipment_id: ShipmentId,
    /// Credential used (`None` for internal actors).
    pub credential_id: Option<CredentialId>,
    /// Internal actor (`None` for external agents).
    pub actor_user_id: Option<UserId>,
    /// External agent classification.
    pub actor_agent_type: Option<AgentType>,
    /// External agent display name.
    pub actor_name: Option<String>,
    /// Internal or external.
    pub origin: AuditOrigin,
    /// What was done.
    pub action: AuditAction,
    /// Field name for single-field mutations.
    pub field_name: Option<String>,
    /// Previous value as text.
    pub old_value: Option<String>,
    /// New value as text.
    pub new_value: Option<String>,
    /// Free-form note supplied with the mutation.
    pub note: Option<String>,
    /// Origin network address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
    /// Structured detail (all before/after pairs of a batch, grant data).
    pub details: Option<serde_json::Value>,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Reconstruct the actor descriptor.
    pub fn actor(&self) -> Option<Actor> {
        match self.origin {
            AuditOrigin::Internal => self.actor_user_id.map(|user_id| Actor::Internal { user_id }),
            AuditOrigin::External => Some(Actor::External {
                credential_id: self.credential_id?,
                agent_type: self.actor_agent_type?,
                agent_name: self.actor_name.clone()?,
            }),
        }
    }
}

/// Data required to append an audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuditEntry {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Shipment the mutation touched.
    pub shipment_id: ShipmentId,
    /// Who performed it.
    pub actor: Actor,
    /// What was done.
    pub action: AuditAction,
    /// Field name for single-field mutations.
    pub field_name: Option<String>,
    /// Previous value.
    pub old_value: Option<String>,
    /// New value.
    pub new_value: Option<String>,
    /// Accompanying note.
    pub note: Option<String>,
    /// Origin network address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
    /// Structured detail.
    pub details: Option<serde_json::Value>,
}

impl NewAuditEntry {
    /// Materialize the stored row.
    pub fn into_entry(self, id: AuditEntryId, created_at: DateTime<Utc>) -> AuditEntry {
        let (credential_id, actor_user_id, actor_agent_type, actor_name) = match &self.actor {
            Actor::Internal { user_id } => (None, Some(*user_id), None, None),
            Actor::External {
                credential_id,
                agent_type,
                agent_name,
            } => (
                Some(*credential_id),
                None,
                Some(*agent_type),
                Some(agent_name.clone()),
            ),
        };
        AuditEntry {
            id,
            tenant_id: self.tenant_id,
            shipment_id: self.shipment_id,
            credential_id,
            actor_user_id,
            actor_agent_type,
            actor_name,
            origin: self.actor.origin(),
            action: self.action,
            field_name: self.field_name,
            old_value: self.old_value,
            new_value: self.new_value,
            note: self.note,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            details: self.details,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_entry(actor: Actor) -> NewAuditEntry {
        NewAuditEntry {
            tenant_id: TenantId::new(),
            shipment_id: ShipmentId::new(),
            actor,
            action: AuditAction::NoteAdded,
            field_name: None,
            old_value: None,
            new_value: None,
            note: Some("Container sealed".to_string()),
            ip_address: Some("203.0.113.7".to_string()),
            user_agent: None,
            details: None,
        }
    }

    #[test]
    fn test_external_actor_roundtrip() {
        let actor = Actor::External {
            credential_id: CredentialId::new(),
            agent_type: AgentType::Carrier,
            agent_name: "Oceanic".to_string(),
        };
        let entry = new_entry(actor.clone()).into_entry(AuditEntryId::new(), Utc::now());
        assert_eq!(entry.origin, AuditOrigin::External);
        assert!(entry.actor_user_id.is_none());
        assert_eq!(entry.actor(), Some(actor));
    }

    #[test]
    fn test_internal_actor_has_no_credential() {
        let user_id = UserId::new();
        let entry = new_entry(Actor::Internal { user_id })
            .into_entry(AuditEntryId::new(), Utc::now());
        assert_eq!(entry.origin, AuditOrigin::Internal);
        assert!(entry.credential_id.is_none());
        assert_eq!(entry.actor(), Some(Actor::Internal { user_id }));
    }
}
