//! Builds audit entries from the request context and reads the trail.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use shipgate_core::result::AppResult;
use shipgate_core::types::{PageRequest, PageResponse, ShipmentId, TenantScope};
use shipgate_database::store::AuditStore;
use shipgate_entity::audit::{AuditAction, AuditEntry, NewAuditEntry};
use shipgate_entity::credential::ExternalCredential;
use shipgate_entity::shipment::{ShipmentDocument, ShipmentStatus};

use crate::capability::FieldChange;
use crate::context::RequestContext;

/// Audit logger.
///
/// Entries for mutations are built here and handed to the store together
/// with the mutation, so the two commit in one transaction. Reading the
/// trail is the only other operation; nothing updates or deletes entries.
#[derive(Clone)]
pub struct AuditLogger {
    store: Arc<dyn AuditStore>,
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger").finish_non_exhaustive()
    }
}

impl AuditLogger {
    /// Creates a new audit logger.
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Entries for a shipment, newest first, confined to the scope.
    pub async fn trail(
        &self,
        scope: &TenantScope,
        shipment_id: ShipmentId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditEntry>> {
        let trail = self.store.trail(scope, shipment_id, page).await?;
        debug!(
            shipment_id = %shipment_id,
            returned = trail.items.len(),
            total = trail.total_items,
            "Read audit trail"
        );
        Ok(trail)
    }

    /// Entry for an accepted field batch.
    ///
    /// A batch touching only cost fields is a `cost_update`, anything else a
    /// `field_update`. Single-field batches also fill the field/old/new
    /// columns; every pair is always kept in `details`.
    pub fn field_changes(
        ctx: &RequestContext,
        shipment_id: ShipmentId,
        changes: &[FieldChange],
        cost_only: bool,
    ) -> NewAuditEntry {
        let action = if cost_only {
            AuditAction::CostUpdate
        } else {
            AuditAction::FieldUpdate
        };
        let mut entry = Self::base(ctx, shipment_id, action);
        if let [single] = changes {
            entry.field_name = Some(single.field.as_str().to_string());
            entry.old_value = single.old_value.clone();
            entry.new_value = Some(single.new_value.clone());
        }
        entry.details = Some(json!({ "changes": changes }));
        entry
    }

    /// Entry for an accepted status transition.
    pub fn status_change(
        ctx: &RequestContext,
        shipment_id: ShipmentId,
        from: ShipmentStatus,
        to: ShipmentStatus,
        note: Option<String>,
    ) -> NewAuditEntry {
        let mut entry = Self::base(ctx, shipment_id, AuditAction::StatusChange);
        entry.field_name = Some("status".to_string());
        entry.old_value = Some(from.to_string());
        entry.new_value = Some(to.to_string());
        entry.note = note;
        entry
    }

    /// Entry for an attached document reference.
    pub fn document_upload(ctx: &RequestContext, document: &ShipmentDocument) -> NewAuditEntry {
        let mut entry = Self::base(ctx, document.shipment_id, AuditAction::DocumentUpload);
        entry.new_value = Some(document.file_name.clone());
        entry.details = Some(json!({
            "document_id": document.id,
            "document_type": document.document_type,
            "file_name": document.file_name,
            "url": document.url,
        }));
        entry
    }

    /// Entry for a journal note.
    pub fn note_added(ctx: &RequestContext, shipment_id: ShipmentId, note: &str) -> NewAuditEntry {
        let mut entry = Self::base(ctx, shipment_id, AuditAction::NoteAdded);
        entry.note = Some(note.to_string());
        entry
    }

    /// Entry for a grant lifecycle action by staff.
    pub fn grant(
        ctx: &RequestContext,
        action: AuditAction,
        credential: &ExternalCredential,
    ) -> NewAuditEntry {
        let mut entry = Self::base(ctx, credential.shipment_id, action);
        entry.details = Some(json!({
            "credential_id": credential.id,
            "agent_type": credential.agent_type,
            "agent_name": credential.agent_name,
            "capabilities": credential.capabilities,
            "expires_at": credential.expires_at,
        }));
        entry
    }

    fn base(ctx: &RequestContext, shipment_id: ShipmentId, action: AuditAction) -> NewAuditEntry {
        NewAuditEntry {
            tenant_id: ctx.scope.tenant_id(),
            shipment_id,
            actor: ctx.actor.clone(),
            action,
            field_name: None,
            old_value: None,
            new_value: None,
            note: None,
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
            details: None,
        }
    }
}
