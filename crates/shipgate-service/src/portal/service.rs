//! External portal operations on the single shipment a credential reaches.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use shipgate_core::error::AppError;
use shipgate_core::result::AppResult;
use shipgate_core::types::{DocumentId, PageRequest, PageResponse};
use shipgate_database::store::ShipmentStore;
use shipgate_entity::audit::{Actor, AuditEntry};
use shipgate_entity::credential::CredentialView;
use shipgate_entity::shipment::{CreateDocument, Shipment, ShipmentChange, ShipmentStatus};

use super::projection::ShipmentProjection;
use crate::audit::AuditLogger;
use crate::capability::CapabilityEnforcer;
use crate::context::RequestContext;
use crate::transition::StatusTransitionEngine;

const MAX_DOCUMENT_TEXT_LEN: usize = 255;
const MAX_DOCUMENT_URL_LEN: usize = 2048;

/// A document reference supplied by an external agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    /// Free-form document type.
    pub document_type: String,
    /// Original file name.
    pub file_name: String,
    /// Opaque storage URL.
    pub url: String,
}

/// Orchestrates enforcement, transition checks, and audited commits for
/// external agents.
#[derive(Clone)]
pub struct PortalService {
    shipments: Arc<dyn ShipmentStore>,
    audit: Arc<AuditLogger>,
    enforcer: CapabilityEnforcer,
    engine: StatusTransitionEngine,
}

impl std::fmt::Debug for PortalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalService").finish_non_exhaustive()
    }
}

impl PortalService {
    /// Creates a new portal service.
    pub fn new(shipments: Arc<dyn ShipmentStore>, audit: Arc<AuditLogger>) -> Self {
        Self {
            shipments,
            audit,
            enforcer: CapabilityEnforcer::new(),
            engine: StatusTransitionEngine::new(),
        }
    }

    /// Scoped projection of the credential's shipment.
    pub async fn get_shipment(
        &self,
        ctx: &RequestContext,
        view: &CredentialView,
    ) -> AppResult<ShipmentProjection> {
        let shipment = self.load(ctx, view).await?;
        self.project(ctx, view, shipment).await
    }

    /// Apply a batch of field writes, all or nothing.
    pub async fn update_fields(
        &self,
        ctx: &RequestContext,
        view: &CredentialView,
        body: &Map<String, Value>,
    ) -> AppResult<ShipmentProjection> {
        let shipment = self.load(ctx, view).await?;
        let batch = self
            .enforcer
            .authorize_batch(&view.capabilities, &shipment, body)?;

        let entry =
            AuditLogger::field_changes(ctx, shipment.id, &batch.changes, batch.is_cost_only());
        let fields: Vec<&str> = batch.changes.iter().map(|c| c.field.as_str()).collect();
        let updated = self
            .shipments
            .commit(
                &ctx.scope,
                shipment.id,
                ShipmentChange::Fields {
                    updates: batch.updates,
                },
                entry,
            )
            .await?;

        info!(
            shipment_id = %updated.id,
            credential_id = %view.credential_id,
            fields = ?fields,
            "External field update applied"
        );
        self.project(ctx, view, updated).await
    }

    /// Move the shipment to a new status.
    ///
    /// An accompanying note is appended to the journal in the same commit,
    /// tagged with the new status and the agent's display name.
    pub async fn change_status(
        &self,
        ctx: &RequestContext,
        view: &CredentialView,
        to: ShipmentStatus,
        note: Option<&str>,
    ) -> AppResult<ShipmentProjection> {
        let note = match note {
            Some(text) if !text.trim().is_empty() => Some(self.enforcer.authorize_note(text)?),
            _ => None,
        };

        let shipment = self.load(ctx, view).await?;
        let from = shipment.status;
        if let Err(rejection) = self
            .engine
            .attempt_transition(from, to, &view.capabilities)
        {
            info!(
                shipment_id = %shipment.id,
                credential_id = %view.credential_id,
                from = %from,
                to = %to,
                reason = %rejection,
                "Status transition rejected"
            );
            return Err(rejection.into());
        }

        let change = ShipmentChange::Status {
            to,
            stamp_at: self.engine.stamp_for(to, ctx.request_time),
            note_line: note.as_deref().map(|text| journal_line(ctx, to, text)),
        };
        let entry = AuditLogger::status_change(ctx, shipment.id, from, to, note);
        let updated = self
            .shipments
            .commit(&ctx.scope, shipment.id, change, entry)
            .await?;

        info!(
            shipment_id = %updated.id,
            credential_id = %view.credential_id,
            from = %from,
            to = %to,
            "External status change applied"
        );
        self.project(ctx, view, updated).await
    }

    /// Attach a document reference.
    pub async fn add_document(
        &self,
        ctx: &RequestContext,
        view: &CredentialView,
        document: NewDocument,
    ) -> AppResult<ShipmentProjection> {
        self.enforcer
            .authorize_document_upload(&view.capabilities)?;
        let document = validate_document(document)?;

        let shipment = self.load(ctx, view).await?;
        let create = CreateDocument {
            id: DocumentId::new(),
            document_type: document.document_type,
            file_name: document.file_name,
            url: document.url,
            uploaded_by_credential: match ctx.actor {
                Actor::External { credential_id, .. } => Some(credential_id),
                Actor::Internal { .. } => None,
            },
            uploaded_by_name: ctx.actor.display_name(),
        };
        let entry = AuditLogger::document_upload(
            ctx,
            &create
                .clone()
                .into_document(ctx.scope.tenant_id(), shipment.id, ctx.request_time),
        );
        let document_id = create.id;
        let updated = self
            .shipments
            .commit(
                &ctx.scope,
                shipment.id,
                ShipmentChange::Document { document: create },
                entry,
            )
            .await?;

        info!(
            shipment_id = %updated.id,
            credential_id = %view.credential_id,
            document_id = %document_id,
            "External document attached"
        );
        self.project(ctx, view, updated).await
    }

    /// Append a note to the shipment journal.
    pub async fn add_note(
        &self,
        ctx: &RequestContext,
        view: &CredentialView,
        text: &str,
    ) -> AppResult<ShipmentProjection> {
        let text = self.enforcer.authorize_note(text)?;
        let shipment = self.load(ctx, view).await?;

        let line = journal_line(ctx, shipment.status, &text);
        let entry = AuditLogger::note_added(ctx, shipment.id, &text);
        let updated = self
            .shipments
            .commit(&ctx.scope, shipment.id, ShipmentChange::Note { line }, entry)
            .await?;

        info!(
            shipment_id = %updated.id,
            credential_id = %view.credential_id,
            "External note added"
        );
        self.project(ctx, view, updated).await
    }

    /// Audit trail of the credential's shipment, newest first.
    pub async fn audit_trail(
        &self,
        ctx: &RequestContext,
        view: &CredentialView,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditEntry>> {
        self.audit.trail(&ctx.scope, view.shipment_id, page).await
    }

    async fn load(&self, ctx: &RequestContext, view: &CredentialView) -> AppResult<Shipment> {
        let shipment = self
            .shipments
            .find(&ctx.scope, view.shipment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Shipment not found"))?;
        ctx.scope.ensure_owns(shipment.tenant_id, "Shipment")?;
        Ok(shipment)
    }

    async fn project(
        &self,
        ctx: &RequestContext,
        view: &CredentialView,
        shipment: Shipment,
    ) -> AppResult<ShipmentProjection> {
        let documents = self.shipments.documents(&ctx.scope, shipment.id).await?;
        Ok(ShipmentProjection::build(
            shipment,
            documents,
            &view.capabilities,
            &self.engine,
        ))
    }
}

fn journal_line(ctx: &RequestContext, status: ShipmentStatus, text: &str) -> String {
    format!(
        "[{}] [{}] {}: {}",
        ctx.request_time.format("%Y-%m-%d %H:%M UTC"),
        status,
        ctx.actor.display_name(),
        text
    )
}

fn validate_document(document: NewDocument) -> AppResult<NewDocument> {
    let document_type = document.document_type.trim().to_string();
    let file_name = document.file_name.trim().to_string();
    let url = document.url.trim().to_string();

    for (name, value) in [("document_type", &document_type), ("file_name", &file_name)] {
        if value.is_empty() {
            return Err(AppError::validation(format!("'{name}' must not be empty")));
        }
        if value.chars().count() > MAX_DOCUMENT_TEXT_LEN {
            return Err(AppError::validation(format!(
                "'{name}' must be at most {MAX_DOCUMENT_TEXT_LEN} characters"
            )));
        }
    }
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(AppError::validation("'url' must be an http(s) URL"));
    }
    if url.len() > MAX_DOCUMENT_URL_LEN {
        return Err(AppError::validation(format!(
            "'url' must be at most {MAX_DOCUMENT_URL_LEN} characters"
        )));
    }

    Ok(NewDocument {
        document_type,
        file_name,
        url,
    })
}
