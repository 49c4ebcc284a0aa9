//! Document references attached to a shipment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use shipgate_core::types::{CredentialId, DocumentId, ShipmentId, TenantId};

/// A document attached to a shipment. The gateway stores only the opaque
/// upload URL; the file itself lives in external storage.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShipmentDocument {
    /// Unique document identifier.
    pub id: DocumentId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Shipment the document belongs to.
    pub shipment_id: ShipmentId,
    /// Free-form document type (e.g. `commercial_invoice`, `bill_of_lading`).
    pub document_type: String,
    /// Original file name.
    pub file_name: String,
    /// Opaque storage URL.
    pub url: String,
    /// Credential that attached the document, if external.
    pub uploaded_by_credential: Option<CredentialId>,
    /// Display name of whoever attached it.
    pub uploaded_by_name: String,
    /// When the document was attached.
    pub created_at: DateTime<Utc>,
}

/// Data required to attach a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    /// Identifier assigned before the write.
    pub id: DocumentId,
    /// Document type.
    pub document_type: String,
    /// File name.
    pub file_name: String,
    /// Opaque storage URL.
    pub url: String,
    /// Uploading credential.
    pub uploaded_by_credential: Option<CredentialId>,
    /// Uploader display name.
    pub uploaded_by_name: String,
}

impl CreateDocument {
    /// Materialize the stored row.
    pub fn into_document(
        self,
        tenant_id: TenantId,
        shipment_id: ShipmentId,
        created_at: DateTime<Utc>,
    ) -> ShipmentDocument {
        ShipmentDocument {
            id: self.id,
            tenant_id,
            shipment_id,
            document_type: self.document_type,
            file_name: self.file_name,
            url: self.url,
            uploaded_by_credential: self.uploaded_by_credential,
            uploaded_by_name: self.uploaded_by_name,
            created_at,
        }
    }
}
