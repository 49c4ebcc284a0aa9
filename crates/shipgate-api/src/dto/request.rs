//! Request DTOs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use shipgate_entity::credential::{AgentType, CapabilitySet};
use shipgate_entity::shipment::ShipmentStatus;
use shipgate_service::{CreateGrantRequest, NewDocument};

/// PATCH /api/portal/shipment/fields
///
/// The body is a flat object of field names to values; names are resolved
/// by the capability enforcer so unknown names are refused, not ignored.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(transparent)]
pub struct UpdateFieldsRequest {
    /// Field name to requested value.
    pub fields: Map<String, Value>,
}

/// POST /api/portal/shipment/status
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangeStatusRequest {
    /// Requested status.
    pub status: ShipmentStatus,
    /// Note appended to the journal alongside the change.
    #[validate(length(max = 4000))]
    pub note: Option<String>,
}

/// POST /api/portal/shipment/documents
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddDocumentRequest {
    /// Free-form document type.
    #[validate(length(min = 1, max = 255))]
    pub document_type: String,
    /// Original file name.
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    /// Opaque storage URL.
    #[validate(url, length(max = 2048))]
    pub url: String,
}

impl From<AddDocumentRequest> for NewDocument {
    fn from(req: AddDocumentRequest) -> Self {
        Self {
            document_type: req.document_type,
            file_name: req.file_name,
            url: req.url,
        }
    }
}

/// POST /api/portal/shipment/notes
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddNoteRequest {
    /// Note text.
    #[validate(length(min = 1, max = 4000))]
    pub note: String,
}

/// POST /api/shipments/{id}/grants
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateGrantBody {
    pub agent_type: AgentType,
    #[validate(length(min = 1, max = 255))]
    pub agent_name: String,
    #[validate(email)]
    pub agent_email: Option<String>,
    #[validate(length(max = 64))]
    pub agent_phone: Option<String>,
    #[serde(default)]
    pub capabilities: CapabilitySet,
    #[validate(range(min = 1))]
    pub expiry_days: Option<u32>,
}

impl From<CreateGrantBody> for CreateGrantRequest {
    fn from(body: CreateGrantBody) -> Self {
        Self {
            agent_type: body.agent_type,
            agent_name: body.agent_name,
            agent_email: body.agent_email,
            agent_phone: body.agent_phone,
            capabilities: body.capabilities,
            expiry_days: body.expiry_days,
        }
    }
}
