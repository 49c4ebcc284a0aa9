//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shipgate_core::types::{CredentialId, ShipmentId};
use shipgate_entity::credential::{AgentDescriptor, CapabilitySet, CredentialView};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// GET /api/portal/session: what the presented credential may do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub credential_id: CredentialId,
    pub shipment_id: ShipmentId,
    pub agent: AgentDescriptor,
    pub capabilities: CapabilitySet,
    pub expires_at: DateTime<Utc>,
}

impl From<CredentialView> for SessionResponse {
    fn from(view: CredentialView) -> Self {
        Self {
            credential_id: view.credential_id,
            shipment_id: view.shipment_id,
            agent: view.agent,
            capabilities: view.capabilities,
            expires_at: view.expires_at,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Storage backend state (`connected`, `unavailable`, `memory`).
    pub database: String,
}
