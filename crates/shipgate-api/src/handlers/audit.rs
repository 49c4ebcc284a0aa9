//! Staff audit trail handler.

use axum::Json;
use axum::extract::{Path, Query, State};

use shipgate_core::types::{PageResponse, ShipmentId};
use shipgate_entity::audit::AuditEntry;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{PaginationParams, StaffUser};
use crate::state::AppState;

/// GET /api/shipments/{id}/audit
pub async fn shipment_audit(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(shipment_id): Path<ShipmentId>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<AuditEntry>>>, ApiError> {
    let trail = state
        .grant_service
        .audit_trail(&staff, shipment_id, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(trail)))
}
