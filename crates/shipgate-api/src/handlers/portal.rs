//! External portal handlers, scoped to the credential's own shipment.

use axum::Json;
use axum::extract::{Query, State};

use shipgate_core::types::PageResponse;
use shipgate_entity::audit::AuditEntry;
use shipgate_service::ShipmentProjection;

use crate::dto::request::{
    AddDocumentRequest, AddNoteRequest, ChangeStatusRequest, UpdateFieldsRequest,
};
use crate::dto::response::{ApiResponse, SessionResponse};
use crate::error::ApiError;
use crate::extractors::{ExternalAgent, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/portal/session
pub async fn session(agent: ExternalAgent) -> Json<ApiResponse<SessionResponse>> {
    Json(ApiResponse::ok(SessionResponse::from(agent.view)))
}

/// GET /api/portal/shipment
pub async fn get_shipment(
    State(state): State<AppState>,
    agent: ExternalAgent,
) -> Result<Json<ApiResponse<ShipmentProjection>>, ApiError> {
    let projection = state
        .portal_service
        .get_shipment(&agent.ctx, &agent.view)
        .await?;
    Ok(Json(ApiResponse::ok(projection)))
}

/// PATCH /api/portal/shipment/fields
pub async fn update_fields(
    State(state): State<AppState>,
    agent: ExternalAgent,
    ValidatedJson(req): ValidatedJson<UpdateFieldsRequest>,
) -> Result<Json<ApiResponse<ShipmentProjection>>, ApiError> {
    let projection = state
        .portal_service
        .update_fields(&agent.ctx, &agent.view, &req.fields)
        .await?;
    Ok(Json(ApiResponse::ok(projection)))
}

/// POST /api/portal/shipment/status
pub async fn change_status(
    State(state): State<AppState>,
    agent: ExternalAgent,
    ValidatedJson(req): ValidatedJson<ChangeStatusRequest>,
) -> Result<Json<ApiResponse<ShipmentProjection>>, ApiError> {
    let projection = state
        .portal_service
        .change_status(&agent.ctx, &agent.view, req.status, req.note.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(projection)))
}

/// POST /api/portal/shipment/documents
pub async fn add_document(
    State(state): State<AppState>,
    agent: ExternalAgent,
    ValidatedJson(req): ValidatedJson<AddDocumentRequest>,
) -> Result<Json<ApiResponse<ShipmentProjection>>, ApiError> {
    let projection = state
        .portal_service
        .add_document(&agent.ctx, &agent.view, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(projection)))
}

/// POST /api/portal/shipment/notes
pub async fn add_note(
    State(state): State<AppState>,
    agent: ExternalAgent,
    ValidatedJson(req): ValidatedJson<AddNoteRequest>,
) -> Result<Json<ApiResponse<ShipmentProjection>>, ApiError> {
    let projection = state
        .portal_service
        .add_note(&agent.ctx, &agent.view, &req.note)
        .await?;
    Ok(Json(ApiResponse::ok(projection)))
}

/// GET /api/portal/shipment/audit
pub async fn audit_trail(
    State(state): State<AppState>,
    agent: ExternalAgent,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<AuditEntry>>>, ApiError> {
    let trail = state
        .portal_service
        .audit_trail(&agent.ctx, &agent.view, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(trail)))
}
