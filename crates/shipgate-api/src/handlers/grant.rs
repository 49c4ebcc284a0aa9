//! Staff grant management handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use shipgate_core::types::{CredentialId, ShipmentId};
use shipgate_entity::credential::ExternalCredential;
use shipgate_service::IssuedGrant;

use crate::dto::request::CreateGrantBody;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{StaffUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/shipments/{id}/grants
pub async fn create_grant(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(shipment_id): Path<ShipmentId>,
    ValidatedJson(body): ValidatedJson<CreateGrantBody>,
) -> Result<(StatusCode, Json<ApiResponse<IssuedGrant>>), ApiError> {
    let grant = state
        .grant_service
        .create(&staff, shipment_id, body.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(grant))))
}

/// GET /api/shipments/{id}/grants
pub async fn list_grants(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(shipment_id): Path<ShipmentId>,
) -> Result<Json<ApiResponse<Vec<ExternalCredential>>>, ApiError> {
    let grants = state.grant_service.list(&staff, shipment_id).await?;
    Ok(Json(ApiResponse::ok(grants)))
}

/// POST /api/grants/{id}/revoke
pub async fn revoke_grant(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<CredentialId>,
) -> Result<Json<ApiResponse<ExternalCredential>>, ApiError> {
    let credential = state.grant_service.revoke(&staff, id).await?;
    Ok(Json(ApiResponse::ok(credential)))
}

/// POST /api/grants/{id}/rotate
pub async fn rotate_grant(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<CredentialId>,
) -> Result<Json<ApiResponse<IssuedGrant>>, ApiError> {
    let grant = state.grant_service.rotate(&staff, id).await?;
    Ok(Json(ApiResponse::ok(grant)))
}
