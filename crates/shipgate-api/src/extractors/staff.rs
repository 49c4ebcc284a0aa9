//! `StaffUser` extractor: validates the internal staff JWT.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};

use shipgate_core::error::AppError;
use shipgate_service::RequestContext;

use super::origin::ClientOrigin;
use crate::error::ApiError;
use crate::state::AppState;

/// An authenticated staff user with its tenant-bound request context.
#[derive(Debug, Clone)]
pub struct StaffUser(pub RequestContext);

impl std::ops::Deref for StaffUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for StaffUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Authorization(bearer) = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .ok_or_else(|| AppError::unauthorized("Missing staff bearer token"))?;

        let claims = state.jwt_decoder.decode(bearer.token())?;
        let scope = state.binder.bind_staff(&claims);
        let origin = ClientOrigin::from_parts(parts);

        Ok(StaffUser(RequestContext::internal(
            claims.sub,
            scope,
            origin.ip_address,
            origin.user_agent,
        )))
    }
}
