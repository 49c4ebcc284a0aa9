//! `ExternalAgent` extractor: authenticates the portal bearer credential.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use serde::Deserialize;

use shipgate_core::error::AppError;
use shipgate_entity::credential::CredentialView;
use shipgate_service::RequestContext;

use super::origin::ClientOrigin;
use crate::error::ApiError;
use crate::state::AppState;

/// An authenticated external agent with its tenant-bound request context.
#[derive(Debug, Clone)]
pub struct ExternalAgent {
    /// Request context carrying actor, scope, and origin.
    pub ctx: RequestContext,
    /// Credential identity and capabilities.
    pub view: CredentialView,
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// The raw bearer value: the `Authorization` header first, then `?token=`.
pub(crate) fn bearer_or_query(parts: &Parts) -> Option<String> {
    if let Some(Authorization(bearer)) = parts.headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }
    Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.token)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for ExternalAgent {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = bearer_or_query(parts)
            .ok_or_else(|| AppError::unauthorized("Missing access token"))?;

        let agent = state.authenticator.authenticate(&raw).await?;
        let origin = ClientOrigin::from_parts(parts);
        let ctx = RequestContext::external(&agent, origin.ip_address, origin.user_agent);

        Ok(Self {
            ctx,
            view: agent.view,
        })
    }
}
