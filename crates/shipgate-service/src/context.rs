//! Request context carrying the acting party, its tenant scope, and origin.

use chrono::{DateTime, Utc};

use shipgate_auth::AuthenticatedAgent;
use shipgate_core::error::AppError;
use shipgate_core::types::{TenantScope, UserId};
use shipgate_entity::audit::Actor;

/// Context for the current authenticated request.
///
/// Built by the API layer from an authenticated credential or staff token
/// and passed into every service method, so each operation knows who is
/// acting, for which tenant, and from where.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Who is acting.
    pub actor: Actor,
    /// Tenant every store call is confined to.
    pub scope: TenantScope,
    /// Origin network address.
    pub ip_address: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Context for an authenticated external agent.
    pub fn external(
        agent: &AuthenticatedAgent,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            actor: Actor::External {
                credential_id: agent.view.credential_id,
                agent_type: agent.view.agent.agent_type,
                agent_name: agent.view.agent.name.clone(),
            },
            scope: agent.scope,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// Context for an internal staff user.
    pub fn internal(
        user_id: UserId,
        scope: TenantScope,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            actor: Actor::Internal { user_id },
            scope,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// The staff user behind this request; external agents are refused.
    pub fn staff_user(&self) -> Result<UserId, AppError> {
        match self.actor {
            Actor::Internal { user_id } => Ok(user_id),
            Actor::External { .. } => Err(AppError::forbidden(
                "Grant management is restricted to internal staff",
            )),
        }
    }
}
