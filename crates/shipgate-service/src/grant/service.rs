//! Issue, list, revoke and rotate external credentials.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use shipgate_auth::{CredentialHasher, IssuedToken, TokenGenerator};
use shipgate_core::config::PortalConfig;
use shipgate_core::error::AppError;
use shipgate_core::result::AppResult;
use shipgate_core::types::{CredentialId, PageRequest, PageResponse, ShipmentId};
use shipgate_database::store::{CredentialStore, ShipmentStore};
use shipgate_entity::audit::{AuditAction, AuditEntry};
use shipgate_entity::credential::{
    AgentDescriptor, AgentType, CapabilitySet, CreateCredential, ExternalCredential,
    RotateCredential,
};

use crate::audit::AuditLogger;
use crate::context::RequestContext;

const MAX_AGENT_TEXT_LEN: usize = 255;

/// Request to grant an external agent access to one shipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGrantRequest {
    /// Agent classification.
    pub agent_type: AgentType,
    /// Agent display name.
    pub agent_name: String,
    /// Agent contact email.
    #[serde(default)]
    pub agent_email: Option<String>,
    /// Agent contact phone.
    #[serde(default)]
    pub agent_phone: Option<String>,
    /// Capability set; everything denied when omitted.
    #[serde(default)]
    pub capabilities: CapabilitySet,
    /// Days until expiry; the configured default when omitted.
    #[serde(default)]
    pub expiry_days: Option<u32>,
}

/// A credential together with its one-time raw token.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedGrant {
    /// Stored credential (digest and lookup key are never serialized).
    pub credential: ExternalCredential,
    /// Raw bearer token. Returned once and never retrievable again.
    pub token: String,
    /// Portal link embedding the token.
    pub portal_url: String,
}

/// Grant management for internal staff.
#[derive(Clone)]
pub struct GrantService {
    credentials: Arc<dyn CredentialStore>,
    shipments: Arc<dyn ShipmentStore>,
    audit: Arc<AuditLogger>,
    hasher: CredentialHasher,
    tokens: TokenGenerator,
    portal: PortalConfig,
}

impl std::fmt::Debug for GrantService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrantService")
            .field("portal", &self.portal)
            .finish_non_exhaustive()
    }
}

impl GrantService {
    /// Creates a new grant service.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        shipments: Arc<dyn ShipmentStore>,
        audit: Arc<AuditLogger>,
        hasher: CredentialHasher,
        portal: PortalConfig,
    ) -> Self {
        let tokens = TokenGenerator::new(portal.token_prefix.clone());
        Self {
            credentials,
            shipments,
            audit,
            hasher,
            tokens,
            portal,
        }
    }

    /// Issue a credential for a shipment.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        shipment_id: ShipmentId,
        req: CreateGrantRequest,
    ) -> AppResult<IssuedGrant> {
        let created_by = ctx.staff_user()?;
        self.shipments
            .find(&ctx.scope, shipment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Shipment not found"))?;

        let agent = validate_agent(&req)?;
        let expiry_days = req.expiry_days.unwrap_or(self.portal.default_expiry_days);
        if expiry_days == 0 || expiry_days > self.portal.max_expiry_days {
            return Err(AppError::validation(format!(
                "expiry_days must be between 1 and {}",
                self.portal.max_expiry_days
            )));
        }

        let issued = self.tokens.generate();
        let secret_hash = self.hash(&issued).await?;
        let data = CreateCredential {
            id: CredentialId::new(),
            tenant_id: ctx.scope.tenant_id(),
            shipment_id,
            lookup_key: issued.lookup_key.clone(),
            secret_hash,
            agent,
            capabilities: req.capabilities.normalized(),
            expires_at: ctx.request_time + Duration::days(i64::from(expiry_days)),
            created_by,
        };
        let entry = AuditLogger::grant(
            ctx,
            AuditAction::GrantCreated,
            &data.clone().into_credential(ctx.request_time),
        );
        let credential = self.credentials.create(data, entry).await?;

        info!(
            credential_id = %credential.id,
            shipment_id = %shipment_id,
            agent_type = %credential.agent_type,
            expires_at = %credential.expires_at,
            "External credential issued"
        );
        Ok(self.issued(credential, issued))
    }

    /// All credentials for a shipment, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        shipment_id: ShipmentId,
    ) -> AppResult<Vec<ExternalCredential>> {
        ctx.staff_user()?;
        self.credentials
            .list_for_shipment(&ctx.scope, shipment_id)
            .await
    }

    /// Revoke a credential. Revoking twice is a conflict.
    pub async fn revoke(
        &self,
        ctx: &RequestContext,
        id: CredentialId,
    ) -> AppResult<ExternalCredential> {
        ctx.staff_user()?;
        let credential = self.load(ctx, id).await?;
        if !credential.is_active {
            return Err(AppError::conflict("Credential is already revoked"));
        }

        let entry = AuditLogger::grant(ctx, AuditAction::GrantRevoked, &credential);
        let revoked = self
            .credentials
            .revoke(&ctx.scope, id, Utc::now(), entry)
            .await?;

        info!(credential_id = %id, shipment_id = %revoked.shipment_id, "External credential revoked");
        Ok(revoked)
    }

    /// Replace a credential's secret, invalidating the previous token.
    ///
    /// The use counter restarts at zero; capabilities and expiry are kept.
    pub async fn rotate(&self, ctx: &RequestContext, id: CredentialId) -> AppResult<IssuedGrant> {
        ctx.staff_user()?;
        let credential = self.load(ctx, id).await?;
        if !credential.is_active {
            return Err(AppError::conflict("A revoked credential cannot be rotated"));
        }

        let issued = self.tokens.generate();
        let rotation = RotateCredential {
            lookup_key: issued.lookup_key.clone(),
            secret_hash: self.hash(&issued).await?,
        };
        let entry = AuditLogger::grant(ctx, AuditAction::GrantRotated, &credential);
        let rotated = self
            .credentials
            .rotate(&ctx.scope, id, rotation, Utc::now(), entry)
            .await?;

        info!(credential_id = %id, shipment_id = %rotated.shipment_id, "External credential rotated");
        Ok(self.issued(rotated, issued))
    }

    /// Audit trail of a shipment, newest first.
    pub async fn audit_trail(
        &self,
        ctx: &RequestContext,
        shipment_id: ShipmentId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditEntry>> {
        ctx.staff_user()?;
        self.audit.trail(&ctx.scope, shipment_id, page).await
    }

    async fn load(&self, ctx: &RequestContext, id: CredentialId) -> AppResult<ExternalCredential> {
        self.credentials
            .find(&ctx.scope, id)
            .await?
            .ok_or_else(|| AppError::not_found("Credential not found"))
    }

    async fn hash(&self, issued: &IssuedToken) -> AppResult<String> {
        let hasher = self.hasher.clone();
        let secret = issued.secret.clone();
        tokio::task::spawn_blocking(move || hasher.hash_secret(&secret))
            .await
            .map_err(|e| AppError::internal(format!("Credential hashing task failed: {e}")))?
    }

    fn issued(&self, credential: ExternalCredential, issued: IssuedToken) -> IssuedGrant {
        IssuedGrant {
            portal_url: self.portal.portal_url(&issued.raw),
            token: issued.raw,
            credential,
        }
    }
}

fn validate_agent(req: &CreateGrantRequest) -> AppResult<AgentDescriptor> {
    let name = req.agent_name.trim();
    if name.is_empty() {
        return Err(AppError::validation("agent_name must not be empty"));
    }
    if name.chars().count() > MAX_AGENT_TEXT_LEN {
        return Err(AppError::validation(format!(
            "agent_name must be at most {MAX_AGENT_TEXT_LEN} characters"
        )));
    }
    let email = trimmed(req.agent_email.as_deref());
    if let Some(email) = &email
        && !email.contains('@')
    {
        return Err(AppError::validation("agent_email is not a valid address"));
    }

    Ok(AgentDescriptor {
        agent_type: req.agent_type,
        name: name.to_string(),
        email,
        phone: trimmed(req.agent_phone.as_deref()),
    })
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
