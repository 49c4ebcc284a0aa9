//! Resolves a raw bearer value to exactly one usable credential.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use shipgate_core::error::AppError;
use shipgate_core::result::AppResult;
use shipgate_core::types::TenantScope;
use shipgate_database::store::CredentialStore;
use shipgate_entity::credential::{CredentialView, ExternalCredential};

use super::hasher::CredentialHasher;
use super::token::TokenGenerator;
use crate::tenant::TenantContextBinder;

const INVALID: &str = "Access link is invalid";
const REVOKED: &str = "Access link has been revoked";
const EXPIRED: &str = "Access link has expired";

/// A successfully authenticated external agent, bound to its tenant.
#[derive(Debug, Clone)]
pub struct AuthenticatedAgent {
    /// Credential identity and capabilities.
    pub view: CredentialView,
    /// Tenant scope for every downstream store call.
    pub scope: TenantScope,
}

/// Authenticates external bearer credentials.
///
/// Keyed tokens load their single row by lookup key. Keyless tokens fall
/// back to verifying against every active credential in turn, which costs
/// one Argon2 verification per active credential.
#[derive(Clone)]
pub struct CredentialAuthenticator {
    store: Arc<dyn CredentialStore>,
    hasher: CredentialHasher,
    tokens: TokenGenerator,
    binder: TenantContextBinder,
}

impl std::fmt::Debug for CredentialAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialAuthenticator")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl CredentialAuthenticator {
    /// Create an authenticator.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: CredentialHasher,
        tokens: TokenGenerator,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            binder: TenantContextBinder::new(),
        }
    }

    /// Authenticate a raw bearer value.
    ///
    /// On success the credential's usage metadata is bumped on a best-effort
    /// basis; a failure there is logged and never surfaced.
    pub async fn authenticate(&self, raw: &str) -> AppResult<AuthenticatedAgent> {
        let now = Utc::now();
        let parsed = self
            .tokens
            .parse(raw)
            .ok_or_else(|| AppError::credential_invalid(INVALID))?;

        let credential = match parsed.lookup_key {
            Some(key) => self.resolve_keyed(key, parsed.secret).await?,
            None => self.resolve_by_scan(parsed.secret).await?,
        };

        if credential.is_expired_at(now) {
            info!(
                credential_id = %credential.id,
                expires_at = %credential.expires_at,
                "Rejected expired external credential"
            );
            return Err(AppError::credential_expired(EXPIRED));
        }

        let view = credential.to_view().inspect_err(|e| {
            warn!(credential_id = %credential.id, error = %e, "Stored capability set is unusable");
        })?;
        let scope = self.binder.bind(&view);

        if let Err(e) = self.store.record_use(&scope, credential.id, now).await {
            warn!(credential_id = %credential.id, error = %e, "Failed to record credential use");
        }

        debug!(
            credential_id = %view.credential_id,
            shipment_id = %view.shipment_id,
            agent = %view.agent,
            "External credential authenticated"
        );
        Ok(AuthenticatedAgent { view, scope })
    }

    async fn resolve_keyed(&self, key: &str, secret: &str) -> AppResult<ExternalCredential> {
        let Some(credential) = self.store.find_by_lookup_key(key).await? else {
            return Err(AppError::credential_invalid(INVALID));
        };

        if !credential.is_active {
            info!(credential_id = %credential.id, "Rejected revoked external credential");
            return Err(AppError::credential_revoked(REVOKED));
        }

        let hasher = self.hasher.clone();
        let secret = secret.to_string();
        let digest = credential.secret_hash.clone();
        let matched = tokio::task::spawn_blocking(move || hasher.verify_secret(&secret, &digest))
            .await
            .map_err(|e| AppError::internal(format!("Credential verification task failed: {e}")))??;

        if matched {
            Ok(credential)
        } else {
            info!(credential_id = %credential.id, "External credential secret mismatch");
            Err(AppError::credential_invalid(INVALID))
        }
    }

    async fn resolve_by_scan(&self, secret: &str) -> AppResult<ExternalCredential> {
        let candidates = self.store.list_active().await?;
        debug!(candidates = candidates.len(), "Scanning active credentials for keyless token");

        let hasher = self.hasher.clone();
        let secret = secret.to_string();
        let matched = tokio::task::spawn_blocking(move || -> AppResult<Option<ExternalCredential>> {
            for candidate in candidates {
                if hasher.verify_secret(&secret, &candidate.secret_hash)? {
                    return Ok(Some(candidate));
                }
            }
            Ok(None)
        })
        .await
        .map_err(|e| AppError::internal(format!("Credential verification task failed: {e}")))??;

        matched.ok_or_else(|| AppError::credential_invalid(INVALID))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use shipgate_core::ErrorKind;
    use shipgate_core::config::Argon2Config;
    use shipgate_core::types::{CredentialId, ShipmentId, TenantId, UserId};
    use shipgate_database::MemoryStore;
    use shipgate_entity::credential::{AgentDescriptor, AgentType, CapabilitySet, CreateCredential};

    struct Fixture {
        store: MemoryStore,
        authenticator: CredentialAuthenticator,
        hasher: CredentialHasher,
        tokens: TokenGenerator,
    }

    fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let hasher = CredentialHasher::new(&Argon2Config {
            memory_kib: 256,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        let tokens = TokenGenerator::new("ext_");
        let authenticator =
            CredentialAuthenticator::new(Arc::new(store.clone()), hasher.clone(), tokens.clone());
        Fixture {
            store,
            authenticator,
            hasher,
            tokens,
        }
    }

    impl Fixture {
        /// Seed a credential and return its raw token.
        async fn seed(&self, tweak: impl FnOnce(&mut ExternalCredential)) -> (CredentialId, String) {
            let issued = self.tokens.generate();
            let mut credential = CreateCredential {
                id: CredentialId::new(),
                tenant_id: TenantId::new(),
                shipment_id: ShipmentId::new(),
                lookup_key: issued.lookup_key.clone(),
                secret_hash: self.hasher.hash_secret(&issued.secret).unwrap(),
                agent: AgentDescriptor {
                    agent_type: AgentType::Broker,
                    name: "Harbor Customs Ltd".to_string(),
                    email: None,
                    phone: None,
                },
                capabilities: CapabilitySet::default(),
                expires_at: Utc::now() + Duration::days(3),
                created_by: UserId::new(),
            }
            .into_credential(Utc::now());
            tweak(&mut credential);
            let id = credential.id;
            self.store.insert_credential(credential).await;
            (id, issued.raw)
        }
    }

    #[tokio::test]
    async fn test_valid_token_authenticates_and_counts_use() {
        let fx = fixture();
        let (id, raw) = fx.seed(|_| {}).await;

        let agent = fx.authenticator.authenticate(&raw).await.unwrap();
        assert_eq!(agent.view.credential_id, id);
        assert_eq!(agent.scope.tenant_id(), agent.view.tenant_id);

        let stored = fx.store.credential(id).await.unwrap();
        assert_eq!(stored.use_count, 1);
        assert!(stored.last_used_at.is_some());
    }

    #[tokio::test]
    async fn test_wrong_secret_is_invalid() {
        let fx = fixture();
        let (_, raw) = fx.seed(|_| {}).await;
        let (key, _) = raw.split_once('.').unwrap();

        let err = fx
            .authenticator
            .authenticate(&format!("{key}.wrongsecret"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::CredentialInvalid);
    }

    #[tokio::test]
    async fn test_unknown_key_is_invalid() {
        let fx = fixture();
        let err = fx
            .authenticator
            .authenticate("ext_nosuchkey.whatever")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::CredentialInvalid);
    }

    #[tokio::test]
    async fn test_revoked_regardless_of_secret() {
        let fx = fixture();
        let (id, raw) = fx.seed(|c| c.is_active = false).await;
        let (key, _) = raw.split_once('.').unwrap();

        let err = fx.authenticator.authenticate(&raw).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::CredentialRevoked);
        let err = fx
            .authenticator
            .authenticate(&format!("{key}.wrongsecret"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::CredentialRevoked);
        assert_eq!(fx.store.credential(id).await.unwrap().use_count, 0);
    }

    #[tokio::test]
    async fn test_expired_is_rejected_without_counting_use() {
        let fx = fixture();
        let (id, raw) = fx
            .seed(|c| c.expires_at = Utc::now() - Duration::minutes(1))
            .await;

        let err = fx.authenticator.authenticate(&raw).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::CredentialExpired);
        assert_eq!(fx.store.credential(id).await.unwrap().use_count, 0);
    }

    #[tokio::test]
    async fn test_keyless_token_found_by_scan() {
        let fx = fixture();
        let legacy_secret = "legacy-secret-value";
        let digest = fx.hasher.hash_secret(legacy_secret).unwrap();
        let (id, _) = fx
            .seed(|c| {
                c.lookup_key = None;
                c.secret_hash = digest;
            })
            .await;

        let agent = fx
            .authenticator
            .authenticate(&format!("ext_{legacy_secret}"))
            .await
            .unwrap();
        assert_eq!(agent.view.credential_id, id);
    }

    #[tokio::test]
    async fn test_broken_capability_set_rejects_request() {
        let fx = fixture();
        let (_, raw) = fx
            .seed(|c| c.capabilities = serde_json::json!({ "allowed_fields": ["hull_colour"] }))
            .await;

        let err = fx.authenticator.authenticate(&raw).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_empty_bearer_is_invalid() {
        let fx = fixture();
        let err = fx.authenticator.authenticate("ext_").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::CredentialInvalid);
    }
}
