//! Application state shared across all handlers and extractors.

use std::sync::Arc;

use shipgate_auth::{
    CredentialAuthenticator, CredentialHasher, JwtDecoder, TenantContextBinder, TokenGenerator,
};
use shipgate_core::config::AppConfig;
use shipgate_core::result::AppResult;
use shipgate_database::DatabasePool;
use shipgate_database::store::{AuditStore, CredentialStore, ShipmentStore};
use shipgate_service::{AuditLogger, GrantService, PortalService};

/// The three storage backends the gateway is wired against.
#[derive(Clone)]
pub struct Stores {
    /// External credentials.
    pub credentials: Arc<dyn CredentialStore>,
    /// Shipments and their documents.
    pub shipments: Arc<dyn ShipmentStore>,
    /// Append-only audit log.
    pub audit: Arc<dyn AuditStore>,
}

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL pool; `None` when running on the in-memory store
    pub db_pool: Option<DatabasePool>,

    // ── Auth ─────────────────────────────────────────────────
    /// External bearer credential authenticator
    pub authenticator: Arc<CredentialAuthenticator>,
    /// Staff JWT decoder
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Tenant binder for staff requests
    pub binder: TenantContextBinder,

    // ── Services ─────────────────────────────────────────────
    /// External portal service
    pub portal_service: Arc<PortalService>,
    /// Grant management service
    pub grant_service: Arc<GrantService>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db_pool", &self.db_pool.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire services over the given stores.
    pub fn new(config: AppConfig, stores: Stores, db_pool: Option<DatabasePool>) -> AppResult<Self> {
        let hasher = CredentialHasher::new(&config.auth.argon2)?;
        let tokens = TokenGenerator::new(config.portal.token_prefix.clone());
        let audit = Arc::new(AuditLogger::new(Arc::clone(&stores.audit)));

        let authenticator = Arc::new(CredentialAuthenticator::new(
            Arc::clone(&stores.credentials),
            hasher.clone(),
            tokens,
        ));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

        let portal_service = Arc::new(PortalService::new(
            Arc::clone(&stores.shipments),
            Arc::clone(&audit),
        ));
        let grant_service = Arc::new(GrantService::new(
            Arc::clone(&stores.credentials),
            Arc::clone(&stores.shipments),
            Arc::clone(&audit),
            hasher,
            config.portal.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            db_pool,
            authenticator,
            jwt_decoder,
            binder: TenantContextBinder::new(),
            portal_service,
            grant_service,
        })
    }
}
