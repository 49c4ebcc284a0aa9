//! CLI command definitions and dispatch.

pub mod audit;
pub mod grant;
pub mod migrate;
pub mod token;

use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

use shipgate_core::config::AppConfig;
use shipgate_core::types::{TenantId, TenantScope, UserId};
use shipgate_database::{
    DatabasePool, PgAuditRepository, PgCredentialRepository, PgShipmentRepository,
};
use shipgate_service::{AuditLogger, RequestContext};

use crate::output::OutputFormat;

/// Shipgate: scoped external access to shipments
#[derive(Debug, Parser)]
#[command(name = "shipgate", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default.toml` and environment overlays
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Environment overlay to apply on top of the defaults
    #[arg(short, long, env = "SHIPGATE_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// External credential management
    Grant(grant::GrantArgs),
    /// Shipment audit trail
    Audit(audit::AuditArgs),
    /// Mint a staff token for API access
    Token(token::TokenArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> anyhow::Result<()> {
        let config = load_config(&self.config, &self.env)?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Grant(args) => grant::execute(args, &config, self.format).await,
            Commands::Audit(args) => audit::execute(args, &config, self.format).await,
            Commands::Token(args) => token::execute(args, &config),
        }
    }
}

/// The staff identity a command acts as.
#[derive(Debug, Clone, Args)]
pub struct StaffArgs {
    /// Tenant the command operates in
    #[arg(long, env = "SHIPGATE_TENANT")]
    pub tenant: Uuid,
    /// Staff user recorded as the actor
    #[arg(long, env = "SHIPGATE_USER")]
    pub user: Uuid,
}

impl StaffArgs {
    /// Request context for this staff identity.
    pub fn context(&self) -> RequestContext {
        RequestContext::internal(
            UserId::from_uuid(self.user),
            TenantScope::bind(TenantId::from_uuid(self.tenant)),
            None,
            Some(format!("shipgate-cli/{}", env!("CARGO_PKG_VERSION"))),
        )
    }
}

/// PostgreSQL-backed stores for service construction.
pub struct PgStores {
    pub pool: DatabasePool,
    pub credentials: Arc<PgCredentialRepository>,
    pub shipments: Arc<PgShipmentRepository>,
    pub audit: Arc<AuditLogger>,
}

/// Helper: load configuration
pub fn load_config(dir: &str, env: &str) -> anyhow::Result<AppConfig> {
    AppConfig::load_from(dir, env).with_context(|| format!("Failed to load config from {dir}"))
}

/// Helper: connect and build the PostgreSQL stores
pub async fn connect_stores(config: &AppConfig) -> anyhow::Result<PgStores> {
    let pool = DatabasePool::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    let pg = pool.pool().clone();
    tracing::debug!("PostgreSQL stores ready");
    Ok(PgStores {
        credentials: Arc::new(PgCredentialRepository::new(pg.clone())),
        shipments: Arc::new(PgShipmentRepository::new(pg.clone())),
        audit: Arc::new(AuditLogger::new(Arc::new(PgAuditRepository::new(pg)))),
        pool,
    })
}
