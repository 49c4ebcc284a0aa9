//! Shipgate server: scoped external access to shipments.
//!
//! Main entry point that wires the crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use shipgate_api::{Stores, run_server};
use shipgate_core::config::AppConfig;
use shipgate_core::error::AppError;
use shipgate_database::migration::run_migrations;
use shipgate_database::{
    DatabasePool, PgAuditRepository, PgCredentialRepository, PgShipmentRepository,
};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and the environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let dir = std::env::var("SHIPGATE_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("SHIPGATE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load_from(&dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Shipgate v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db_pool = DatabasePool::connect(&config.database).await?;

    if config.database.run_migrations {
        tracing::info!("Running database migrations...");
        run_migrations(db_pool.pool()).await?;
        tracing::info!("Database migrations complete");
    }

    // ── Step 2: Stores ───────────────────────────────────────────
    let pg = db_pool.pool().clone();
    let stores = Stores {
        credentials: Arc::new(PgCredentialRepository::new(pg.clone())),
        shipments: Arc::new(PgShipmentRepository::new(pg.clone())),
        audit: Arc::new(PgAuditRepository::new(pg)),
    };

    // ── Step 3: Serve ────────────────────────────────────────────
    let result = run_server(config, stores, Some(db_pool.clone())).await;

    tracing::info!("Closing database pool...");
    db_pool.close().await;
    result
}
