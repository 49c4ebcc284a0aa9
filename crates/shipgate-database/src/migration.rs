//! Database migration runner.

use sqlx::PgPool;
use tracing::info;

use shipgate_core::error::{AppError, ErrorKind};

/// Run all pending database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Running database migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database migrations completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    const INIT: &str = include_str!("../../../migrations/0001_init.sql");

    const TENANT_TABLES: [&str; 4] = [
        "shipments",
        "external_credentials",
        "shipment_documents",
        "shipment_audit_log",
    ];

    #[test]
    fn test_row_level_security_is_forced_on_tenant_tables() {
        for table in TENANT_TABLES {
            assert!(
                INIT.contains(&format!("ALTER TABLE {table} FORCE ROW LEVEL SECURITY;")),
                "{table}"
            );
            assert!(
                INIT.contains(&format!("CREATE POLICY tenant_isolation ON {table}")),
                "{table}"
            );
        }
    }

    #[test]
    fn test_unset_tenant_opens_only_credential_reads() {
        assert!(!INIT.contains("COALESCE(current_setting('app.tenant_id'"));
        assert_eq!(INIT.matches("app.credential_lookup").count(), 1);
        let lookup = INIT
            .split("CREATE POLICY credential_lookup ON ")
            .nth(1)
            .unwrap();
        assert!(lookup.starts_with("external_credentials\n    FOR SELECT\n"));
    }
}
