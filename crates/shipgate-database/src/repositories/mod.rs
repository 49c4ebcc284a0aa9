//! PostgreSQL implementations of the store traits.

pub mod audit;
pub mod credential;
pub mod shipment;

pub use audit::PgAuditRepository;
pub use credential::PgCredentialRepository;
pub use shipment::PgShipmentRepository;

use sqlx::{PgPool, Postgres, Transaction};

use shipgate_core::error::{AppError, ErrorKind};
use shipgate_core::result::AppResult;
use shipgate_core::types::TenantScope;

/// Open a transaction with `app.tenant_id` set for row-level security.
///
/// The setting is transaction-local, so it never leaks to the next user of
/// the pooled connection.
pub(crate) async fn begin_scoped(
    pool: &PgPool,
    scope: &TenantScope,
) -> AppResult<Transaction<'static, Postgres>> {
    let mut tx = pool.begin().await.map_err(|e| {
        AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
    })?;

    sqlx::query("SELECT set_config('app.tenant_id', $1, true)")
        .bind(scope.tenant_id().to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to bind tenant scope", e)
        })?;

    Ok(tx)
}

/// Open a read transaction for the credential lookups that run before a
/// tenant is known.
///
/// Sets `app.credential_lookup`, which only the `credential_lookup` SELECT
/// policy on `external_credentials` honors. Every other table stays closed.
pub(crate) async fn begin_lookup(pool: &PgPool) -> AppResult<Transaction<'static, Postgres>> {
    let mut tx = pool.begin().await.map_err(|e| {
        AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
    })?;

    sqlx::query("SELECT set_config('app.credential_lookup', 'on', true)")
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to open credential lookup", e)
        })?;

    Ok(tx)
}

/// Commit a transaction, mapping the error.
pub(crate) async fn commit(tx: Transaction<'static, Postgres>) -> AppResult<()> {
    tx.commit().await.map_err(|e| {
        AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
    })
}
