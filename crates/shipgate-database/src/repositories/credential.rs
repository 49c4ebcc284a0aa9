//! External credential repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use shipgate_core::error::{AppError, ErrorKind};
use shipgate_core::result::AppResult;
use shipgate_core::types::{CredentialId, ShipmentId, TenantScope};
use shipgate_entity::audit::NewAuditEntry;
use shipgate_entity::credential::{CreateCredential, ExternalCredential, RotateCredential};

use super::audit::insert_entry;
use super::{begin_lookup, begin_scoped, commit};
use crate::store::CredentialStore;

/// Repository for `external_credentials`.
#[derive(Debug, Clone)]
pub struct PgCredentialRepository {
    pool: PgPool,
}

impl PgCredentialRepository {
    /// Create a new credential repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_unique(e: sqlx::Error, what: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::conflict(format!("{what} already exists"))
        }
        _ => AppError::with_source(ErrorKind::Database, format!("Failed to write {what}"), e),
    }
}

/// Explain a guarded UPDATE that matched no row: the credential is either
/// absent from the tenant or no longer active.
async fn inactive_or_missing(
    tx: &mut Transaction<'_, Postgres>,
    scope: &TenantScope,
    id: CredentialId,
    conflict: &str,
) -> AppError {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM external_credentials WHERE id = $1 AND tenant_id = $2)",
    )
    .bind(id)
    .bind(scope.tenant_id())
    .fetch_one(&mut **tx)
    .await;
    match exists {
        Ok(true) => AppError::conflict(conflict),
        Ok(false) => AppError::not_found("Credential not found"),
        Err(e) => AppError::with_source(ErrorKind::Database, "Failed to find credential", e),
    }
}

#[async_trait]
impl CredentialStore for PgCredentialRepository {
    async fn find_by_lookup_key(&self, lookup_key: &str) -> AppResult<Option<ExternalCredential>> {
        let mut tx = begin_lookup(&self.pool).await?;
        let credential = sqlx::query_as::<_, ExternalCredential>(
            "SELECT * FROM external_credentials WHERE lookup_key = $1",
        )
        .bind(lookup_key)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find credential", e))?;
        commit(tx).await?;
        Ok(credential)
    }

    async fn list_active(&self) -> AppResult<Vec<ExternalCredential>> {
        let mut tx = begin_lookup(&self.pool).await?;
        let credentials = sqlx::query_as::<_, ExternalCredential>(
            "SELECT * FROM external_credentials WHERE is_active = TRUE ORDER BY created_at",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list active credentials", e)
        })?;
        commit(tx).await?;
        Ok(credentials)
    }

    async fn find(
        &self,
        scope: &TenantScope,
        id: CredentialId,
    ) -> AppResult<Option<ExternalCredential>> {
        let mut tx = begin_scoped(&self.pool, scope).await?;
        let credential = sqlx::query_as::<_, ExternalCredential>(
            "SELECT * FROM external_credentials WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(scope.tenant_id())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find credential", e))?;
        commit(tx).await?;
        Ok(credential)
    }

    async fn list_for_shipment(
        &self,
        scope: &TenantScope,
        shipment_id: ShipmentId,
    ) -> AppResult<Vec<ExternalCredential>> {
        let mut tx = begin_scoped(&self.pool, scope).await?;
        let credentials = sqlx::query_as::<_, ExternalCredential>(
            "SELECT * FROM external_credentials WHERE tenant_id = $1 AND shipment_id = $2 \
             ORDER BY created_at DESC",
        )
        .bind(scope.tenant_id())
        .bind(shipment_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list credentials", e))?;
        commit(tx).await?;
        Ok(credentials)
    }

    async fn create(
        &self,
        data: CreateCredential,
        audit: NewAuditEntry,
    ) -> AppResult<ExternalCredential> {
        let scope = TenantScope::bind(data.tenant_id);
        let row = data.into_credential(Utc::now());

        let mut tx = begin_scoped(&self.pool, &scope).await?;
        let created = sqlx::query_as::<_, ExternalCredential>(
            "INSERT INTO external_credentials \
             (id, tenant_id, shipment_id, lookup_key, secret_hash, agent_type, agent_name, \
              agent_email, agent_phone, capabilities, is_active, expires_at, use_count, \
              created_by, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE, $11, 0, $12, $13) \
             RETURNING *",
        )
        .bind(row.id)
        .bind(row.tenant_id)
        .bind(row.shipment_id)
        .bind(&row.lookup_key)
        .bind(&row.secret_hash)
        .bind(row.agent_type)
        .bind(&row.agent_name)
        .bind(&row.agent_email)
        .bind(&row.agent_phone)
        .bind(&row.capabilities)
        .bind(row.expires_at)
        .bind(row.created_by)
        .bind(row.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique(e, "credential"))?;

        insert_entry(&mut *tx, audit).await?;
        commit(tx).await?;
        Ok(created)
    }

    async fn revoke(
        &self,
        scope: &TenantScope,
        id: CredentialId,
        at: DateTime<Utc>,
        audit: NewAuditEntry,
    ) -> AppResult<ExternalCredential> {
        let mut tx = begin_scoped(&self.pool, scope).await?;
        let revoked = sqlx::query_as::<_, ExternalCredential>(
            "UPDATE external_credentials SET is_active = FALSE, revoked_at = $3 \
             WHERE id = $1 AND tenant_id = $2 AND is_active = TRUE RETURNING *",
        )
        .bind(id)
        .bind(scope.tenant_id())
        .bind(at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to revoke credential", e))?;
        let Some(revoked) = revoked else {
            let reason = "Credential is already revoked";
            return Err(inactive_or_missing(&mut tx, scope, id, reason).await);
        };

        insert_entry(&mut *tx, audit).await?;
        commit(tx).await?;
        Ok(revoked)
    }

    async fn rotate(
        &self,
        scope: &TenantScope,
        id: CredentialId,
        rotation: RotateCredential,
        at: DateTime<Utc>,
        audit: NewAuditEntry,
    ) -> AppResult<ExternalCredential> {
        let mut tx = begin_scoped(&self.pool, scope).await?;
        let rotated = sqlx::query_as::<_, ExternalCredential>(
            "UPDATE external_credentials \
             SET lookup_key = $3, secret_hash = $4, use_count = 0, rotated_at = $5 \
             WHERE id = $1 AND tenant_id = $2 AND is_active = TRUE RETURNING *",
        )
        .bind(id)
        .bind(scope.tenant_id())
        .bind(&rotation.lookup_key)
        .bind(&rotation.secret_hash)
        .bind(at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_unique(e, "credential"))?;
        let Some(rotated) = rotated else {
            let reason = "A revoked credential cannot be rotated";
            return Err(inactive_or_missing(&mut tx, scope, id, reason).await);
        };

        insert_entry(&mut *tx, audit).await?;
        commit(tx).await?;
        Ok(rotated)
    }

    async fn record_use(
        &self,
        scope: &TenantScope,
        id: CredentialId,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut tx = begin_scoped(&self.pool, scope).await?;
        sqlx::query(
            "UPDATE external_credentials SET last_used_at = $3, use_count = use_count + 1 \
             WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(scope.tenant_id())
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record credential use", e)
        })?;
        commit(tx).await
    }
}
