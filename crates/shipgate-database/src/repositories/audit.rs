//! Audit log repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, PgPool};

use shipgate_core::error::{AppError, ErrorKind};
use shipgate_core::result::AppResult;
use shipgate_core::types::{AuditEntryId, PageRequest, PageResponse, ShipmentId, TenantScope};
use shipgate_entity::audit::{AuditEntry, NewAuditEntry};

use super::{begin_scoped, commit};
use crate::store::AuditStore;

/// Repository for `shipment_audit_log`.
///
/// The table is append-only; a trigger rejects UPDATE and DELETE.
#[derive(Debug, Clone)]
pub struct PgAuditRepository {
    pool: PgPool,
}

impl PgAuditRepository {
    /// Create a new audit repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Insert an entry on an open connection, usually inside the transaction of
/// the mutation it records.
pub(crate) async fn insert_entry(
    conn: &mut PgConnection,
    entry: NewAuditEntry,
) -> AppResult<AuditEntry> {
    let row = entry.into_entry(AuditEntryId::new(), Utc::now());

    sqlx::query_as::<_, AuditEntry>(
        "INSERT INTO shipment_audit_log \
         (id, tenant_id, shipment_id, credential_id, actor_user_id, actor_agent_type, actor_name, \
          origin, action, field_name, old_value, new_value, note, ip_address, user_agent, details, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
         RETURNING *",
    )
    .bind(row.id)
    .bind(row.tenant_id)
    .bind(row.shipment_id)
    .bind(row.credential_id)
    .bind(row.actor_user_id)
    .bind(row.actor_agent_type)
    .bind(&row.actor_name)
    .bind(row.origin)
    .bind(row.action)
    .bind(&row.field_name)
    .bind(&row.old_value)
    .bind(&row.new_value)
    .bind(&row.note)
    .bind(&row.ip_address)
    .bind(&row.user_agent)
    .bind(&row.details)
    .bind(row.created_at)
    .fetch_one(conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append audit entry", e))
}

#[async_trait]
impl AuditStore for PgAuditRepository {
    async fn append(&self, scope: &TenantScope, entry: NewAuditEntry) -> AppResult<AuditEntry> {
        scope.ensure_owns(entry.tenant_id, "Shipment")?;
        let mut tx = begin_scoped(&self.pool, scope).await?;
        let stored = insert_entry(&mut *tx, entry).await?;
        commit(tx).await?;
        Ok(stored)
    }

    async fn trail(
        &self,
        scope: &TenantScope,
        shipment_id: ShipmentId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditEntry>> {
        let mut tx = begin_scoped(&self.pool, scope).await?;
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM shipment_audit_log WHERE tenant_id = $1 AND shipment_id = $2",
        )
        .bind(scope.tenant_id())
        .bind(shipment_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count audit entries", e)
        })?;

        let entries = sqlx::query_as::<_, AuditEntry>(
            "SELECT * FROM shipment_audit_log WHERE tenant_id = $1 AND shipment_id = $2 \
             ORDER BY created_at DESC, seq DESC LIMIT $3 OFFSET $4",
        )
        .bind(scope.tenant_id())
        .bind(shipment_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load audit trail", e))?;
        commit(tx).await?;

        Ok(PageResponse::new(entries, page, total as u64))
    }
}
