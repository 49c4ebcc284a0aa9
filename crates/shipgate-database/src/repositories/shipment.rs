//! Shipment repository implementation.
//!
//! Shipments are owned by the surrounding order-management system. The
//! gateway reads them and writes only the columns an external agent may
//! influence.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, PgPool};

use shipgate_core::error::{AppError, ErrorKind};
use shipgate_core::result::AppResult;
use shipgate_core::types::{ShipmentId, TenantScope};
use shipgate_entity::audit::NewAuditEntry;
use shipgate_entity::shipment::{Shipment, ShipmentChange, ShipmentDocument};

use super::audit::insert_entry;
use super::{begin_scoped, commit};
use crate::store::ShipmentStore;

/// Repository for `shipments` and `shipment_documents`.
#[derive(Debug, Clone)]
pub struct PgShipmentRepository {
    pool: PgPool,
}

impl PgShipmentRepository {
    /// Create a new shipment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Write back every gateway-writable column of a shipment.
async fn persist(conn: &mut PgConnection, shipment: &Shipment) -> AppResult<Shipment> {
    sqlx::query_as::<_, Shipment>(
        "UPDATE shipments SET \
         status = $3, etd = $4, eta = $5, actual_departure = $6, actual_arrival = $7, \
         freight_cost = $8, insurance_cost = $9, customs_duty = $10, port_charges = $11, \
         inland_transport_cost = $12, bl_number = $13, container_number = $14, \
         vessel_name = $15, voyage_number = $16, customs_entry_number = $17, \
         tracking_number = $18, customs_cleared_at = $19, received_at = $20, notes = $21, \
         updated_at = $22 \
         WHERE id = $1 AND tenant_id = $2 RETURNING *",
    )
    .bind(shipment.id)
    .bind(shipment.tenant_id)
    .bind(shipment.status)
    .bind(shipment.etd)
    .bind(shipment.eta)
    .bind(shipment.actual_departure)
    .bind(shipment.actual_arrival)
    .bind(shipment.freight_cost)
    .bind(shipment.insurance_cost)
    .bind(shipment.customs_duty)
    .bind(shipment.port_charges)
    .bind(shipment.inland_transport_cost)
    .bind(&shipment.bl_number)
    .bind(&shipment.container_number)
    .bind(&shipment.vessel_name)
    .bind(&shipment.voyage_number)
    .bind(&shipment.customs_entry_number)
    .bind(&shipment.tracking_number)
    .bind(shipment.customs_cleared_at)
    .bind(shipment.received_at)
    .bind(&shipment.notes)
    .bind(shipment.updated_at)
    .fetch_one(conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update shipment", e))
}

#[async_trait]
impl ShipmentStore for PgShipmentRepository {
    async fn find(&self, scope: &TenantScope, id: ShipmentId) -> AppResult<Option<Shipment>> {
        let mut tx = begin_scoped(&self.pool, scope).await?;
        let shipment = sqlx::query_as::<_, Shipment>(
            "SELECT * FROM shipments WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(scope.tenant_id())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find shipment", e))?;
        commit(tx).await?;
        Ok(shipment)
    }

    async fn documents(
        &self,
        scope: &TenantScope,
        id: ShipmentId,
    ) -> AppResult<Vec<ShipmentDocument>> {
        let mut tx = begin_scoped(&self.pool, scope).await?;
        let documents = sqlx::query_as::<_, ShipmentDocument>(
            "SELECT * FROM shipment_documents WHERE shipment_id = $1 AND tenant_id = $2 \
             ORDER BY created_at",
        )
        .bind(id)
        .bind(scope.tenant_id())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list documents", e))?;
        commit(tx).await?;
        Ok(documents)
    }

    async fn commit(
        &self,
        scope: &TenantScope,
        id: ShipmentId,
        change: ShipmentChange,
        audit: NewAuditEntry,
    ) -> AppResult<Shipment> {
        let now = Utc::now();
        let mut tx = begin_scoped(&self.pool, scope).await?;

        let mut shipment = sqlx::query_as::<_, Shipment>(
            "SELECT * FROM shipments WHERE id = $1 AND tenant_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(scope.tenant_id())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock shipment", e))?
        .ok_or_else(|| AppError::not_found("Shipment not found"))?;

        shipment.apply_change(&change, now);

        if let ShipmentChange::Document { document } = change {
            let document = document.into_document(scope.tenant_id(), id, now);
            sqlx::query(
                "INSERT INTO shipment_documents \
                 (id, tenant_id, shipment_id, document_type, file_name, url, \
                  uploaded_by_credential, uploaded_by_name, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(document.id)
            .bind(document.tenant_id)
            .bind(document.shipment_id)
            .bind(&document.document_type)
            .bind(&document.file_name)
            .bind(&document.url)
            .bind(document.uploaded_by_credential)
            .bind(&document.uploaded_by_name)
            .bind(document.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to attach document", e)
            })?;
        }

        let updated = persist(&mut *tx, &shipment).await?;
        insert_entry(&mut *tx, audit).await?;
        commit(tx).await?;
        Ok(updated)
    }
}
