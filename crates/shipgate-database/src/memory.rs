//! In-memory store using a Tokio mutex, for tests and single-node demos.
//!
//! One lock guards every table, so a mutation and its audit entry are
//! applied together exactly as the PostgreSQL transaction would.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use shipgate_core::error::AppError;
use shipgate_core::result::AppResult;
use shipgate_core::types::{
    AuditEntryId, CredentialId, PageRequest, PageResponse, ShipmentId, TenantScope,
};
use shipgate_entity::audit::{AuditEntry, NewAuditEntry};
use shipgate_entity::credential::{CreateCredential, ExternalCredential, RotateCredential};
use shipgate_entity::shipment::{Shipment, ShipmentChange, ShipmentDocument};

use crate::store::{AuditStore, CredentialStore, ShipmentStore};

#[derive(Debug, Default)]
struct MemoryState {
    credentials: HashMap<CredentialId, ExternalCredential>,
    shipments: HashMap<ShipmentId, Shipment>,
    documents: Vec<ShipmentDocument>,
    /// Insertion order is the stable creation order.
    audit: Vec<AuditEntry>,
}

impl MemoryState {
    fn append(&mut self, entry: NewAuditEntry) -> AuditEntry {
        let stored = entry.into_entry(AuditEntryId::new(), Utc::now());
        self.audit.push(stored.clone());
        stored
    }

    fn credential_mut(
        &mut self,
        scope: &TenantScope,
        id: CredentialId,
    ) -> AppResult<&mut ExternalCredential> {
        self.credentials
            .get_mut(&id)
            .filter(|c| c.tenant_id == scope.tenant_id())
            .ok_or_else(|| AppError::not_found("Credential not found"))
    }

    fn lookup_key_taken(&self, key: &str, except: Option<CredentialId>) -> bool {
        self.credentials
            .values()
            .any(|c| c.lookup_key.as_deref() == Some(key) && Some(c.id) != except)
    }
}

/// Store backed by process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a shipment owned by the surrounding system.
    pub async fn insert_shipment(&self, shipment: Shipment) {
        let mut state = self.state.lock().await;
        state.shipments.insert(shipment.id, shipment);
    }

    /// Seed a credential row directly, bypassing issuance.
    pub async fn insert_credential(&self, credential: ExternalCredential) {
        let mut state = self.state.lock().await;
        state.credentials.insert(credential.id, credential);
    }

    /// Snapshot of a credential regardless of tenant.
    pub async fn credential(&self, id: CredentialId) -> Option<ExternalCredential> {
        self.state.lock().await.credentials.get(&id).cloned()
    }

    /// Snapshot of a shipment regardless of tenant.
    pub async fn shipment(&self, id: ShipmentId) -> Option<Shipment> {
        self.state.lock().await.shipments.get(&id).cloned()
    }

    /// Every audit entry in creation order.
    pub async fn audit_log(&self) -> Vec<AuditEntry> {
        self.state.lock().await.audit.clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_lookup_key(&self, lookup_key: &str) -> AppResult<Option<ExternalCredential>> {
        let state = self.state.lock().await;
        Ok(state
            .credentials
            .values()
            .find(|c| c.lookup_key.as_deref() == Some(lookup_key))
            .cloned())
    }

    async fn list_active(&self) -> AppResult<Vec<ExternalCredential>> {
        let state = self.state.lock().await;
        let mut active: Vec<_> = state
            .credentials
            .values()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        active.sort_by_key(|c| c.created_at);
        Ok(active)
    }

    async fn find(
        &self,
        scope: &TenantScope,
        id: CredentialId,
    ) -> AppResult<Option<ExternalCredential>> {
        let state = self.state.lock().await;
        Ok(state
            .credentials
            .get(&id)
            .filter(|c| c.tenant_id == scope.tenant_id())
            .cloned())
    }

    async fn list_for_shipment(
        &self,
        scope: &TenantScope,
        shipment_id: ShipmentId,
    ) -> AppResult<Vec<ExternalCredential>> {
        let state = self.state.lock().await;
        let mut found: Vec<_> = state
            .credentials
            .values()
            .filter(|c| c.tenant_id == scope.tenant_id() && c.shipment_id == shipment_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn create(
        &self,
        data: CreateCredential,
        audit: NewAuditEntry,
    ) -> AppResult<ExternalCredential> {
        let mut state = self.state.lock().await;
        if state.credentials.contains_key(&data.id)
            || state.lookup_key_taken(&data.lookup_key, None)
        {
            return Err(AppError::conflict("credential already exists"));
        }
        let credential = data.into_credential(Utc::now());
        state.credentials.insert(credential.id, credential.clone());
        state.append(audit);
        debug!(credential_id = %credential.id, "Stored credential in memory");
        Ok(credential)
    }

    async fn revoke(
        &self,
        scope: &TenantScope,
        id: CredentialId,
        at: DateTime<Utc>,
        audit: NewAuditEntry,
    ) -> AppResult<ExternalCredential> {
        let mut state = self.state.lock().await;
        let credential = state.credential_mut(scope, id)?;
        if !credential.is_active {
            return Err(AppError::conflict("Credential is already revoked"));
        }
        credential.is_active = false;
        credential.revoked_at = Some(at);
        let revoked = credential.clone();
        state.append(audit);
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
        let mut state = self.state.lock().await;
        if state.lookup_key_taken(&rotation.lookup_key, Some(id)) {
            return Err(AppError::conflict("credential already exists"));
        }
        let credential = state.credential_mut(scope, id)?;
        if !credential.is_active {
            return Err(AppError::conflict("A revoked credential cannot be rotated"));
        }
        credential.lookup_key = Some(rotation.lookup_key);
        credential.secret_hash = rotation.secret_hash;
        credential.use_count = 0;
        credential.rotated_at = Some(at);
        let rotated = credential.clone();
        state.append(audit);
        Ok(rotated)
    }

    async fn record_use(
        &self,
        scope: &TenantScope,
        id: CredentialId,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let credential = state.credential_mut(scope, id)?;
        credential.last_used_at = Some(at);
        credential.use_count += 1;
        Ok(())
    }
}

#[async_trait]
impl ShipmentStore for MemoryStore {
    async fn find(&self, scope: &TenantScope, id: ShipmentId) -> AppResult<Option<Shipment>> {
        let state = self.state.lock().await;
        Ok(state
            .shipments
            .get(&id)
            .filter(|s| s.tenant_id == scope.tenant_id())
            .cloned())
    }

    async fn documents(
        &self,
        scope: &TenantScope,
        id: ShipmentId,
    ) -> AppResult<Vec<ShipmentDocument>> {
        let state = self.state.lock().await;
        Ok(state
            .documents
            .iter()
            .filter(|d| d.tenant_id == scope.tenant_id() && d.shipment_id == id)
            .cloned()
            .collect())
    }

    async fn commit(
        &self,
        scope: &TenantScope,
        id: ShipmentId,
        change: ShipmentChange,
        audit: NewAuditEntry,
    ) -> AppResult<Shipment> {
        let now = Utc::now();
        let mut state = self.state.lock().await;
        let shipment = state
            .shipments
            .get_mut(&id)
            .filter(|s| s.tenant_id == scope.tenant_id())
            .ok_or_else(|| AppError::not_found("Shipment not found"))?;

        shipment.apply_change(&change, now);
        let updated = shipment.clone();

        if let ShipmentChange::Document { document } = change {
            let document = document.into_document(scope.tenant_id(), id, now);
            state.documents.push(document);
        }
        state.append(audit);
        Ok(updated)
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append(&self, scope: &TenantScope, entry: NewAuditEntry) -> AppResult<AuditEntry> {
        scope.ensure_owns(entry.tenant_id, "Shipment")?;
        let mut state = self.state.lock().await;
        Ok(state.append(entry))
    }

    async fn trail(
        &self,
        scope: &TenantScope,
        shipment_id: ShipmentId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditEntry>> {
        let state = self.state.lock().await;
        let newest_first: Vec<_> = state
            .audit
            .iter()
            .rev()
            .filter(|e| e.tenant_id == scope.tenant_id() && e.shipment_id == shipment_id)
            .cloned()
            .collect();
        Ok(PageResponse::from_slice(newest_first, page))
    }
}
