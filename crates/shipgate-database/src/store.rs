//! Storage contracts consumed by the service layer.
//!
//! Every method that touches tenant-owned data takes a [`TenantScope`].
//! The two credential lookups used during authentication are the only
//! exception: they run before a tenant is known and return whole rows,
//! from which the caller derives the scope.
//!
//! Mutations carry their audit entry with them. Implementations must make
//! the mutation and the entry durable together or not at all.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use shipgate_core::result::AppResult;
use shipgate_core::types::{CredentialId, PageRequest, PageResponse, ShipmentId, TenantScope};
use shipgate_entity::audit::{AuditEntry, NewAuditEntry};
use shipgate_entity::credential::{CreateCredential, ExternalCredential, RotateCredential};
use shipgate_entity::shipment::{Shipment, ShipmentChange, ShipmentDocument};

/// Persistence for issued external credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Load the credential carrying this lookup key, active or not.
    async fn find_by_lookup_key(&self, lookup_key: &str) -> AppResult<Option<ExternalCredential>>;

    /// Load every credential flagged active. Expiry is not filtered here.
    async fn list_active(&self) -> AppResult<Vec<ExternalCredential>>;

    /// Load a credential within the scope.
    async fn find(
        &self,
        scope: &TenantScope,
        id: CredentialId,
    ) -> AppResult<Option<ExternalCredential>>;

    /// All credentials issued for a shipment, newest first.
    async fn list_for_shipment(
        &self,
        scope: &TenantScope,
        shipment_id: ShipmentId,
    ) -> AppResult<Vec<ExternalCredential>>;

    /// Persist a new credential and its `grant_created` entry.
    async fn create(
        &self,
        data: CreateCredential,
        audit: NewAuditEntry,
    ) -> AppResult<ExternalCredential>;

    /// Clear the active flag and stamp `revoked_at`, with its audit entry.
    /// An already revoked credential is a conflict and writes nothing.
    async fn revoke(
        &self,
        scope: &TenantScope,
        id: CredentialId,
        at: DateTime<Utc>,
        audit: NewAuditEntry,
    ) -> AppResult<ExternalCredential>;

    /// Replace the secret material and reset the use counter, with its
    /// audit entry. Capabilities and expiry are untouched. Fails with a
    /// conflict when the credential is revoked.
    async fn rotate(
        &self,
        scope: &TenantScope,
        id: CredentialId,
        rotation: RotateCredential,
        at: DateTime<Utc>,
        audit: NewAuditEntry,
    ) -> AppResult<ExternalCredential>;

    /// Record a successful authentication.
    async fn record_use(
        &self,
        scope: &TenantScope,
        id: CredentialId,
        at: DateTime<Utc>,
    ) -> AppResult<()>;
}

/// Read and guarded write access to shipments.
#[async_trait]
pub trait ShipmentStore: Send + Sync + 'static {
    /// Load a shipment within the scope.
    async fn find(&self, scope: &TenantScope, id: ShipmentId) -> AppResult<Option<Shipment>>;

    /// Documents attached to a shipment, oldest first.
    async fn documents(
        &self,
        scope: &TenantScope,
        id: ShipmentId,
    ) -> AppResult<Vec<ShipmentDocument>>;

    /// Apply an already-authorized change and append its audit entry in
    /// one unit of work. Returns the updated shipment.
    async fn commit(
        &self,
        scope: &TenantScope,
        id: ShipmentId,
        change: ShipmentChange,
        audit: NewAuditEntry,
    ) -> AppResult<Shipment>;
}

/// The append-only audit log: append and ordered read only.
#[async_trait]
pub trait AuditStore: Send + Sync + 'static {
    /// Append a standalone entry.
    async fn append(&self, scope: &TenantScope, entry: NewAuditEntry) -> AppResult<AuditEntry>;

    /// Entries for a shipment, newest first.
    async fn trail(
        &self,
        scope: &TenantScope,
        shipment_id: ShipmentId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditEntry>>;
}
