//! # shipgate-database
//!
//! Storage seams for Shipgate: the store traits consumed by the service
//! layer, their PostgreSQL implementations, an in-memory implementation
//! for tests and single-node demos, and pool/migration management.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use repositories::{PgAuditRepository, PgCredentialRepository, PgShipmentRepository};
pub use store::{AuditStore, CredentialStore, ShipmentStore};
