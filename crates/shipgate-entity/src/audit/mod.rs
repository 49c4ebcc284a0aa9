//! Audit trail entities.

pub mod model;

pub use model::{Actor, AuditAction, AuditEntry, AuditOrigin, NewAuditEntry};
