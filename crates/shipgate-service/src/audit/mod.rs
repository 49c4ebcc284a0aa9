//! Audit entry construction and trail reads.

pub mod logger;

pub use logger::AuditLogger;
