//! Capability enforcement for external agents.

pub mod enforcer;

pub use enforcer::{AuthorizedBatch, CapabilityEnforcer, Denial, FieldChange, MAX_NOTE_LEN};
