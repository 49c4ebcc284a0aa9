//! External credential (grant) entities.

pub mod agent;
pub mod capability;
pub mod model;

pub use agent::{AgentDescriptor, AgentType};
pub use capability::CapabilitySet;
pub use model::{CreateCredential, CredentialView, ExternalCredential, RotateCredential};
