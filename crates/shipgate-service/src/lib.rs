//! # shipgate-service
//!
//! Business logic for Shipgate. The portal service orchestrates the
//! capability enforcer, the status transition engine, and the audit logger
//! for external agents; the grant service issues and manages external
//! credentials for internal staff.
//!
//! Services follow constructor injection: all dependencies are provided at
//! construction time via `Arc` references.

pub mod audit;
pub mod capability;
pub mod context;
pub mod grant;
pub mod portal;
pub mod transition;

pub use audit::AuditLogger;
pub use capability::{AuthorizedBatch, CapabilityEnforcer, Denial, FieldChange};
pub use context::RequestContext;
pub use grant::{CreateGrantRequest, GrantService, IssuedGrant};
pub use portal::{NewDocument, PortalService, ShipmentProjection};
pub use transition::{StatusTransitionEngine, TransitionRejection};
