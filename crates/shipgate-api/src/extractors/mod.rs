//! Custom Axum extractors.

pub mod agent;
pub mod json;
pub mod origin;
pub mod pagination;
pub mod staff;

pub use agent::ExternalAgent;
pub use json::ValidatedJson;
pub use origin::ClientOrigin;
pub use pagination::PaginationParams;
pub use staff::StaffUser;
